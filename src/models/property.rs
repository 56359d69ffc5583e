//! 地块记录与字段表
//!
//! 门户上的字段靠标签文字定位。字段增删只改 `PROPERTY_FIELDS`，抽取流程不用动。

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::models::coordinate::Coordinate;

/// 一个字段：输出列名 + 门户上的标签文字
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub column: &'static str,
    pub label: &'static str,
}

/// 地址所在的列
pub const ADDRESS_COLUMN: &str = "address";

/// 从详情面板读取的十一个字段，顺序即输出列顺序
pub const PROPERTY_FIELDS: [FieldSpec; 11] = [
    FieldSpec { column: ADDRESS_COLUMN, label: "Address" },
    FieldSpec { column: "owner", label: "Owner" },
    FieldSpec { column: "parcel_id", label: "Parcel ID" },
    FieldSpec { column: "land_value", label: "Land Value" },
    FieldSpec { column: "building_value", label: "Building Value" },
    FieldSpec { column: "total_value", label: "Total Value" },
    FieldSpec { column: "last_sale_price", label: "Sale Price" },
    FieldSpec { column: "last_sale_date", label: "Sale Date" },
    FieldSpec { column: "year_built", label: "Year Built" },
    FieldSpec { column: "square_feet", label: "Square Feet" },
    FieldSpec { column: "tax_district", label: "Tax District" },
];

/// 单个地块的快照
///
/// 所有值都保持门户上的显示文本，不做数值 / 日期转换。
/// 创建后只追加到结果集，不再修改。
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRecord {
    /// 搜索时使用的地址
    pub query: String,
    /// 与 `PROPERTY_FIELDS` 一一对应
    values: Vec<String>,
    /// 地图中心坐标，取不到时为空（部分抽取）
    pub coordinate: Option<Coordinate>,
    /// 抓取日期（运行当天，不是地块数据）
    pub scraped_date: NaiveDate,
}

impl PropertyRecord {
    /// 创建记录，`values` 按字段表顺序给出，多余的丢弃、不足的补空
    pub fn new(
        query: impl Into<String>,
        mut values: Vec<String>,
        coordinate: Option<Coordinate>,
        scraped_date: NaiveDate,
    ) -> Self {
        values.resize(PROPERTY_FIELDS.len(), String::new());
        Self {
            query: query.into(),
            values,
            coordinate,
            scraped_date,
        }
    }

    /// 按列名取值，未知列返回空字符串
    pub fn field(&self, column: &str) -> &str {
        PROPERTY_FIELDS
            .iter()
            .position(|spec| spec.column == column)
            .map(|i| self.values[i].as_str())
            .unwrap_or("")
    }

    /// (列名, 值) 迭代
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
        PROPERTY_FIELDS
            .iter()
            .zip(self.values.iter())
            .map(|(spec, value)| (spec.column, value.as_str()))
    }

    /// 记录的地址：门户显示的地址，门户没显示时退回搜索地址
    pub fn address(&self) -> &str {
        let shown = self.field(ADDRESS_COLUMN);
        if shown.is_empty() {
            &self.query
        } else {
            shown
        }
    }

    /// 空着的字段列名
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.fields()
            .filter(|(_, value)| value.is_empty())
            .map(|(column, _)| column)
            .collect()
    }

    /// 部分抽取：有字段为空或没有坐标
    pub fn is_partial(&self) -> bool {
        self.coordinate.is_none() || self.values.iter().any(|v| v.is_empty())
    }

    /// 什么都没读到
    pub fn is_empty(&self) -> bool {
        self.coordinate.is_none() && self.values.iter().all(|v| v.is_empty())
    }

    /// CSV 表头
    pub fn csv_header() -> Vec<&'static str> {
        PROPERTY_FIELDS
            .iter()
            .map(|spec| spec.column)
            .chain(["scraped_date", "latitude", "longitude"])
            .collect()
    }

    /// CSV 行，与 `csv_header` 对齐
    pub fn csv_row(&self) -> Vec<String> {
        let (lat, lng) = match self.coordinate {
            Some(c) => (c.lat.to_string(), c.lng.to_string()),
            None => (String::new(), String::new()),
        };
        self.values
            .iter()
            .cloned()
            .chain([self.scraped_date.format("%Y-%m-%d").to_string(), lat, lng])
            .collect()
    }
}

/// 规整门户显示文本：去首尾空白，内部连续空白合并为一个空格
pub fn normalize_text(raw: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let re = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"));
    re.replace_all(raw.trim(), " ").into_owned()
}
