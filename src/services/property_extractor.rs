//! 地块信息抽取服务 - 业务能力层
//!
//! 在已打开的地块详情上读取字段表中的每个字段和地图中心坐标。
//! 每一步都尽力而为：单个字段读不到记为空，坐标读不到记为缺失，整条记录照样返回。

use std::time::Duration;

use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::DriverResult;
use crate::infrastructure::{attempt_click, PageDriver, StepOutcome};
use crate::models::property::normalize_text;
use crate::models::{Coordinate, FieldSpec, PortalSelectors, PropertyRecord, PROPERTY_FIELDS};

/// 地图中心脚本的返回值
#[derive(Debug, Deserialize)]
struct MapCenter {
    lat: f64,
    lng: f64,
}

/// 地块信息抽取服务
///
/// 职责：
/// - 切换到信息标签页（需要的话）
/// - 按字段表逐个读取标签旁的值
/// - 打开地图工具读取地图中心坐标
/// - 假定 `PropertyLocator` 已经打开了地块详情
pub struct PropertyExtractor {
    selectors: PortalSelectors,
    wait_timeout: Duration,
    optional_wait: Duration,
    settle_delay: Duration,
}

impl PropertyExtractor {
    /// 创建新的抽取服务
    pub fn new(config: &Config) -> Self {
        Self {
            selectors: config.selectors.clone(),
            wait_timeout: config.wait_timeout(),
            optional_wait: config.optional_wait(),
            settle_delay: config.settle_delay(),
        }
    }

    /// 抽取当前地块
    ///
    /// 一个字段都没读到、坐标也没有时返回 `None`（详情页根本没加载出来）。
    pub async fn extract(&self, driver: &dyn PageDriver, query: &str) -> Option<PropertyRecord> {
        self.open_info_tab(driver, query).await;

        let mut values = Vec::with_capacity(PROPERTY_FIELDS.len());
        for spec in PROPERTY_FIELDS.iter() {
            values.push(self.read_field(driver, spec, query).await);
        }

        let coordinate = match self.read_map_center(driver).await {
            Ok(Some(coordinate)) => Some(coordinate),
            Ok(None) => {
                warn!("[{}] ⚠️ 未能读取地图坐标", query);
                None
            }
            Err(e) => {
                warn!("[{}] ⚠️ 读取地图坐标失败: {}", query, e);
                None
            }
        };

        let record = PropertyRecord::new(
            query,
            values,
            coordinate,
            chrono::Local::now().date_naive(),
        );

        if record.is_empty() {
            warn!("[{}] ❌ 详情页没有任何可读字段", query);
            return None;
        }
        if record.is_partial() {
            let missing = record.missing_fields();
            if !missing.is_empty() {
                info!("[{}] 部分字段为空: {}", query, missing.join(", "));
            }
        }
        Some(record)
    }

    /// 切换到 "Property Info" 标签页；已经可见或不存在都不算错
    async fn open_info_tab(&self, driver: &dyn PageDriver, query: &str) {
        match attempt_click(driver, &self.selectors.info_tab(), self.optional_wait).await {
            Ok(StepOutcome::Performed) => {
                debug!("[{}] 已切换到信息标签页", query);
                sleep(self.settle_delay).await;
            }
            Ok(StepOutcome::Absent) => {}
            Err(e) => warn!("[{}] 切换信息标签页失败，继续: {}", query, e),
        }
    }

    async fn read_field(&self, driver: &dyn PageDriver, spec: &FieldSpec, query: &str) -> String {
        match driver.find_text(&self.selectors.field_value(spec.label)).await {
            Ok(Some(text)) => normalize_text(&text),
            Ok(None) => String::new(),
            Err(e) => {
                debug!("[{}] 读取字段 {} 失败: {}", query, spec.label, e);
                String::new()
            }
        }
    }

    async fn read_map_center(&self, driver: &dyn PageDriver) -> DriverResult<Option<Coordinate>> {
        let map_tools = self.selectors.map_tools_button();
        if attempt_click(driver, &map_tools, self.wait_timeout).await? == StepOutcome::Absent {
            debug!("地图工具按钮不存在: {}", map_tools);
            return Ok(None);
        }

        // 等待地图加载
        sleep(self.settle_delay).await;

        let value = driver.run_script(&self.selectors.map_center_script).await?;
        let center: MapCenter = serde_json::from_value(value)?;
        Ok(Coordinate::new(center.lat, center.lng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_map_center_deserialize() {
        let center: MapCenter =
            serde_json::from_value(json!({ "lat": 35.25, "lng": -80.75 })).unwrap();
        assert_eq!(Coordinate::new(center.lat, center.lng), Coordinate::new(35.25, -80.75));

        assert!(serde_json::from_value::<MapCenter>(json!({ "lat": null, "lng": 1.0 })).is_err());
    }
}
