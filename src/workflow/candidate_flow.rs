//! 地址处理流程 - 流程层
//!
//! 核心职责：定义"一个地址"的完整处理流程
//!
//! 流程顺序：
//! 1. 定位（搜索 → 打开第一个结果）
//! 2. 抽取（字段 + 地图坐标）
//! 3. 距离校验（默认只记录，`strict_radius` 时作为硬过滤）

use tracing::{info, warn};

use crate::config::Config;
use crate::infrastructure::PageDriver;
use crate::models::{Coordinate, PropertyRecord};
use crate::services::{distance_miles, within_radius, LocateOutcome, PropertyExtractor, PropertyLocator};
use crate::workflow::candidate_ctx::CandidateCtx;

/// 跳过原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// 门户搜索无结果
    NotFound,
    /// 门户不可用或页面结构不符
    Transient(String),
    /// 详情页没有任何可读内容
    ExtractionFailed,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NotFound => write!(f, "门户搜索无结果"),
            SkipReason::Transient(reason) => write!(f, "门户暂时不可用: {}", reason),
            SkipReason::ExtractionFailed => write!(f, "详情页没有可读内容"),
        }
    }
}

/// 候选地址处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateResult {
    /// 保留（`distance_miles` 为空表示没有坐标，无法校验）
    Accepted {
        record: PropertyRecord,
        distance_miles: Option<f64>,
    },
    /// 严格模式下超出半径被拒绝
    Rejected {
        record: PropertyRecord,
        distance_miles: f64,
    },
    /// 跳过
    Skipped(SkipReason),
}

/// 地址处理流程
///
/// - 编排单个地址的 定位 → 抽取 → 距离校验
/// - 不持有任何资源（page），由调用方传入驱动
/// - 只依赖业务能力（services）
pub struct CandidateFlow {
    locator: PropertyLocator,
    extractor: PropertyExtractor,
    radius_miles: f64,
    strict_radius: bool,
}

impl CandidateFlow {
    /// 创建新的地址处理流程
    pub fn new(config: &Config) -> Self {
        Self {
            locator: PropertyLocator::new(config),
            extractor: PropertyExtractor::new(config),
            radius_miles: config.radius_miles,
            strict_radius: config.strict_radius,
        }
    }

    /// 定位并抽取一个地址；目标地址和候选地址共用
    pub async fn fetch(
        &self,
        driver: &dyn PageDriver,
        address: &str,
    ) -> Result<PropertyRecord, SkipReason> {
        match self.locator.locate(driver, address).await {
            LocateOutcome::Found => {}
            LocateOutcome::NotFound => return Err(SkipReason::NotFound),
            LocateOutcome::TransientError(reason) => return Err(SkipReason::Transient(reason)),
        }

        self.extractor
            .extract(driver, address)
            .await
            .ok_or(SkipReason::ExtractionFailed)
    }

    /// 处理一个候选地址
    ///
    /// # 参数
    /// - `center`: 目标地块坐标，用于距离校验
    pub async fn run(
        &self,
        driver: &dyn PageDriver,
        ctx: &CandidateCtx,
        center: Coordinate,
    ) -> CandidateResult {
        info!("{} 🔍 正在定位...", ctx);

        let record = match self.fetch(driver, &ctx.address).await {
            Ok(record) => record,
            Err(reason) => {
                warn!("{} ⚠️ 跳过: {}", ctx, reason);
                return CandidateResult::Skipped(reason);
            }
        };

        let Some(coordinate) = record.coordinate else {
            warn!("{} ⚠️ 没有坐标，无法校验距离，保留记录", ctx);
            return CandidateResult::Accepted {
                record,
                distance_miles: None,
            };
        };

        let distance = distance_miles(center, coordinate);
        if within_radius(Some(center), Some(coordinate), self.radius_miles) {
            info!("{} ✓ 已抽取 (距离 {:.2} 英里)", ctx, distance);
            CandidateResult::Accepted {
                record,
                distance_miles: Some(distance),
            }
        } else if self.strict_radius {
            warn!(
                "{} ❌ 距离 {:.2} 英里超出半径 {} 英里，丢弃",
                ctx, distance, self.radius_miles
            );
            CandidateResult::Rejected {
                record,
                distance_miles: distance,
            }
        } else {
            warn!(
                "{} ⚠️ 距离 {:.2} 英里超出半径 {} 英里 (门户已圈定，保留)",
                ctx, distance, self.radius_miles
            );
            CandidateResult::Accepted {
                record,
                distance_miles: Some(distance),
            }
        }
    }
}
