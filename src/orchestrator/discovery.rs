//! 周边地块发现编排器 - 编排层
//!
//! ## 状态机
//!
//! ```text
//! Init → LocateTarget → ExtractTarget → DiscoverNearby → {LocateCandidate → ExtractCandidate}* → Done
//! ```
//!
//! - 目标地址定位失败：直接 Done，结果集为空
//! - 目标没有坐标或地理编码失败：保留目标记录，不做周边发现
//! - 单个候选失败只跳过它自己，不影响后面的候选
//! - 候选之间有固定的间隔，避免给门户造成压力

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::infrastructure::PageDriver;
use crate::models::{Coordinate, PropertyRecord};
use crate::services::{distance_miles, Geocoder, NearbyDiscovery};
use crate::workflow::{CandidateCtx, CandidateFlow, CandidateResult, SkipReason};

/// 地理编码坐标与门户地图坐标相差超过该值时告警（英里）
const GEOCODE_OFFSET_WARN_MILES: f64 = 0.25;

/// 编排状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    LocateTarget,
    ExtractTarget,
    DiscoverNearby,
    LocateCandidate,
    ExtractCandidate,
    Done,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// 运行统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    /// 目标地址是否已抽取
    pub target_extracted: bool,
    /// 目标地址失败的原因
    pub target_failure: Option<SkipReason>,
    /// 缓冲区列出的候选数（去重后）
    pub discovered: usize,
    /// 保留的候选数
    pub accepted: usize,
    /// 保留记录中的部分抽取数（含目标）
    pub partial: usize,
    pub not_found: usize,
    pub transient: usize,
    pub extraction_failed: usize,
    /// 严格模式下超出半径被丢弃的候选数
    pub outside_radius: usize,
    /// 重复地址数
    pub duplicates: usize,
}

impl RunStats {
    pub fn skipped(&self) -> usize {
        self.not_found + self.transient + self.extraction_failed + self.outside_radius
    }
}

/// 一次运行的产出
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    /// 结果集：目标在前，候选按门户列出的顺序
    pub records: Vec<PropertyRecord>,
    pub stats: RunStats,
    /// 经过的状态，按顺序
    pub visited: Vec<RunState>,
}

impl DiscoveryReport {
    fn enter(&mut self, state: RunState) {
        if let Some(prev) = self.visited.last() {
            debug!("状态 {} → {}", prev, state);
        }
        self.visited.push(state);
    }

    fn contains_address(&self, address: &str) -> bool {
        self.records.iter().any(|r| r.address() == address)
    }

    fn push(&mut self, record: PropertyRecord) {
        if record.is_partial() {
            self.stats.partial += 1;
        }
        self.records.push(record);
    }

    fn finish(mut self) -> Self {
        self.enter(RunState::Done);
        self
    }
}

/// 周边地块发现编排器
///
/// - 独占本次运行的页面会话（通过引用持有）
/// - 结果集归编排器所有，运行结束时整体交出
pub struct DiscoveryOrchestrator<'a> {
    driver: &'a dyn PageDriver,
    geocoder: &'a dyn Geocoder,
    flow: CandidateFlow,
    discovery: NearbyDiscovery,
    target_address: String,
    radius_miles: f64,
    pacing_delay: Duration,
}

impl<'a> DiscoveryOrchestrator<'a> {
    /// 创建编排器
    pub fn new(driver: &'a dyn PageDriver, geocoder: &'a dyn Geocoder, config: &Config) -> Self {
        Self {
            driver,
            geocoder,
            flow: CandidateFlow::new(config),
            discovery: NearbyDiscovery::new(config),
            target_address: config.target_address.clone(),
            radius_miles: config.radius_miles,
            pacing_delay: config.pacing_delay(),
        }
    }

    /// 执行完整的发现流程
    pub async fn run(&self) -> DiscoveryReport {
        let mut report = DiscoveryReport::default();
        report.enter(RunState::Init);

        let target = self.target_address.as_str();
        let geocoded = self.geocoder.resolve(target).await;
        match geocoded {
            Some(c) => info!("📍 目标地址地理编码: {}", c),
            None => warn!("⚠️ 目标地址地理编码失败，将不进行周边搜索"),
        }

        // ========== 目标地址 ==========
        report.enter(RunState::LocateTarget);
        info!("[目标 {}] 🔍 正在定位...", target);
        let target_record = match self.flow.fetch(self.driver, target).await {
            Ok(record) => {
                report.enter(RunState::ExtractTarget);
                record
            }
            Err(SkipReason::ExtractionFailed) => {
                report.enter(RunState::ExtractTarget);
                error!("[目标 {}] ❌ 无法抽取目标地块，流程结束", target);
                report.stats.target_failure = Some(SkipReason::ExtractionFailed);
                return report.finish();
            }
            Err(reason) => {
                error!("[目标 {}] ❌ 无法定位目标地块 ({})，流程结束", target, reason);
                report.stats.target_failure = Some(reason);
                return report.finish();
            }
        };

        let center = target_record.coordinate;
        report.push(target_record);
        report.stats.target_extracted = true;

        let Some(center) = center else {
            warn!("[目标 {}] ⚠️ 目标地块没有坐标，无法搜索周边", target);
            return report.finish();
        };
        info!("[目标 {}] ✓ 目标地块坐标: {}", target, center);

        let Some(geocoded) = geocoded else {
            return report.finish();
        };
        log_geocode_offset(geocoded, center);

        // ========== 周边发现 ==========
        report.enter(RunState::DiscoverNearby);
        let raw = self
            .discovery
            .discover(self.driver, center, self.radius_miles, target)
            .await;
        let (candidates, dropped) = dedup_preserving_order(raw);
        report.stats.duplicates += dropped;
        report.stats.discovered = candidates.len();
        info!("✓ 找到 {} 个周边地址", candidates.len());

        // ========== 逐个处理候选 ==========
        let total = candidates.len();
        for (idx, address) in candidates.into_iter().enumerate() {
            if idx > 0 {
                sleep(self.pacing_delay).await;
            }
            let ctx = CandidateCtx::new(address, idx + 1, total);
            self.process_candidate(&mut report, &ctx, center).await;
        }

        report.finish()
    }

    async fn process_candidate(
        &self,
        report: &mut DiscoveryReport,
        ctx: &CandidateCtx,
        center: Coordinate,
    ) {
        report.enter(RunState::LocateCandidate);

        match self.flow.run(self.driver, ctx, center).await {
            CandidateResult::Accepted { record, .. } => {
                report.enter(RunState::ExtractCandidate);
                if report.contains_address(record.address()) {
                    info!("{} 地址 {} 已在结果中，跳过", ctx, record.address());
                    report.stats.duplicates += 1;
                    return;
                }
                report.stats.accepted += 1;
                report.push(record);
            }
            CandidateResult::Rejected { .. } => {
                report.enter(RunState::ExtractCandidate);
                report.stats.outside_radius += 1;
            }
            CandidateResult::Skipped(SkipReason::ExtractionFailed) => {
                report.enter(RunState::ExtractCandidate);
                report.stats.extraction_failed += 1;
            }
            CandidateResult::Skipped(SkipReason::NotFound) => report.stats.not_found += 1,
            CandidateResult::Skipped(SkipReason::Transient(_)) => report.stats.transient += 1,
        }
    }
}

/// 去重并保持首次出现的顺序，返回 (去重结果, 丢弃数)
fn dedup_preserving_order(addresses: Vec<String>) -> (Vec<String>, usize) {
    let before = addresses.len();
    let mut seen = HashSet::new();
    let unique: Vec<String> = addresses
        .into_iter()
        .filter(|a| seen.insert(a.clone()))
        .collect();
    let dropped = before - unique.len();
    (unique, dropped)
}

fn log_geocode_offset(geocoded: Coordinate, map_center: Coordinate) {
    let offset = distance_miles(geocoded, map_center);
    if offset > GEOCODE_OFFSET_WARN_MILES {
        warn!(
            "⚠️ 地理编码坐标 {} 与门户地图坐标 {} 相差 {:.2} 英里",
            geocoded, map_center, offset
        );
    } else {
        debug!("地理编码与门户坐标相差 {:.3} 英里", offset);
    }
}
