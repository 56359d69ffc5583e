//! 周边地块发现服务 - 业务能力层
//!
//! 用门户自带的缓冲区工具列出目标地块周围的地址。
//! 工具不可用或结果为空时返回空列表，不算错误。

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::DriverResult;
use crate::infrastructure::{attempt_click, PageDriver, StepOutcome, WaitOutcome};
use crate::models::property::normalize_text;
use crate::models::{Coordinate, PortalSelectors};

/// 周边地块发现服务
///
/// 职责：
/// - 打开缓冲区工具，设置距离和单位，应用
/// - 读取结果面板中每一项的地址
/// - 排除目标地址本身（按字符串完全相等）
/// - 假定目标地块的地图视图已经打开
pub struct NearbyDiscovery {
    selectors: PortalSelectors,
    wait_timeout: Duration,
    settle_delay: Duration,
}

impl NearbyDiscovery {
    /// 创建新的发现服务
    pub fn new(config: &Config) -> Self {
        Self {
            selectors: config.selectors.clone(),
            wait_timeout: config.wait_timeout(),
            settle_delay: config.settle_delay(),
        }
    }

    /// 列出 `center` 周围 `radius_miles` 英里内的地址，按门户列出的顺序
    pub async fn discover(
        &self,
        driver: &dyn PageDriver,
        center: Coordinate,
        radius_miles: f64,
        target_address: &str,
    ) -> Vec<String> {
        info!("🗺️ 以 {} 为中心搜索 {} 英里内的地块", center, radius_miles);
        match self.try_discover(driver, radius_miles, target_address).await {
            Ok(addresses) => addresses,
            Err(e) => {
                warn!("⚠️ 缓冲区工具不可用: {}", e);
                Vec::new()
            }
        }
    }

    async fn try_discover(
        &self,
        driver: &dyn PageDriver,
        radius_miles: f64,
        target_address: &str,
    ) -> DriverResult<Vec<String>> {
        let buffer_button = self.selectors.buffer_button();
        if attempt_click(driver, &buffer_button, self.wait_timeout).await? == StepOutcome::Absent {
            warn!("⚠️ 未找到缓冲区工具: {}", buffer_button);
            return Ok(Vec::new());
        }

        let distance_input = self.selectors.buffer_distance_input();
        if driver.wait_for(&distance_input, self.wait_timeout).await? == WaitOutcome::TimedOut {
            warn!("⚠️ 缓冲距离输入框未出现: {}", distance_input);
            return Ok(Vec::new());
        }
        driver
            .type_into(&distance_input, &radius_miles.to_string())
            .await?;
        driver
            .select_option(
                &self.selectors.buffer_unit_select(),
                &self.selectors.buffer_unit_option,
            )
            .await?;
        driver.click(&self.selectors.buffer_apply_button()).await?;
        debug!("已应用 {} 英里缓冲区", radius_miles);

        sleep(self.settle_delay).await;

        let panel = self.selectors.buffer_results_panel();
        if driver.wait_for(&panel, self.wait_timeout).await? == WaitOutcome::TimedOut {
            info!("缓冲区内没有找到地块");
            return Ok(Vec::new());
        }

        let addresses = driver
            .find_all_text(&self.selectors.buffer_result_address())
            .await?
            .iter()
            .map(|raw| normalize_text(raw))
            .filter(|address| !address.is_empty() && address != target_address)
            .collect();
        Ok(addresses)
    }
}
