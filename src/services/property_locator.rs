//! 地块定位服务 - 业务能力层
//!
//! 在门户上搜索一个地址并打开第一个搜索结果，不关心流程

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{DriverError, DriverResult};
use crate::infrastructure::{attempt_click, PageDriver, StepOutcome, WaitOutcome};
use crate::models::PortalSelectors;

/// 定位结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocateOutcome {
    /// 已打开地块详情
    Found,
    /// 搜索无结果（地址写错或已注销），属于正常结果
    NotFound,
    /// 门户不可用或页面结构不符，只影响当前地址
    TransientError(String),
}

/// 地块定位服务
///
/// 职责：
/// - 重新打开门户首页、关闭免责声明、输入地址、点击第一个结果
/// - 只处理单个地址
pub struct PropertyLocator {
    portal_url: String,
    selectors: PortalSelectors,
    wait_timeout: Duration,
    optional_wait: Duration,
    settle_delay: Duration,
}

impl PropertyLocator {
    /// 创建新的定位服务
    pub fn new(config: &Config) -> Self {
        Self {
            portal_url: config.portal_url.clone(),
            selectors: config.selectors.clone(),
            wait_timeout: config.wait_timeout(),
            optional_wait: config.optional_wait(),
            settle_delay: config.settle_delay(),
        }
    }

    /// 搜索地址并打开第一个匹配结果
    pub async fn locate(&self, driver: &dyn PageDriver, address: &str) -> LocateOutcome {
        match self.try_locate(driver, address).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("[{}] 定位时页面交互失败: {}", address, e);
                LocateOutcome::TransientError(e.to_string())
            }
        }
    }

    async fn try_locate(
        &self,
        driver: &dyn PageDriver,
        address: &str,
    ) -> DriverResult<LocateOutcome> {
        self.reset_to_landing(driver).await?;
        self.dismiss_disclaimer(driver).await;

        // 搜索框都找不到，说明门户本身出了问题
        let input = self.selectors.search_input();
        if driver.wait_for(&input, self.wait_timeout).await? == WaitOutcome::TimedOut {
            return Ok(LocateOutcome::TransientError(format!(
                "搜索框未出现: {}",
                input
            )));
        }
        driver.type_into(&input, address).await?;
        debug!("[{}] 已输入地址，等待搜索结果", address);
        sleep(self.settle_delay).await;

        let result_item = self.selectors.search_result_item();
        if driver.wait_for(&result_item, self.wait_timeout).await? == WaitOutcome::TimedOut {
            info!("[{}] 没有搜索结果", address);
            return Ok(LocateOutcome::NotFound);
        }
        match driver.click(&result_item).await {
            Ok(()) => {}
            Err(DriverError::ElementNotFound(_)) => {
                info!("[{}] 搜索结果已消失", address);
                return Ok(LocateOutcome::NotFound);
            }
            Err(e) => return Err(e),
        }

        // 等待地块详情加载
        sleep(self.settle_delay).await;
        Ok(LocateOutcome::Found)
    }

    /// 每次搜索前都重新打开门户首页
    ///
    /// 门户是单页应用，上一个地块的详情和缓冲区面板可能还开着而 URL 不变。
    async fn reset_to_landing(&self, driver: &dyn PageDriver) -> DriverResult<()> {
        debug!("返回门户首页: {}", self.portal_url);
        driver.navigate(&self.portal_url).await
    }

    /// 关闭免责声明弹窗；弹窗不存在是正常情况
    async fn dismiss_disclaimer(&self, driver: &dyn PageDriver) {
        let close_button = self.selectors.disclaimer_close();
        match attempt_click(driver, &close_button, self.optional_wait).await {
            Ok(StepOutcome::Performed) => debug!("已关闭免责声明"),
            Ok(StepOutcome::Absent) => {}
            Err(e) => warn!("关闭免责声明失败，继续: {}", e),
        }
    }
}
