//! 可选步骤
//!
//! "尝试执行；做成了或者元素本来就不存在，都是正常结果"。
//! 只有真正的交互故障才会以 `Err` 返回，由调用方决定记日志还是继续。

use std::time::Duration;

use crate::error::{DriverError, DriverResult};
use crate::infrastructure::page_driver::{Locator, PageDriver, WaitOutcome};

/// 可选步骤的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// 已执行
    Performed,
    /// 元素不存在，跳过
    Absent,
}

/// 等待元素出现后点击；等不到或点击时元素已消失都算 `Absent`
pub async fn attempt_click(
    driver: &dyn PageDriver,
    locator: &Locator,
    wait: Duration,
) -> DriverResult<StepOutcome> {
    if driver.wait_for(locator, wait).await? == WaitOutcome::TimedOut {
        return Ok(StepOutcome::Absent);
    }

    match driver.click(locator).await {
        Ok(()) => Ok(StepOutcome::Performed),
        Err(DriverError::ElementNotFound(_)) => Ok(StepOutcome::Absent),
        Err(e) => Err(e),
    }
}
