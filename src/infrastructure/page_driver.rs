//! 页面交互能力 - 基础设施层
//!
//! 核心只依赖这个 trait，不直接接触 chromiumoxide。
//! 测试里用脚本化的假门户实现它。

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::DriverResult;

/// 元素定位方式
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// CSS 选择器
    Css(String),
    /// XPath 表达式
    XPath(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Locator::XPath(expr.into())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css={}", s),
            Locator::XPath(s) => write!(f, "xpath={}", s),
        }
    }
}

/// 有界等待的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// 元素已出现
    Present,
    /// 超时仍未出现
    TimedOut,
}

/// 页面交互能力
///
/// 职责：
/// - 只暴露导航 / 查找 / 点击 / 输入 / 等待 / 执行脚本
/// - 不认识地址、地块、半径
/// - 所有调用都在同一个会话上串行进行
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// 导航到指定 URL
    async fn navigate(&self, url: &str) -> DriverResult<()>;

    /// 当前页面 URL
    async fn current_url(&self) -> DriverResult<String>;

    /// 读取元素文本（已 trim），元素不存在时返回 `None`
    async fn find_text(&self, locator: &Locator) -> DriverResult<Option<String>>;

    /// 读取所有匹配元素的文本，按文档顺序
    async fn find_all_text(&self, locator: &Locator) -> DriverResult<Vec<String>>;

    /// 点击元素，元素不存在时返回 `DriverError::ElementNotFound`
    async fn click(&self, locator: &Locator) -> DriverResult<()>;

    /// 清空输入框并输入文本
    async fn type_into(&self, locator: &Locator, text: &str) -> DriverResult<()>;

    /// 在下拉框中按显示文本选择选项
    async fn select_option(&self, locator: &Locator, option_text: &str) -> DriverResult<()>;

    /// 等待元素出现，最多等待 `timeout`
    async fn wait_for(&self, locator: &Locator, timeout: Duration) -> DriverResult<WaitOutcome>;

    /// 执行 JS 代码并返回 JSON 结果
    async fn run_script(&self, code: &str) -> DriverResult<JsonValue>;
}
