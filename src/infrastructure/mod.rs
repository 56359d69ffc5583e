//! 基础设施层
//!
//! 持有稀缺资源（浏览器会话 / Page），只向上暴露页面交互能力

pub mod chromium_driver;
pub mod optional_step;
pub mod page_driver;
pub mod session;

pub use chromium_driver::ChromiumDriver;
pub use optional_step::{attempt_click, StepOutcome};
pub use page_driver::{Locator, PageDriver, WaitOutcome};
pub use session::BrowserSession;
