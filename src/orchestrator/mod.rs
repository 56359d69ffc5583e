//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用生命周期
//! - 持有浏览器会话（BrowserSession）
//! - 运行结束后写 CSV、释放会话、输出统计
//!
//! ### `discovery` - 周边地块发现编排器
//! - 目标地址 → 周边发现 → 逐个候选
//! - 维护结果集和运行统计
//!
//! ## 层次关系
//!
//! ```text
//! app (一次运行)
//!     ↓
//! discovery (目标 + Vec<候选地址>)
//!     ↓
//! workflow::CandidateFlow (处理单个地址)
//!     ↓
//! services (能力层：geocode / locate / extract / discover / write)
//!     ↓
//! infrastructure (基础设施：PageDriver)
//! ```

pub mod app;
pub mod discovery;

pub use app::App;
pub use discovery::{DiscoveryOrchestrator, DiscoveryReport, RunState, RunStats};
