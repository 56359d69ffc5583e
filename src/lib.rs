//! # Property Scraper
//!
//! 从县级地块门户抓取目标地块及其周边地块的资料，写成 CSV
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（浏览器会话），只暴露能力
//! - `PageDriver` - 页面操作能力（导航、查找、点击、输入、执行脚本）
//! - `ChromiumDriver` - 基于 chromiumoxide 的实现
//! - `BrowserSession` - 会话的打开与释放
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个地址
//! - `Geocoder` - 地址 → 坐标
//! - `PropertyLocator` / `PropertyExtractor` - 在门户上定位地块并读取字段
//! - `NearbyDiscovery` - 缓冲区工具列出周边地址
//! - `ResultWriter` - 写 CSV
//!
//! ### ③ 流程层（Workflow）
//! - `CandidateFlow` - 一个地址的 定位 → 抽取 → 距离校验
//!
//! ### ④ 编排层（Orchestration）
//! - `DiscoveryOrchestrator` - 目标 → 周边 → 候选的状态机
//! - `App` - 会话生命周期、持久化、统计

pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{BrowserSession, ChromiumDriver, Locator, PageDriver};
pub use models::{Coordinate, PropertyRecord};
pub use orchestrator::{App, DiscoveryOrchestrator, DiscoveryReport, RunState, RunStats};
pub use workflow::{CandidateCtx, CandidateFlow, CandidateResult};
