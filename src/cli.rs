//! 命令行参数
//!
//! 命令行参数优先级最高：配置文件 < `PROPERTY_*` 环境变量 < 命令行。

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

/// 抓取目标地块及其周边地块的资料，写成 CSV
///
/// ```sh
/// property_scraper --address "4116 Tipperary Place, Charlotte NC 28215" --radius 2
/// property_scraper --config scraper.toml --strict-radius --headful
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// TOML 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 目标地址
    #[arg(short, long)]
    pub address: Option<String>,

    /// 搜索半径（英里）
    #[arg(short, long)]
    pub radius: Option<f64>,

    /// 等待页面元素的超时（秒）
    #[arg(long)]
    pub timeout: Option<u64>,

    /// 候选地址之间的间隔（秒）
    #[arg(long)]
    pub delay: Option<u64>,

    /// CSV 输出目录
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// 超出半径的候选直接丢弃
    #[arg(long)]
    pub strict_radius: bool,

    /// 显示浏览器窗口
    #[arg(long)]
    pub headful: bool,

    /// 连接已在该调试端口运行的浏览器，而不是启动新的
    #[arg(long)]
    pub debug_port: Option<u16>,

    /// 输出调试日志
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// 把命令行给出的值覆盖到配置上
    pub fn apply(&self, config: &mut Config) {
        if let Some(address) = &self.address {
            config.target_address = address.clone();
        }
        if let Some(radius) = self.radius {
            config.radius_miles = radius;
        }
        if let Some(timeout) = self.timeout {
            config.wait_timeout_secs = timeout;
        }
        if let Some(delay) = self.delay {
            config.pacing_delay_secs = delay;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if self.strict_radius {
            config.strict_radius = true;
        }
        if self.headful {
            config.headless = false;
        }
        if let Some(port) = self.debug_port {
            config.browser_debug_port = Some(port);
        }
        if self.verbose {
            config.verbose_logging = true;
        }
    }
}
