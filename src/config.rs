use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, AppResult, ConfigError};
use crate::models::PortalSelectors;

/// 程序配置
///
/// 加载顺序：默认值 → TOML 文件（可选）→ `PROPERTY_*` 环境变量 → 命令行参数
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 门户首页
    pub portal_url: String,
    /// 目标地址
    pub target_address: String,
    /// 搜索半径（英里）
    pub radius_miles: f64,
    /// 每次等待页面元素的超时（秒）
    pub wait_timeout_secs: u64,
    /// 两个候选地址之间的间隔（秒）
    pub pacing_delay_secs: u64,
    /// 点击 / 输入后等待页面渲染的时间（毫秒）
    pub settle_delay_ms: u64,
    /// 可选步骤（免责声明、标签页）的等待时间（秒）
    pub optional_wait_secs: u64,
    /// 是否把距离校验作为硬过滤
    pub strict_radius: bool,
    /// CSV 输出目录
    pub output_dir: String,
    /// 是否无头模式启动浏览器
    pub headless: bool,
    /// 浏览器可执行文件路径，不填则自动查找
    pub chrome_executable: Option<String>,
    /// 连接已有浏览器的调试端口，填了就不再启动新浏览器
    pub browser_debug_port: Option<u16>,
    /// 地理编码服务地址
    pub geocoder_url: String,
    /// 地理编码请求的 User-Agent
    pub geocoder_user_agent: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 门户选择器
    pub selectors: PortalSelectors,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            portal_url: "https://polaris3g.mecklenburgcountync.gov/".to_string(),
            target_address: "4116 Tipperary Place, Charlotte NC 28215".to_string(),
            radius_miles: 2.0,
            wait_timeout_secs: 10,
            pacing_delay_secs: 1,
            settle_delay_ms: 2000,
            optional_wait_secs: 3,
            strict_radius: false,
            output_dir: ".".to_string(),
            headless: true,
            chrome_executable: None,
            browser_debug_port: None,
            geocoder_url: "https://nominatim.openstreetmap.org".to_string(),
            geocoder_user_agent: "property_scraper".to_string(),
            verbose_logging: false,
            selectors: PortalSelectors::default(),
        }
    }
}

impl Config {
    /// 加载配置：配置文件（可选）+ 环境变量
    pub async fn load(config_file: Option<&Path>) -> AppResult<Self> {
        let mut config = match config_file {
            Some(path) => crate::models::load_config_file(path).await?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// 用环境变量覆盖配置
    ///
    /// `lookup` 按变量名取值，便于测试时不依赖真实环境。
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> AppResult<()> {
        if let Some(v) = lookup("PROPERTY_PORTAL_URL") {
            self.portal_url = v;
        }
        if let Some(v) = lookup("PROPERTY_TARGET_ADDRESS") {
            self.target_address = v;
        }
        if let Some(v) = parse_env(&lookup, "PROPERTY_RADIUS_MILES", "f64")? {
            self.radius_miles = v;
        }
        if let Some(v) = parse_env(&lookup, "PROPERTY_WAIT_TIMEOUT_SECS", "u64")? {
            self.wait_timeout_secs = v;
        }
        if let Some(v) = parse_env(&lookup, "PROPERTY_PACING_DELAY_SECS", "u64")? {
            self.pacing_delay_secs = v;
        }
        if let Some(v) = parse_env(&lookup, "PROPERTY_SETTLE_DELAY_MS", "u64")? {
            self.settle_delay_ms = v;
        }
        if let Some(v) = parse_env(&lookup, "PROPERTY_STRICT_RADIUS", "bool")? {
            self.strict_radius = v;
        }
        if let Some(v) = lookup("PROPERTY_OUTPUT_DIR") {
            self.output_dir = v;
        }
        if let Some(v) = parse_env(&lookup, "PROPERTY_HEADLESS", "bool")? {
            self.headless = v;
        }
        if let Some(v) = lookup("PROPERTY_CHROME_EXECUTABLE") {
            self.chrome_executable = Some(v);
        }
        if let Some(v) = parse_env(&lookup, "PROPERTY_BROWSER_DEBUG_PORT", "u16")? {
            self.browser_debug_port = Some(v);
        }
        if let Some(v) = lookup("PROPERTY_GEOCODER_URL") {
            self.geocoder_url = v;
        }
        if let Some(v) = parse_env(&lookup, "PROPERTY_VERBOSE_LOGGING", "bool")? {
            self.verbose_logging = v;
        }
        Ok(())
    }

    /// 校验配置
    pub fn validate(&self) -> AppResult<()> {
        if self.target_address.trim().is_empty() {
            return Err(AppError::invalid_config("target_address", "不能为空"));
        }
        if !self.radius_miles.is_finite() || self.radius_miles <= 0.0 {
            return Err(AppError::invalid_config(
                "radius_miles",
                format!("必须为正数, 当前为 {}", self.radius_miles),
            ));
        }
        if self.wait_timeout_secs == 0 {
            return Err(AppError::invalid_config("wait_timeout_secs", "必须大于 0"));
        }
        if self.portal_url.trim().is_empty() {
            return Err(AppError::invalid_config("portal_url", "不能为空"));
        }
        Ok(())
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn pacing_delay(&self) -> Duration {
        Duration::from_secs(self.pacing_delay_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn optional_wait(&self) -> Duration {
        Duration::from_secs(self.optional_wait_secs)
    }
}

fn parse_env<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var_name: &str,
    expected_type: &str,
) -> AppResult<Option<T>> {
    let Some(value) = lookup(var_name) else {
        return Ok(None);
    };
    match value.trim().parse::<T>() {
        Ok(parsed) => Ok(Some(parsed)),
        Err(_) => Err(ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value,
            expected_type: expected_type.to_string(),
        }
        .into()),
    }
}
