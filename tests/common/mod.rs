//! 测试用的脚本化门户和地理编码
//!
//! `FakePortal` 按 `PortalSelectors::default()` 识别定位器，
//! 按地址返回预设的字段和坐标，并记录每一次页面交互。

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use tokio::time::Instant;

use property_scraper::error::{DriverError, DriverResult};
use property_scraper::infrastructure::WaitOutcome;
use property_scraper::models::{PortalSelectors, PROPERTY_FIELDS};
use property_scraper::services::Geocoder;
use property_scraper::{Config, Coordinate, Locator, PageDriver};

pub const PORTAL_URL: &str = "https://portal.test/";
pub const TARGET: &str = "4116 Tipperary Place, Charlotte NC 28215";

/// 门户上的一个地块
#[derive(Debug, Clone, Default)]
pub struct FakeParcel {
    /// 标签 → 显示值
    pub fields: HashMap<&'static str, String>,
    pub coordinate: Option<(f64, f64)>,
    /// 读取地图中心的脚本报错
    pub script_error: bool,
    /// 点击搜索结果时会话出错
    pub click_error: bool,
}

impl FakeParcel {
    /// 所有字段齐全的地块，字段值由显示地址派生
    pub fn complete(shown_address: &str, lat: f64, lng: f64) -> Self {
        let fields = PROPERTY_FIELDS
            .iter()
            .map(|spec| {
                let value = if spec.label == "Address" {
                    shown_address.to_string()
                } else {
                    format!("{} of {}", spec.label, shown_address)
                };
                (spec.label, value)
            })
            .collect();
        Self {
            fields,
            coordinate: Some((lat, lng)),
            ..Default::default()
        }
    }

    pub fn without_map(mut self) -> Self {
        self.script_error = true;
        self
    }

    pub fn flaky(mut self) -> Self {
        self.click_error = true;
        self
    }
}

/// 可有可无的页面元素（免责声明、信息标签页）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Optional {
    /// 出现，可以点击
    Shown,
    /// 不出现
    Hidden,
    /// 出现，但点击时会话出错
    Broken,
}

#[derive(Debug, Default)]
struct PageState {
    url: String,
    disclaimer_dismissed: bool,
    typed_query: Option<String>,
    opened: Option<String>,
    buffer_open: bool,
    buffer_applied: bool,
    /// 等待搜索框的次数，每次定位一次
    search_attempts: usize,
    /// 每次输入搜索地址的时刻
    search_times: Vec<Instant>,
    calls: Vec<String>,
}

/// 脚本化门户
pub struct FakePortal {
    selectors: PortalSelectors,
    parcels: HashMap<String, FakeParcel>,
    buffer_results: Vec<String>,
    disclaimer: Optional,
    info_tab: Optional,
    /// 这些次定位（从 0 开始）时搜索框不出现
    search_input_missing: HashSet<usize>,
    state: Mutex<PageState>,
}

impl FakePortal {
    pub fn new() -> Self {
        Self {
            selectors: PortalSelectors::default(),
            parcels: HashMap::new(),
            buffer_results: Vec::new(),
            disclaimer: Optional::Shown,
            info_tab: Optional::Shown,
            search_input_missing: HashSet::new(),
            state: Mutex::new(PageState {
                url: "about:blank".to_string(),
                ..Default::default()
            }),
        }
    }

    /// 登记一个可搜索到的地址
    pub fn with_parcel(mut self, query: &str, parcel: FakeParcel) -> Self {
        self.parcels.insert(query.to_string(), parcel);
        self
    }

    /// 缓冲区工具列出的地址（原样显示文本）
    pub fn with_buffer_results(mut self, addresses: &[&str]) -> Self {
        self.buffer_results = addresses.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_disclaimer(mut self, disclaimer: Optional) -> Self {
        self.disclaimer = disclaimer;
        self
    }

    pub fn with_info_tab(mut self, info_tab: Optional) -> Self {
        self.info_tab = info_tab;
        self
    }

    /// 第 `attempt` 次定位（目标为 0，之后每个候选加 1）时搜索框不出现
    pub fn without_search_input_on(mut self, attempt: usize) -> Self {
        self.search_input_missing.insert(attempt);
        self
    }

    /// 每次输入搜索地址的时刻，按顺序
    pub fn search_times(&self) -> Vec<Instant> {
        self.state.lock().unwrap().search_times.clone()
    }

    /// 所有页面交互记录
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clicked(&self, locator: &Locator) -> bool {
        let needle = format!("click {}", locator);
        self.calls().iter().any(|c| *c == needle)
    }

    fn log(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn opened_parcel(&self, state: &PageState) -> Option<&FakeParcel> {
        state.opened.as_ref().and_then(|q| self.parcels.get(q))
    }

    fn is_present(&self, locator: &Locator) -> bool {
        let s = &self.selectors;
        let state = self.state.lock().unwrap();
        if *locator == s.disclaimer_close() {
            match self.disclaimer {
                Optional::Shown => !state.disclaimer_dismissed,
                Optional::Hidden => false,
                Optional::Broken => true,
            }
        } else if *locator == s.search_input() {
            true
        } else if *locator == s.search_result_item() {
            state
                .typed_query
                .as_ref()
                .is_some_and(|q| self.parcels.contains_key(q))
        } else if *locator == s.info_tab() {
            state.opened.is_some() && self.info_tab != Optional::Hidden
        } else if *locator == s.map_tools_button() {
            state.opened.is_some()
        } else if *locator == s.buffer_button() {
            state.opened.is_some() && !self.buffer_results.is_empty()
        } else if *locator == s.buffer_distance_input()
            || *locator == s.buffer_unit_select()
            || *locator == s.buffer_apply_button()
        {
            state.buffer_open
        } else if *locator == s.buffer_results_panel() {
            state.buffer_applied
        } else {
            false
        }
    }
}

#[async_trait]
impl PageDriver for FakePortal {
    async fn navigate(&self, url: &str) -> DriverResult<()> {
        self.log(format!("navigate {}", url));
        let mut state = self.state.lock().unwrap();
        state.url = url.to_string();
        state.typed_query = None;
        state.opened = None;
        state.buffer_open = false;
        state.buffer_applied = false;
        Ok(())
    }

    async fn current_url(&self) -> DriverResult<String> {
        Ok(self.state.lock().unwrap().url.clone())
    }

    async fn find_text(&self, locator: &Locator) -> DriverResult<Option<String>> {
        let state = self.state.lock().unwrap();
        let Some(parcel) = self.opened_parcel(&state) else {
            return Ok(None);
        };
        let text = PROPERTY_FIELDS
            .iter()
            .find(|spec| self.selectors.field_value(spec.label) == *locator)
            .and_then(|spec| parcel.fields.get(spec.label))
            .map(|v| format!("  {}\n", v));
        Ok(text)
    }

    async fn find_all_text(&self, locator: &Locator) -> DriverResult<Vec<String>> {
        let state = self.state.lock().unwrap();
        if *locator == self.selectors.buffer_result_address() && state.buffer_applied {
            return Ok(self.buffer_results.clone());
        }
        Ok(Vec::new())
    }

    async fn click(&self, locator: &Locator) -> DriverResult<()> {
        if !self.is_present(locator) {
            return Err(DriverError::ElementNotFound(locator.clone()));
        }
        self.log(format!("click {}", locator));

        let s = &self.selectors;
        let mut state = self.state.lock().unwrap();
        if *locator == s.disclaimer_close() {
            if self.disclaimer == Optional::Broken {
                return Err(DriverError::Script("overlay detached".to_string()));
            }
            state.disclaimer_dismissed = true;
        } else if *locator == s.info_tab() {
            if self.info_tab == Optional::Broken {
                return Err(DriverError::Script("tab detached".to_string()));
            }
        } else if *locator == s.search_result_item() {
            let query = state.typed_query.clone().unwrap_or_default();
            if self.parcels.get(&query).is_some_and(|p| p.click_error) {
                return Err(DriverError::Script("target closed".to_string()));
            }
            state.url = format!("{}#parcel", PORTAL_URL);
            state.opened = Some(query);
        } else if *locator == s.buffer_button() {
            state.buffer_open = true;
        } else if *locator == s.buffer_apply_button() {
            state.buffer_applied = true;
        }
        Ok(())
    }

    async fn type_into(&self, locator: &Locator, text: &str) -> DriverResult<()> {
        if !self.is_present(locator) {
            return Err(DriverError::ElementNotFound(locator.clone()));
        }
        self.log(format!("type {} {}", locator, text));
        if *locator == self.selectors.search_input() {
            let mut state = self.state.lock().unwrap();
            state.typed_query = Some(text.to_string());
            state.search_times.push(Instant::now());
        }
        Ok(())
    }

    async fn select_option(&self, locator: &Locator, option_text: &str) -> DriverResult<()> {
        if !self.is_present(locator) {
            return Err(DriverError::ElementNotFound(locator.clone()));
        }
        self.log(format!("select {} {}", locator, option_text));
        Ok(())
    }

    async fn wait_for(&self, locator: &Locator, _timeout: Duration) -> DriverResult<WaitOutcome> {
        if *locator == self.selectors.search_input() {
            let mut state = self.state.lock().unwrap();
            let attempt = state.search_attempts;
            state.search_attempts += 1;
            if self.search_input_missing.contains(&attempt) {
                return Ok(WaitOutcome::TimedOut);
            }
        }
        if self.is_present(locator) {
            Ok(WaitOutcome::Present)
        } else {
            Ok(WaitOutcome::TimedOut)
        }
    }

    async fn run_script(&self, _code: &str) -> DriverResult<JsonValue> {
        let state = self.state.lock().unwrap();
        let Some(parcel) = self.opened_parcel(&state) else {
            return Err(DriverError::Script("map is not defined".to_string()));
        };
        if parcel.script_error {
            return Err(DriverError::Script("map is not defined".to_string()));
        }
        Ok(match parcel.coordinate {
            Some((lat, lng)) => json!({ "lat": lat, "lng": lng }),
            None => json!({ "lat": null, "lng": null }),
        })
    }
}

/// 固定结果的地理编码
pub struct FakeGeocoder(pub Option<Coordinate>);

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn resolve(&self, _address: &str) -> Option<Coordinate> {
        self.0
    }
}

/// 不等待、不间隔的测试配置
pub fn test_config() -> Config {
    Config {
        portal_url: PORTAL_URL.to_string(),
        target_address: TARGET.to_string(),
        radius_miles: 2.0,
        wait_timeout_secs: 1,
        pacing_delay_secs: 0,
        settle_delay_ms: 0,
        optional_wait_secs: 0,
        ..Config::default()
    }
}
