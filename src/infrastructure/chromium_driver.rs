//! Chromium 页面驱动 - 基础设施层
//!
//! 持有唯一的 page 资源，通过 chromiumoxide 实现 `PageDriver`

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::{DriverError, DriverResult};
use crate::infrastructure::page_driver::{Locator, PageDriver, WaitOutcome};

/// 轮询元素是否出现的间隔
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// 页面脚本的统一返回结构
#[derive(Debug, Deserialize)]
struct Probe {
    found: bool,
    #[serde(default)]
    text: Option<String>,
}

/// Chromium 页面驱动
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 把定位 / 点击 / 输入翻译成页面内 JS
/// - 不认识地址 / 地块
pub struct ChromiumDriver {
    page: Page,
}

impl ChromiumDriver {
    /// 创建新的页面驱动
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    async fn eval(&self, js_code: impl Into<String>) -> DriverResult<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await.map_err(map_cdp)?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> DriverResult<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    async fn probe(&self, locator: &Locator, body: &str) -> DriverResult<Probe> {
        let js_code = format!(
            r#"
            (() => {{
                const el = {};
                if (!el) {{ return {{ found: false }}; }}
                {}
            }})()
            "#,
            resolve_one(locator)?,
            body
        );
        self.eval_as(js_code).await
    }
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn navigate(&self, url: &str) -> DriverResult<()> {
        debug!("导航到: {}", url);
        self.page.goto(url).await.map_err(|e| DriverError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| DriverError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn current_url(&self) -> DriverResult<String> {
        let url = self.page.url().await.map_err(map_cdp)?;
        Ok(url.unwrap_or_default())
    }

    async fn find_text(&self, locator: &Locator) -> DriverResult<Option<String>> {
        let probe = self
            .probe(
                locator,
                "return { found: true, text: (el.innerText || el.textContent || '').trim() };",
            )
            .await?;
        Ok(probe.found.then(|| probe.text.unwrap_or_default()))
    }

    async fn find_all_text(&self, locator: &Locator) -> DriverResult<Vec<String>> {
        let js_code = format!(
            r#"
            (() => {{
                const nodes = {};
                return nodes.map(el => (el.innerText || el.textContent || '').trim());
            }})()
            "#,
            resolve_all(locator)?
        );
        self.eval_as(js_code).await
    }

    async fn click(&self, locator: &Locator) -> DriverResult<()> {
        let probe = self
            .probe(locator, "el.click(); return { found: true };")
            .await?;
        if probe.found {
            Ok(())
        } else {
            Err(DriverError::ElementNotFound(locator.clone()))
        }
    }

    async fn type_into(&self, locator: &Locator, text: &str) -> DriverResult<()> {
        // 先清空，再用真实按键输入，让门户的联想搜索能收到事件
        let probe = self
            .probe(
                locator,
                r#"
                el.focus();
                el.value = '';
                el.dispatchEvent(new Event('input', { bubbles: true }));
                return { found: true };
                "#,
            )
            .await?;
        if !probe.found {
            return Err(DriverError::ElementNotFound(locator.clone()));
        }

        let element = match locator {
            Locator::Css(selector) => self.page.find_element(selector.as_str()).await,
            Locator::XPath(expr) => self.page.find_xpath(expr.as_str()).await,
        }
        .map_err(|_| DriverError::ElementNotFound(locator.clone()))?;

        element.click().await.map_err(map_cdp)?;
        element.type_str(text).await.map_err(map_cdp)?;
        Ok(())
    }

    async fn select_option(&self, locator: &Locator, option_text: &str) -> DriverResult<()> {
        let body = format!(
            r#"
            const wanted = {};
            const opt = Array.from(el.options || []).find(o => (o.text || '').trim() === wanted);
            if (!opt) {{ return {{ found: false }}; }}
            el.value = opt.value;
            el.dispatchEvent(new Event('change', {{ bubbles: true }}));
            return {{ found: true }};
            "#,
            serde_json::to_string(option_text)?
        );
        let probe = self.probe(locator, &body).await?;
        if probe.found {
            Ok(())
        } else {
            Err(DriverError::ElementNotFound(locator.clone()))
        }
    }

    async fn wait_for(&self, locator: &Locator, timeout: Duration) -> DriverResult<WaitOutcome> {
        let deadline = Instant::now() + timeout;
        loop {
            let probe = self.probe(locator, "return { found: true };").await?;
            if probe.found {
                return Ok(WaitOutcome::Present);
            }
            if Instant::now() >= deadline {
                debug!("等待 {} 超时 ({:?})", locator, timeout);
                return Ok(WaitOutcome::TimedOut);
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn run_script(&self, code: &str) -> DriverResult<JsonValue> {
        self.eval(code).await
    }
}

/// 生成"取单个元素"的 JS 表达式
fn resolve_one(locator: &Locator) -> DriverResult<String> {
    Ok(match locator {
        Locator::Css(selector) => {
            format!("document.querySelector({})", serde_json::to_string(selector)?)
        }
        Locator::XPath(expr) => format!(
            "document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
            serde_json::to_string(expr)?
        ),
    })
}

/// 生成"取所有元素（数组）"的 JS 表达式
fn resolve_all(locator: &Locator) -> DriverResult<String> {
    Ok(match locator {
        Locator::Css(selector) => format!(
            "Array.from(document.querySelectorAll({}))",
            serde_json::to_string(selector)?
        ),
        Locator::XPath(expr) => format!(
            r#"(() => {{
                const snap = document.evaluate({}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
                const out = [];
                for (let i = 0; i < snap.snapshotLength; i++) {{ out.push(snap.snapshotItem(i)); }}
                return out;
            }})()"#,
            serde_json::to_string(expr)?
        ),
    })
}

fn map_cdp(err: CdpError) -> DriverError {
    match err {
        CdpError::NoResponse | CdpError::ChannelSendError(_) => DriverError::Disconnected,
        other => DriverError::from(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_one_escapes_selector() {
        let js = resolve_one(&Locator::css("input[placeholder*='Enter address / parcel#']")).unwrap();
        assert_eq!(
            js,
            r#"document.querySelector("input[placeholder*='Enter address / parcel#']")"#
        );

        let js = resolve_one(&Locator::xpath(r#"//div[text()="Disclaimer"]"#)).unwrap();
        assert!(js.starts_with(r#"document.evaluate("//div[text()=\"Disclaimer\"]""#));
        assert!(js.ends_with(".singleNodeValue"));
    }

    #[test]
    fn test_resolve_all_uses_snapshot_for_xpath() {
        let js = resolve_all(&Locator::xpath("//li")).unwrap();
        assert!(js.contains("ORDERED_NODE_SNAPSHOT_TYPE"));

        let js = resolve_all(&Locator::css(".result-item .address")).unwrap();
        assert_eq!(
            js,
            r#"Array.from(document.querySelectorAll(".result-item .address"))"#
        );
    }

    #[test]
    fn test_probe_deserialize() {
        let probe: Probe = serde_json::from_value(serde_json::json!({ "found": false })).unwrap();
        assert!(!probe.found);
        assert!(probe.text.is_none());

        let probe: Probe =
            serde_json::from_value(serde_json::json!({ "found": true, "text": "JOHN DOE" }))
                .unwrap();
        assert_eq!(probe.text.as_deref(), Some("JOHN DOE"));
    }
}
