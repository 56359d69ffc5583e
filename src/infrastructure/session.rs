//! 浏览器会话 - 基础设施层
//!
//! 一次运行只打开一个会话，由编排层独占。
//! `close()` 是正常释放路径；提前返回或被中断时由 `Drop` 兜底。

use chromiumoxide::Browser;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::browser;
use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::chromium_driver::ChromiumDriver;

/// 浏览器会话
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    driver: ChromiumDriver,
    /// 浏览器由本进程启动（而不是连接到已有实例）
    launched: bool,
    closed: bool,
}

impl BrowserSession {
    /// 建立会话：配置了调试端口就连接已有浏览器，否则启动无头浏览器
    pub async fn open(config: &Config) -> AppResult<Self> {
        let (browser, page, handler, launched) = match config.browser_debug_port {
            Some(port) => {
                let (browser, page, handler) =
                    browser::connect_to_browser_and_page(port, &config.portal_url).await?;
                (browser, page, handler, false)
            }
            None => {
                let (browser, page, handler) = browser::launch_headless_browser(config).await?;
                (browser, page, handler, true)
            }
        };

        Ok(Self {
            browser,
            handler,
            driver: ChromiumDriver::new(page),
            launched,
            closed: false,
        })
    }

    /// 会话上的页面驱动
    pub fn driver(&self) -> &ChromiumDriver {
        &self.driver
    }

    /// 释放会话
    ///
    /// 自己启动的浏览器整个关闭；连接来的浏览器只关闭本次创建的标签页。
    pub async fn close(mut self) {
        info!("🧹 正在释放浏览器会话...");
        if self.launched {
            if let Err(e) = self.browser.close().await {
                warn!("关闭浏览器失败: {}", e);
            }
            if let Err(e) = self.browser.wait().await {
                warn!("等待浏览器进程退出失败: {}", e);
            }
        } else if let Err(e) = self.driver.page().clone().close().await {
            warn!("关闭标签页失败: {}", e);
        }
        self.handler.abort();
        self.closed = true;
        info!("✓ 浏览器会话已释放");
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        warn!("⚠️ 浏览器会话未正常关闭，随进程清理");
        if self.launched {
            // Browser 自身的 Drop 会结束它启动的子进程
            self.handler.abort();
            return;
        }

        // 连接来的浏览器不归本进程所有：尽力关掉本次创建的标签页，之后再停事件循环
        let handler = self.handler.abort_handle();
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let page = self.driver.page().clone();
                runtime.spawn(async move {
                    if let Err(e) = page.close().await {
                        warn!("关闭标签页失败: {}", e);
                    }
                    handler.abort();
                });
            }
            Err(_) => handler.abort(),
        }
    }
}
