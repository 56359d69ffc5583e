use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::{AppResult, BrowserError};

/// 连接到已打开远程调试端口的浏览器，新建标签页并导航到门户
///
/// # 返回
/// 返回 (浏览器, 页面, 事件处理任务)
pub async fn connect_to_browser_and_page(
    port: u16,
    portal_url: &str,
) -> AppResult<(Browser, Page, JoinHandle<()>)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        BrowserError::ConnectionFailed { port, source: e }
    })?;
    debug!("浏览器连接成功");

    // 在后台处理浏览器事件
    let handler_task = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建新页面失败: {}", e);
        BrowserError::PageCreationFailed { source: e }
    })?;
    page.goto(portal_url).await.map_err(|e| {
        error!("导航到 {} 失败: {}", portal_url, e);
        BrowserError::PageCreationFailed { source: e }
    })?;
    info!("已导航到: {}", portal_url);

    Ok((browser, page, handler_task))
}
