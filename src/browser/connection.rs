use anyhow::Result;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::BrowserError;

/// 连接到已打开的浏览器并获取页面
///
/// 适合复用一个已经登录过 Canvas 的浏览器（`--remote-debugging-port`）。
///
/// # 参数
/// - `port`: 浏览器调试端口
/// - `target_url`: 没有匹配的标签页时新开页面要打开的地址
/// - `url_fragment`: 优先选用 URL 中包含该片段的已有标签页
pub async fn connect_to_browser_and_page(
    port: u16,
    target_url: Option<&str>,
    url_fragment: Option<&str>,
) -> Result<(Browser, Page)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);
    debug!("目标 URL: {:?}, URL 片段: {:?}", target_url, url_fragment);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        BrowserError::connection_failed(port, e)
    })?;
    debug!("浏览器连接成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let pages = browser.pages().await.map_err(BrowserError::from)?;
    debug!("获取到 {} 个页面", pages.len());

    if let Some(fragment) = url_fragment {
        debug!("正在查找 URL 包含 '{}' 的页面", fragment);
        for p in pages.iter() {
            if let Ok(Some(page_url)) = p.url().await {
                debug!("检查页面: {}", page_url);
                if page_url.contains(fragment) {
                    info!("✓ 找到目标页面: {}", page_url);
                    return Ok((browser, p.clone()));
                }
            }
        }
        debug!("未找到匹配的页面，将创建新页面");
    }

    let url = target_url.unwrap_or("about:blank");
    debug!("创建新页面并导航到: {}", url);
    let page = browser.new_page(url).await.map_err(|e| {
        error!("创建新页面失败: {}", e);
        BrowserError::navigation_failed(url, e)
    })?;
    info!("已打开: {}", url);

    Ok((browser, page))
}
