use std::path::Path;

use anyhow::Result;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::BrowserError;

/// 启动无头浏览器并导航到指定 URL
///
/// # 参数
/// - `url`: 初始页面
/// - `chrome_executable`: 浏览器可执行文件，为 None 时由 chromiumoxide 自动查找
pub async fn launch_headless_browser(
    url: &str,
    chrome_executable: Option<&str>,
) -> Result<(Browser, Page)> {
    info!("🚀 启动无头浏览器...");
    debug!("目标 URL: {}, 可执行文件: {:?}", url, chrome_executable);

    let mut builder = BrowserConfig::builder().new_headless_mode().args(vec![
        "--no-sandbox",              // 容器里没有沙盒权限
        "--disable-setuid-sandbox",
        "--disable-gpu",
        "--disable-dev-shm-usage",   // 防止共享内存不足
    ]);
    if let Some(executable) = chrome_executable {
        builder = builder.chrome_executable(Path::new(executable));
    }
    let config = builder.build().map_err(|e| {
        error!("配置无头浏览器失败: {}", e);
        BrowserError::LaunchFailed { message: e }
    })?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动无头浏览器失败: {}", e);
        BrowserError::LaunchFailed {
            message: e.to_string(),
        }
    })?;
    debug!("无头浏览器启动成功");

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

    let page = browser.new_page(url).await.map_err(|e| {
        error!("创建页面失败: {}", e);
        BrowserError::navigation_failed(url, e)
    })?;

    info!("✅ 无头浏览器已打开: {}", url);
    Ok((browser, page))
}
