use anyhow::Result;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::AppError;
use crate::services::confirmation::is_supported_host;

/// 一个已打开标签页的地址和标题
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabInfo {
    pub url: String,
    pub title: String,
}

/// 从已打开的标签页中选出日历页
///
/// 地址在日历站点上的标签页优先（多个时取第一个），
/// 其次是标题包含 `target_title` 的标签页
pub fn pick_calendar_tab(tabs: &[TabInfo], target_title: Option<&str>) -> Option<usize> {
    tabs.iter()
        .position(|tab| is_supported_host(&tab.url))
        .or_else(|| {
            let title = target_title.filter(|t| !t.is_empty())?;
            tabs.iter().position(|tab| tab.title.contains(title))
        })
}

/// 连接到已打开的浏览器并获取日历页面
///
/// 优先复用已登录的日历标签页，找不到时新开一个页面并导航到 `target_url`
pub async fn connect_to_browser_and_page(
    port: u16,
    target_url: Option<&str>,
    target_title: Option<&str>,
) -> Result<(Browser, Page)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        AppError::browser_connection_failed(port, e)
    })?;

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 等待浏览器同步已打开的标签页
    sleep(tokio::time::Duration::from_millis(300)).await;

    let pages = browser.pages().await?;
    let mut tabs = Vec::with_capacity(pages.len());
    for page in &pages {
        let tab = TabInfo {
            url: page.url().await.ok().flatten().unwrap_or_default(),
            title: page.get_title().await.ok().flatten().unwrap_or_default(),
        };
        debug!("已打开的标签页: {} ({})", tab.title, tab.url);
        tabs.push(tab);
    }

    if let Some(index) = pick_calendar_tab(&tabs, target_title) {
        info!("✓ 复用日历标签页: {} ({})", tabs[index].title, tabs[index].url);
        return Ok((browser, pages[index].clone()));
    }

    let url = target_url.unwrap_or("about:blank");
    info!("{} 个标签页中没有日历页面，新开页面: {}", tabs.len(), url);
    let page = browser.new_page(url).await.map_err(|e| {
        error!("打开 {} 失败: {}", url, e);
        e
    })?;

    Ok((browser, page))
}
