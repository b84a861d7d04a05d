//! 事件匹配服务 - 业务能力层
//!
//! 只负责"当前页面上有哪些事件匹配"，不修改页面

use tracing::{debug, info};

use crate::error::AppResult;
use crate::infrastructure::DomProvider;
use crate::models::{ItemRef, MatchCriteria};
use crate::utils::logging::truncate_text;

/// 日历事件文字所在的元素
pub const EVENT_TEXT_KIND: &str = "span";

/// 日志中事件预览的长度
const PREVIEW_LEN: usize = 100;

/// 确认提示中示例的长度
const SAMPLE_LEN: usize = 50;

/// 事件匹配服务
pub struct Matcher {
    kind: String,
}

impl Matcher {
    pub fn new() -> Self {
        Self {
            kind: EVENT_TEXT_KIND.to_string(),
        }
    }

    /// 找出当前页面上所有匹配且可见的事件，按文档顺序返回
    ///
    /// 只读取一次页面快照；没有匹配时返回空列表
    pub async fn find_all(
        &self,
        dom: &dyn DomProvider,
        criteria: &MatchCriteria,
    ) -> AppResult<Vec<ItemRef>> {
        let elements = dom.snapshot(&self.kind).await?;
        let total = elements.len();
        let mut matches = Vec::new();

        for element in elements {
            let trimmed = element.text.trim();
            if trimmed.is_empty() || !criteria.is_match(&element.text) {
                continue;
            }

            if !element.extent.is_visible() {
                debug!("跳过不可见的匹配: {}", truncate_text(trimmed, PREVIEW_LEN));
                continue;
            }

            let preview = truncate_text(trimmed, PREVIEW_LEN);
            matches.push(element.item.with_preview(preview));
        }

        info!(
            "正则搜索完成 {}: {} 个候选，{} 个匹配",
            criteria,
            total,
            matches.len()
        );
        Ok(matches)
    }

    /// 取当前页面上前 `limit` 个匹配文字作为示例（不检查可见性）
    pub async fn sample(
        &self,
        dom: &dyn DomProvider,
        criteria: &MatchCriteria,
        limit: usize,
    ) -> AppResult<Vec<String>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        Ok(dom
            .snapshot(&self.kind)
            .await?
            .iter()
            .filter(|e| !e.text.trim().is_empty() && criteria.is_match(&e.text))
            .take(limit)
            .map(|e| e.text.trim().chars().take(SAMPLE_LEN).collect())
            .collect())
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}
