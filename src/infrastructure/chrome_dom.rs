//! 基于 CDP 的 DOM 实现
//!
//! 所有操作都通过 [`JsExecutor`] 执行脚本完成。元素在第一次被读取时打上
//! `data-purge-id` 属性，之后用这个属性找回元素，`ItemRef` 里只保存编号。

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{AppError, AppResult, BrowserError};
use crate::infrastructure::{DomProvider, JsExecutor};
use crate::models::{Descriptor, ElementSnapshot, Extent, ItemRef};

/// 重复事件对话框
pub const RECURRING_DIALOG_SELECTOR: &str = r#"span.uW2Fw-k2Wrsb-fmcmS[jsname="MdSI6d"]"#;

/// 重复事件对话框的确认按钮
pub const DIALOG_OK_SELECTOR: &str = r#"[data-mdc-dialog-action="ok"]"#;

const TAG_HELPER: &str = r#"
    const __tag = (el) => {
        if (!el.dataset.purgeId) {
            window.__purgeSeq = (window.__purgeSeq || 0) + 1;
            el.dataset.purgeId = String(window.__purgeSeq);
        }
        return el.dataset.purgeId;
    };
    const __byId = (id) => document.querySelector('[data-purge-id=' + JSON.stringify(id) + ']');
"#;

/// 快照脚本返回的一行
#[derive(Debug, Deserialize)]
struct RawElement {
    handle: String,
    text: String,
    width: f64,
    height: f64,
}

/// Chrome 页面上的 DOM
pub struct ChromeDom {
    executor: JsExecutor,
}

impl ChromeDom {
    pub fn new(executor: JsExecutor) -> Self {
        Self { executor }
    }

    /// 把定位条件翻译成返回元素（或 null）的 JS 表达式
    fn find_expression(descriptor: &Descriptor) -> AppResult<String> {
        let expr = match descriptor {
            Descriptor::ButtonWithLabel(labels) => format!(
                "Array.from(document.querySelectorAll('button[aria-label]')).find(b => {}.includes(b.getAttribute('aria-label')))",
                serde_json::to_string(labels)?
            ),
            Descriptor::Css(selector) => {
                format!("document.querySelector({})", serde_json::to_string(selector)?)
            }
            Descriptor::CssContainingText { selector, texts } => format!(
                "(() => {{ const el = document.querySelector({}); return el && {}.some(t => (el.textContent || '').includes(t)) ? el : null; }})()",
                serde_json::to_string(selector)?,
                serde_json::to_string(texts)?
            ),
        };
        Ok(expr)
    }

    /// 一次遍历读出所有元素的编号、文字和尺寸
    fn snapshot_script(kind: &str) -> AppResult<String> {
        let body = format!(
            "return Array.from(document.querySelectorAll({})).map(el => {{ \
                 const r = el.getBoundingClientRect(); \
                 return {{ handle: __tag(el), text: el.textContent || '', width: r.width, height: r.height }}; \
             }});",
            serde_json::to_string(kind)?
        );
        Ok(Self::script(&body))
    }

    fn script(body: &str) -> String {
        format!("(() => {{ {} {} }})()", TAG_HELPER, body)
    }
}

#[async_trait]
impl DomProvider for ChromeDom {
    async fn query_all(&self, kind: &str) -> AppResult<Vec<ItemRef>> {
        let body = format!(
            "return Array.from(document.querySelectorAll({})).map(__tag);",
            serde_json::to_string(kind)?
        );
        let handles: Vec<String> = self.executor.eval_as(Self::script(&body)).await?;
        debug!("查询 {} 得到 {} 个元素", kind, handles.len());
        Ok(handles.into_iter().map(ItemRef::new).collect())
    }

    async fn locate(&self, descriptor: &Descriptor) -> AppResult<Option<ItemRef>> {
        let body = format!(
            "const el = {}; return el ? __tag(el) : null;",
            Self::find_expression(descriptor)?
        );
        let handle: Option<String> = self.executor.eval_as(Self::script(&body)).await?;
        Ok(handle.map(ItemRef::new))
    }

    async fn activate(&self, item: &ItemRef) -> AppResult<()> {
        let body = format!(
            "const el = __byId({}); if (!el) return false; el.click(); return true;",
            serde_json::to_string(item.handle())?
        );
        let clicked: bool = self.executor.eval_as(Self::script(&body)).await?;
        if clicked {
            Ok(())
        } else {
            Err(AppError::Browser(BrowserError::StaleElement {
                handle: item.handle().to_string(),
            }))
        }
    }

    async fn bounding_extent(&self, item: &ItemRef) -> AppResult<Extent> {
        let body = format!(
            "const el = __byId({}); if (!el) return {{ width: 0, height: 0 }}; \
             const r = el.getBoundingClientRect(); return {{ width: r.width, height: r.height }};",
            serde_json::to_string(item.handle())?
        );
        self.executor.eval_as(Self::script(&body)).await
    }

    async fn text(&self, item: &ItemRef) -> AppResult<String> {
        let body = format!(
            "const el = __byId({}); return el ? (el.textContent || '') : '';",
            serde_json::to_string(item.handle())?
        );
        self.executor.eval_as(Self::script(&body)).await
    }

    async fn snapshot(&self, kind: &str) -> AppResult<Vec<ElementSnapshot>> {
        let rows: Vec<RawElement> = self.executor.eval_as(Self::snapshot_script(kind)?).await?;
        debug!("快照 {} 得到 {} 个元素", kind, rows.len());
        Ok(rows
            .into_iter()
            .map(|row| ElementSnapshot {
                item: ItemRef::new(row.handle),
                text: row.text,
                extent: Extent::new(row.width, row.height),
            })
            .collect())
    }

    async fn location(&self) -> AppResult<Option<String>> {
        self.executor.current_url().await
    }
}
