//! 内存中的假日历页面，只用于测试

use std::sync::Mutex;

use async_trait::async_trait;

use crate::config::UiLabels;
use crate::error::{AppError, AppResult, BrowserError};
use crate::infrastructure::chrome_dom::{DIALOG_OK_SELECTOR, RECURRING_DIALOG_SELECTOR};
use crate::infrastructure::DomProvider;
use crate::models::{Descriptor, Extent, ItemRef};

const DELETE_BUTTON: &str = "delete-button";
const NEXT_BUTTON: &str = "next-button";
const DIALOG: &str = "dialog";
const DIALOG_OK: &str = "dialog-ok";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ItemKind {
    Event,
    Task,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Behavior {
    Normal,
    /// 点开后永远不出现删除按钮
    NoDeleteButton,
    /// 点开后不出现删除按钮，并且元素随即从视图中消失
    NoDeleteButtonThenGone,
    /// 删除按钮正常出现，但点击后什么也不发生
    IgnoresDelete,
}

#[derive(Debug, Clone)]
pub(crate) struct FakeItem {
    id: u64,
    text: String,
    kind: ItemKind,
    recurring: bool,
    visible: bool,
    behavior: Behavior,
}

impl FakeItem {
    pub(crate) fn event(text: &str) -> Self {
        Self {
            id: 0,
            text: text.to_string(),
            kind: ItemKind::Event,
            recurring: false,
            visible: true,
            behavior: Behavior::Normal,
        }
    }

    pub(crate) fn task(text: &str) -> Self {
        Self {
            kind: ItemKind::Task,
            ..Self::event(text)
        }
    }

    pub(crate) fn recurring(mut self) -> Self {
        self.recurring = true;
        self
    }

    pub(crate) fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub(crate) fn behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }
}

#[derive(Debug, Default)]
struct FakeState {
    pages: Vec<Vec<FakeItem>>,
    page: usize,
    popup: Option<u64>,
    dialog: Option<String>,
    next_button: bool,
    dialog_ok_missing: bool,
    query_failures: usize,
    disconnected: bool,
    locate_calls: usize,
    activations: Vec<String>,
    location: Option<String>,
}

pub(crate) struct FakeDom {
    labels: UiLabels,
    state: Mutex<FakeState>,
}

impl FakeDom {
    pub(crate) fn new(pages: Vec<Vec<FakeItem>>) -> Self {
        let mut next_id = 0;
        let pages = pages
            .into_iter()
            .map(|page| {
                page.into_iter()
                    .map(|mut item| {
                        next_id += 1;
                        item.id = next_id;
                        item
                    })
                    .collect()
            })
            .collect();

        Self {
            labels: UiLabels::default(),
            state: Mutex::new(FakeState {
                pages,
                next_button: true,
                ..FakeState::default()
            }),
        }
    }

    pub(crate) fn without_next_button(self) -> Self {
        self.lock().next_button = false;
        self
    }

    pub(crate) fn with_location(self, url: &str) -> Self {
        self.lock().location = Some(url.to_string());
        self
    }

    pub(crate) fn without_dialog_ok(self) -> Self {
        self.lock().dialog_ok_missing = true;
        self
    }

    /// 接下来的 `count` 次 query_all 会失败
    pub(crate) fn with_query_failures(self, count: usize) -> Self {
        self.lock().query_failures = count;
        self
    }

    pub(crate) fn disconnect(&self) {
        self.lock().disconnected = true;
    }

    /// 当前页（从 1 开始）
    pub(crate) fn current_page(&self) -> usize {
        self.lock().page + 1
    }

    /// 某一页剩余元素的文字
    pub(crate) fn remaining(&self, page: usize) -> Vec<String> {
        self.lock().pages[page - 1]
            .iter()
            .map(|item| item.text.clone())
            .collect()
    }

    pub(crate) fn locate_calls(&self) -> usize {
        self.lock().locate_calls
    }

    pub(crate) fn activations(&self) -> Vec<String> {
        self.lock().activations.clone()
    }

    pub(crate) fn dialog_open(&self) -> bool {
        self.lock().dialog.is_some()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    fn item_id(handle: &str) -> Option<u64> {
        handle.strip_prefix("item-")?.parse().ok()
    }

    fn delete_label(&self, kind: ItemKind) -> &str {
        match kind {
            ItemKind::Event => &self.labels.delete_event,
            ItemKind::Task => &self.labels.delete_task,
        }
    }

    fn recurring_label(&self, kind: ItemKind) -> &str {
        match kind {
            ItemKind::Event => &self.labels.recurring_event,
            ItemKind::Task => &self.labels.recurring_task,
        }
    }
}

impl FakeState {
    fn check(&self) -> AppResult<()> {
        if self.disconnected {
            Err(AppError::connection_lost("fake page closed"))
        } else {
            Ok(())
        }
    }

    fn find(&self, id: u64) -> Option<&FakeItem> {
        self.pages[self.page].iter().find(|item| item.id == id)
    }

    fn has_next(&self) -> bool {
        self.next_button && self.page + 1 < self.pages.len()
    }
}

#[async_trait]
impl DomProvider for FakeDom {
    async fn query_all(&self, _kind: &str) -> AppResult<Vec<ItemRef>> {
        let mut state = self.lock();
        state.check()?;
        if state.query_failures > 0 {
            state.query_failures -= 1;
            return Err(AppError::Browser(BrowserError::ScriptExecutionFailed {
                source: "fake query failure".into(),
            }));
        }
        Ok(state.pages[state.page]
            .iter()
            .map(|item| ItemRef::new(format!("item-{}", item.id)))
            .collect())
    }

    async fn locate(&self, descriptor: &Descriptor) -> AppResult<Option<ItemRef>> {
        let mut state = self.lock();
        state.check()?;
        state.locate_calls += 1;

        let found = match descriptor {
            Descriptor::ButtonWithLabel(labels) => {
                let wants = |label: &str| labels.iter().any(|l| l == label);
                let delete_ready = state
                    .popup
                    .and_then(|id| state.find(id))
                    .filter(|item| matches!(item.behavior, Behavior::Normal | Behavior::IgnoresDelete))
                    .map(|item| wants(self.delete_label(item.kind)))
                    .unwrap_or(false);

                if state.has_next() && wants(&self.labels.next_page) {
                    Some(NEXT_BUTTON)
                } else if delete_ready {
                    Some(DELETE_BUTTON)
                } else {
                    None
                }
            }
            Descriptor::Css(selector) => {
                (selector == DIALOG_OK_SELECTOR && state.dialog.is_some() && !state.dialog_ok_missing)
                    .then_some(DIALOG_OK)
            }
            Descriptor::CssContainingText { selector, texts } => {
                let open = state
                    .dialog
                    .as_deref()
                    .map(|text| texts.iter().any(|t| text.contains(t.as_str())))
                    .unwrap_or(false);
                (selector == RECURRING_DIALOG_SELECTOR && open).then_some(DIALOG)
            }
        };

        Ok(found.map(ItemRef::new))
    }

    async fn activate(&self, item: &ItemRef) -> AppResult<()> {
        let mut state = self.lock();
        state.check()?;
        state.activations.push(item.handle().to_string());

        let stale = || {
            AppError::Browser(BrowserError::StaleElement {
                handle: item.handle().to_string(),
            })
        };

        match item.handle() {
            DELETE_BUTTON => {
                let id = state.popup.take().ok_or_else(stale)?;
                let page = state.page;
                let position = state.pages[page]
                    .iter()
                    .position(|i| i.id == id)
                    .ok_or_else(stale)?;
                if state.pages[page][position].behavior == Behavior::IgnoresDelete {
                    return Ok(());
                }
                let removed = state.pages[page].remove(position);
                if removed.recurring {
                    state.dialog = Some(format!(
                        "{} ... {}",
                        self.recurring_label(removed.kind),
                        "This and following events"
                    ));
                }
            }
            DIALOG_OK => {
                state.dialog.take().ok_or_else(stale)?;
            }
            DIALOG => {}
            NEXT_BUTTON => {
                if !state.has_next() {
                    return Err(stale());
                }
                state.page += 1;
                state.popup = None;
            }
            handle => {
                let id = Self::item_id(handle).ok_or_else(stale)?;
                let page = state.page;
                let target = state.pages[page]
                    .iter_mut()
                    .find(|i| i.id == id)
                    .ok_or_else(stale)?;
                if target.behavior == Behavior::NoDeleteButtonThenGone {
                    target.visible = false;
                }
                state.popup = Some(id);
            }
        }
        Ok(())
    }

    async fn bounding_extent(&self, item: &ItemRef) -> AppResult<Extent> {
        let state = self.lock();
        state.check()?;
        let visible = Self::item_id(item.handle())
            .and_then(|id| state.find(id))
            .map(|i| i.visible)
            .unwrap_or(false);
        Ok(if visible {
            Extent::new(180.0, 20.0)
        } else {
            Extent::default()
        })
    }

    async fn text(&self, item: &ItemRef) -> AppResult<String> {
        let state = self.lock();
        state.check()?;
        Ok(Self::item_id(item.handle())
            .and_then(|id| state.find(id))
            .map(|i| i.text.clone())
            .unwrap_or_default())
    }

    async fn location(&self) -> AppResult<Option<String>> {
        let state = self.lock();
        Ok(Some(state.location.clone().unwrap_or_else(|| {
            "https://calendar.google.com/calendar/r/month".to_string()
        })))
    }
}
