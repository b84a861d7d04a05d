//! 页面元素相关的数据类型

use std::fmt;

/// 页面元素的句柄
///
/// 只在一次删除尝试内有效，不做持久化
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRef {
    handle: String,
    preview: String,
}

impl ItemRef {
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            preview: String::new(),
        }
    }

    /// 附带日志用的文字预览
    pub fn with_preview(mut self, preview: impl Into<String>) -> Self {
        self.preview = preview.into();
        self
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn preview(&self) -> &str {
        &self.preview
    }
}

/// 元素的渲染尺寸
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Deserialize)]
pub struct Extent {
    pub width: f64,
    pub height: f64,
}

impl Extent {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// 宽高都大于 0 才算可见
    pub fn is_visible(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// 快照中的一个元素，文字和尺寸在同一次读取中取得
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSnapshot {
    pub item: ItemRef,
    pub text: String,
    pub extent: Extent,
}

/// 用于在页面中定位元素的条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Descriptor {
    /// aria-label 等于任意一个标签的按钮
    ButtonWithLabel(Vec<String>),
    /// CSS 选择器
    Css(String),
    /// 命中 CSS 选择器且文字包含任意一个标签
    CssContainingText {
        selector: String,
        texts: Vec<String>,
    },
}

impl Descriptor {
    pub fn button(labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Descriptor::ButtonWithLabel(labels.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::ButtonWithLabel(labels) => {
                let parts: Vec<String> = labels
                    .iter()
                    .map(|l| format!("button[aria-label=\"{}\"]", l))
                    .collect();
                write!(f, "{}", parts.join(", "))
            }
            Descriptor::Css(selector) => write!(f, "{}", selector),
            Descriptor::CssContainingText { selector, texts } => {
                write!(f, "{} ~ {:?}", selector, texts)
            }
        }
    }
}
