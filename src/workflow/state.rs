//! 一次运行的状态与最终汇总

use std::fmt;

use chrono::{DateTime, Local};

use crate::models::ItemRef;

/// 一条错误记录
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    /// 出错时所在的页（从 1 开始）
    pub page: usize,
    pub message: String,
    pub timestamp: DateTime<Local>,
}

/// 运行状态
///
/// 只由编排器在两个步骤之间修改
#[derive(Debug, Clone)]
pub struct WorkflowState {
    current_page: usize,
    max_pages: usize,
    total_deleted: usize,
    errors: Vec<ErrorRecord>,
    /// 当前页连续删除失败次数
    consecutive_failures: usize,
    /// 上一次报告成功、还没被下一次扫描确认的删除
    unverified_deletion: Option<String>,
}

impl WorkflowState {
    /// `max_pages` 至少为 1
    pub fn new(max_pages: usize) -> Self {
        Self {
            current_page: 1,
            max_pages: max_pages.max(1),
            total_deleted: 0,
            errors: Vec::new(),
            consecutive_failures: 0,
            unverified_deletion: None,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    pub fn total_deleted(&self) -> usize {
        self.total_deleted
    }

    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    pub fn consecutive_failures(&self) -> usize {
        self.consecutive_failures
    }

    /// 是否还有下一页可翻
    pub fn has_next_page(&self) -> bool {
        self.current_page < self.max_pages
    }

    /// 记录一次成功删除，等下一次扫描确认
    pub fn record_deletion(&mut self, item: &ItemRef) {
        self.total_deleted += 1;
        self.unverified_deletion = Some(item.handle().to_string());
    }

    /// 用新的扫描结果确认上一次删除
    ///
    /// 事件仍在结果里说明点击被页面忽略：撤销那次计数并返回它的句柄。
    /// 确认生效时才清零连续失败次数。
    pub fn verify_last_deletion(&mut self, matches: &[ItemRef]) -> Option<String> {
        let handle = self.unverified_deletion.take()?;
        if matches.iter().any(|m| m.handle() == handle) {
            self.total_deleted = self.total_deleted.saturating_sub(1);
            Some(handle)
        } else {
            self.consecutive_failures = 0;
            None
        }
    }

    /// 记录一次删除失败（同时计入错误列表）
    pub fn record_failed_deletion(&mut self, message: impl Into<String>) {
        self.consecutive_failures += 1;
        self.record_error(message);
    }

    /// 记录一条错误
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.errors.push(ErrorRecord {
            page: self.current_page,
            message: message.into(),
            timestamp: Local::now(),
        });
    }

    /// 翻到下一页；已是最后一页时不变
    pub fn advance_page(&mut self) -> bool {
        if !self.has_next_page() {
            return false;
        }
        self.current_page += 1;
        self.consecutive_failures = 0;
        self.unverified_deletion = None;
        true
    }

    /// 生成最终汇总
    pub fn into_summary(self, outcome: RunOutcome) -> RunSummary {
        RunSummary {
            outcome,
            total_deleted: self.total_deleted,
            total_errors: self.errors.len(),
            pages_visited: self.current_page,
            max_pages: self.max_pages,
            errors: self.errors,
        }
    }
}

/// 运行的终止方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// 所有页处理完毕
    Done,
    /// 中途停止
    Aborted { reason: String },
}

/// 运行汇总
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub total_deleted: usize,
    pub total_errors: usize,
    pub pages_visited: usize,
    pub max_pages: usize,
    pub errors: Vec<ErrorRecord>,
}

impl RunSummary {
    pub fn is_done(&self) -> bool {
        self.outcome == RunOutcome::Done
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            RunOutcome::Done => write!(
                f,
                "删除完成！已处理 {}/{} 页\n共删除事件: {}",
                self.pages_visited, self.max_pages, self.total_deleted
            )?,
            RunOutcome::Aborted { reason } => write!(
                f,
                "流程在第 {} 页停止: {}\n共删除事件: {}",
                self.pages_visited, reason, self.total_deleted
            )?,
        }
        if self.total_errors > 0 {
            write!(f, "\n遇到错误: {} (详见日志)", self.total_errors)?;
        }
        Ok(())
    }
}
