//! 删除流程编排器 - 编排层
//!
//! ## 职责
//!
//! 驱动"扫描 → 删除 → 翻页"的状态机，维护计数和错误列表，决定何时结束。
//!
//! ## 状态转换
//!
//! ```text
//! Scanning ──有匹配──▶ Deleting ──成功 / 可恢复失败──▶ Scanning（同一页）
//!    │                    └──致命──▶ Aborted
//!    ├──无匹配且还有下一页──▶ Paginating ──成功──▶ Scanning（下一页）
//!    │                           └──失败──▶ Aborted
//!    └──无匹配且已是最后一页──▶ Done
//! ```
//!
//! 扫描出错或同一页连续失败达到上限时，按页面级错误处理：
//! 还有下一页就以更长的退避翻页，否则 Aborted。
//!
//! 报告成功的删除要等下一次扫描确认：同一个元素仍被匹配到，说明点击被页面
//! 忽略，撤销计数并按一次删除失败处理。
//!
//! 页码单调递增且不超过 `max_pages`，每一轮要么删掉一个事件、要么翻页、
//! 要么累加连续失败次数（有上限），所以流程一定会结束。

use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::{Config, Timings};
use crate::error::WorkflowError;
use crate::infrastructure::DomProvider;
use crate::models::{ItemRef, MatchCriteria};
use crate::services::Matcher;
use crate::workflow::{
    DeletionStep, PaginationStep, RunOutcome, RunSummary, StepOutcome, WorkflowState,
};

/// 状态机的状态
#[derive(Debug)]
enum Phase {
    Scanning,
    Deleting(ItemRef),
    /// `backoff`：翻页成功后额外等待的时间（页面级错误恢复时使用）
    Paginating { backoff: Option<Duration> },
    Finished(RunOutcome),
}

/// 删除流程编排器
///
/// 不持有页面资源，每次运行由调用方传入 DOM
pub struct WorkflowOrchestrator {
    criteria: MatchCriteria,
    matcher: Matcher,
    deletion: DeletionStep,
    pagination: PaginationStep,
    timings: Timings,
    max_pages: usize,
    max_consecutive_failures: usize,
}

impl WorkflowOrchestrator {
    pub fn new(config: &Config, criteria: MatchCriteria) -> Self {
        Self {
            criteria,
            matcher: Matcher::new(),
            deletion: DeletionStep::new(&config.labels, &config.timings),
            pagination: PaginationStep::new(&config.labels, &config.timings),
            timings: config.timings.clone(),
            max_pages: config.max_pages,
            max_consecutive_failures: config.max_consecutive_failures.max(1),
        }
    }

    /// 执行一次完整的删除流程
    ///
    /// 所有错误都记录在汇总里，不会返回 `Err`
    pub async fn run(&self, dom: &dyn DomProvider) -> RunSummary {
        let mut state = WorkflowState::new(self.max_pages);
        info!(
            "开始删除流程: 正则 {}，最多 {} 页，开始时间 {}",
            self.criteria,
            state.max_pages(),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );

        let mut phase = Phase::Scanning;
        loop {
            phase = match phase {
                Phase::Scanning => self.scan(dom, &mut state).await,
                Phase::Deleting(item) => self.delete(dom, &mut state, item).await,
                Phase::Paginating { backoff } => self.paginate(dom, &mut state, backoff).await,
                Phase::Finished(outcome) => {
                    let summary = state.into_summary(outcome);
                    match &summary.outcome {
                        RunOutcome::Done => info!(
                            "✅ 全部页面处理完成: 删除 {}，错误 {}",
                            summary.total_deleted, summary.total_errors
                        ),
                        RunOutcome::Aborted { reason } => error!(
                            "❌ 流程中止 ({}): 删除 {}，错误 {}",
                            reason, summary.total_deleted, summary.total_errors
                        ),
                    }
                    return summary;
                }
            };
        }
    }

    async fn scan(&self, dom: &dyn DomProvider, state: &mut WorkflowState) -> Phase {
        info!("📄 处理第 {}/{} 页", state.current_page(), state.max_pages());

        let matches = match self.matcher.find_all(dom, &self.criteria).await {
            Ok(matches) => matches,
            Err(e) if e.is_fatal() => {
                state.record_error(e.to_string());
                return Phase::Finished(RunOutcome::Aborted {
                    reason: e.to_string(),
                });
            }
            Err(e) => return self.page_failure(state, format!("扫描页面失败: {}", e)),
        };

        if let Some(handle) = state.verify_last_deletion(&matches) {
            warn!("⚠️ 删除未生效，事件仍在页面上 (元素 {})", handle);
            let err = WorkflowError::Unexpected {
                reason: format!("删除未生效，元素 {} 仍在页面上", handle),
            };
            return self.deletion_failed(state, err).await;
        }

        if let Some(first) = matches.into_iter().next() {
            return Phase::Deleting(first);
        }

        info!("第 {} 页没有匹配的事件", state.current_page());
        if state.has_next_page() {
            Phase::Paginating { backoff: None }
        } else {
            info!("已到达最大页数 {}", state.max_pages());
            Phase::Finished(RunOutcome::Done)
        }
    }

    async fn delete(&self, dom: &dyn DomProvider, state: &mut WorkflowState, item: ItemRef) -> Phase {
        match self.deletion.run(dom, &item).await {
            StepOutcome::Success => {
                state.record_deletion(&item);
                info!(
                    "✓ 删除成功 (第 {} 页，累计 {})",
                    state.current_page(),
                    state.total_deleted()
                );
                sleep(self.timings.inter_delete_delay).await;
                Phase::Scanning
            }
            StepOutcome::Recoverable(err) => self.deletion_failed(state, err).await,
            StepOutcome::Fatal(e) => {
                state.record_error(e.to_string());
                Phase::Finished(RunOutcome::Aborted {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// 删除失败：记录，连续失败达到上限时放弃当前页，否则退避后重新扫描
    async fn deletion_failed(&self, state: &mut WorkflowState, err: WorkflowError) -> Phase {
        state.record_failed_deletion(err.to_string());
        error!(
            "删除失败，继续 (第 {} 页，累计错误 {}): {}",
            state.current_page(),
            state.errors().len(),
            err
        );

        if state.consecutive_failures() >= self.max_consecutive_failures {
            warn!(
                "⚠️ 第 {} 页连续 {} 次删除失败，放弃该页",
                state.current_page(),
                state.consecutive_failures()
            );
            return self.abandon_page(
                state,
                format!("连续 {} 次删除失败", state.consecutive_failures()),
            );
        }

        sleep(self.timings.error_backoff).await;
        Phase::Scanning
    }

    async fn paginate(
        &self,
        dom: &dyn DomProvider,
        state: &mut WorkflowState,
        backoff: Option<Duration>,
    ) -> Phase {
        match self.pagination.advance(dom, state.current_page()).await {
            StepOutcome::Success => {
                state.advance_page();
                if let Some(backoff) = backoff {
                    sleep(backoff).await;
                }
                Phase::Scanning
            }
            StepOutcome::Recoverable(err) => {
                state.record_error(err.to_string());
                error!("第 {} 页翻页失败，结束流程", state.current_page());
                Phase::Finished(RunOutcome::Aborted {
                    reason: format!("第 {} 页翻页失败: {}", state.current_page(), err),
                })
            }
            StepOutcome::Fatal(e) => {
                state.record_error(e.to_string());
                Phase::Finished(RunOutcome::Aborted {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// 页面级错误：记录后放弃当前页
    fn page_failure(&self, state: &mut WorkflowState, message: String) -> Phase {
        error!("第 {} 页处理出错: {}", state.current_page(), message);
        state.record_error(message.clone());
        self.abandon_page(state, message)
    }

    /// 还有下一页时以更长的退避翻页，否则中止
    fn abandon_page(&self, state: &WorkflowState, reason: String) -> Phase {
        if state.has_next_page() {
            warn!("尝试跳到下一页继续");
            Phase::Paginating {
                backoff: Some(self.timings.page_error_backoff),
            }
        } else {
            error!("最后一页出错，结束流程");
            Phase::Finished(RunOutcome::Aborted { reason })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::fake_dom::{Behavior, FakeDom, FakeItem};
    use tokio::time::Instant;

    fn config(max_pages: usize) -> Config {
        Config {
            max_pages,
            match_pattern: "standup|sync".to_string(),
            ..Config::default()
        }
    }

    fn orchestrator(max_pages: usize) -> WorkflowOrchestrator {
        let config = config(max_pages);
        let criteria = MatchCriteria::compile(&config.match_pattern, &config.match_flags).unwrap();
        WorkflowOrchestrator::new(&config, criteria)
    }

    #[tokio::test(start_paused = true)]
    async fn test_deletes_all_matches_on_single_page() {
        let dom = FakeDom::new(vec![vec![
            FakeItem::event("Daily Standup"),
            FakeItem::event("Lunch"),
            FakeItem::task("Sync prep"),
            FakeItem::event("Standup retro").recurring(),
        ]]);

        let summary = orchestrator(1).run(&dom).await;

        assert!(summary.is_done());
        assert_eq!(summary.total_deleted, 3);
        assert_eq!(summary.total_errors, 0);
        assert_eq!(dom.remaining(1), vec!["Lunch"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_paginates_to_find_matches() {
        let dom = FakeDom::new(vec![
            vec![FakeItem::event("Lunch")],
            vec![FakeItem::event("Standup")],
        ]);

        let summary = orchestrator(2).run(&dom).await;

        assert!(summary.is_done());
        assert_eq!(summary.total_deleted, 1);
        assert_eq!(summary.pages_visited, 2);
        assert_eq!(dom.current_page(), 2);
        assert!(dom.remaining(2).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_button_timeout_counts_error() {
        let dom = FakeDom::new(vec![vec![
            FakeItem::event("Standup").behavior(Behavior::NoDeleteButtonThenGone)
        ]]);

        let summary = orchestrator(1).run(&dom).await;

        assert!(summary.is_done());
        assert_eq!(summary.total_deleted, 0);
        assert_eq!(summary.total_errors, 1);
        assert_eq!(summary.errors[0].page, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigation_failure_aborts() {
        let dom = FakeDom::new(vec![
            vec![FakeItem::event("Standup"), FakeItem::event("Sync")],
            vec![FakeItem::event("Standup")],
            vec![],
        ])
        .without_next_button();

        let summary = orchestrator(3).run(&dom).await;

        assert!(matches!(summary.outcome, RunOutcome::Aborted { .. }));
        assert_eq!(summary.total_deleted, 2);
        assert_eq!(summary.total_errors, 1);
        assert_eq!(summary.pages_visited, 1);
        assert_eq!(dom.remaining(2), vec!["Standup"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_exceeds_max_pages() {
        let dom = FakeDom::new(vec![
            vec![],
            vec![FakeItem::event("Standup")],
            vec![],
            vec![FakeItem::event("Standup")],
            vec![FakeItem::event("Standup")],
        ]);

        let summary = orchestrator(3).run(&dom).await;

        assert!(summary.is_done());
        assert_eq!(summary.pages_visited, 3);
        assert_eq!(dom.current_page(), 3);
        assert_eq!(summary.total_deleted, 1);
        assert_eq!(dom.remaining(4), vec!["Standup"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dialog_failure_still_counts_deletion() {
        let dom = FakeDom::new(vec![vec![FakeItem::event("Standup").recurring()]])
            .without_dialog_ok();

        let summary = orchestrator(1).run(&dom).await;

        assert!(summary.is_done());
        assert_eq!(summary.total_deleted, 1);
        assert_eq!(summary.total_errors, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_failures_on_last_page_abort() {
        let dom = FakeDom::new(vec![vec![
            FakeItem::event("Standup").behavior(Behavior::NoDeleteButton)
        ]]);

        let summary = orchestrator(1).run(&dom).await;

        assert!(matches!(summary.outcome, RunOutcome::Aborted { .. }));
        assert_eq!(summary.total_errors, 5);
        assert_eq!(summary.total_deleted, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_failures_move_to_next_page() {
        let dom = FakeDom::new(vec![
            vec![FakeItem::event("Standup").behavior(Behavior::NoDeleteButton)],
            vec![FakeItem::event("Sync")],
        ]);

        let summary = orchestrator(2).run(&dom).await;

        assert!(summary.is_done());
        assert_eq!(summary.total_deleted, 1);
        assert_eq!(summary.total_errors, 5);
        assert_eq!(dom.remaining(1), vec!["Standup"]);
        assert!(dom.remaining(2).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_error_skips_to_next_page_with_backoff() {
        let dom = FakeDom::new(vec![
            vec![FakeItem::event("Standup")],
            vec![FakeItem::event("Sync")],
        ])
        .with_query_failures(1);
        let start = Instant::now();

        let summary = orchestrator(2).run(&dom).await;

        assert!(summary.is_done());
        assert_eq!(summary.total_errors, 1);
        assert_eq!(summary.total_deleted, 1);
        assert_eq!(dom.remaining(1), vec!["Standup"]);
        // 翻页等待 2000ms + 页面级退避 3000ms
        assert!(start.elapsed() >= Duration::from_millis(5000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_error_on_last_page_aborts() {
        let dom = FakeDom::new(vec![vec![FakeItem::event("Standup")]]).with_query_failures(1);

        let summary = orchestrator(1).run(&dom).await;

        assert!(matches!(summary.outcome, RunOutcome::Aborted { .. }));
        assert_eq!(summary.total_errors, 1);
        assert!(!summary.to_string().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_aborts_immediately() {
        let dom = FakeDom::new(vec![vec![FakeItem::event("Standup")], vec![]]);
        dom.disconnect();

        let summary = orchestrator(2).run(&dom).await;

        assert!(matches!(summary.outcome, RunOutcome::Aborted { .. }));
        assert_eq!(summary.pages_visited, 1);
        assert_eq!(summary.total_errors, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_between_deletions() {
        let dom = FakeDom::new(vec![vec![FakeItem::event("Standup"), FakeItem::event("Sync")]]);
        let start = Instant::now();

        let summary = orchestrator(1).run(&dom).await;

        assert_eq!(summary.total_deleted, 2);
        // 每次删除：对话框等待 500ms + 删除间隔 800ms
        assert!(start.elapsed() >= Duration::from_millis(2600));
        assert!(start.elapsed() < Duration::from_millis(2700));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backs_off_after_failed_deletion() {
        let dom = FakeDom::new(vec![vec![
            FakeItem::event("Standup").behavior(Behavior::NoDeleteButtonThenGone)
        ]]);
        let start = Instant::now();

        let summary = orchestrator(1).run(&dom).await;

        assert_eq!(summary.total_errors, 1);
        // 删除按钮超时 3000ms + 错误退避 1500ms
        assert!(start.elapsed() >= Duration::from_millis(4500));
        assert!(start.elapsed() < Duration::from_millis(4600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ignored_delete_click_stops_at_failure_cap() {
        let dom = FakeDom::new(vec![vec![
            FakeItem::event("Standup").behavior(Behavior::IgnoresDelete)
        ]]);

        let summary = tokio::time::timeout(Duration::from_secs(3600), orchestrator(1).run(&dom))
            .await
            .expect("run should finish");

        assert!(matches!(summary.outcome, RunOutcome::Aborted { .. }));
        assert_eq!(summary.total_deleted, 0);
        assert_eq!(summary.total_errors, 5);
        assert_eq!(dom.remaining(1), vec!["Standup"]);
        let clicks = dom
            .activations()
            .iter()
            .filter(|h| h.as_str() == "delete-button")
            .count();
        assert_eq!(clicks, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ignored_delete_moves_on_and_keeps_real_deletions() {
        let dom = FakeDom::new(vec![
            vec![
                FakeItem::event("Standup"),
                FakeItem::event("Sync").behavior(Behavior::IgnoresDelete),
            ],
            vec![FakeItem::event("Standup")],
        ]);

        let summary = orchestrator(2).run(&dom).await;

        assert!(summary.is_done());
        assert_eq!(summary.total_deleted, 2);
        assert_eq!(summary.total_errors, 5);
        assert_eq!(dom.remaining(1), vec!["Sync"]);
        assert!(dom.remaining(2).is_empty());
    }
}
