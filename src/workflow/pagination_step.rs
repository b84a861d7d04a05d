//! 翻页步骤 - 流程层
//!
//! 只负责点击"下一页"并等待渲染，不检查新页面的内容

use tracing::{error, info, warn};

use crate::config::{Timings, UiLabels};
use crate::error::{AppError, WorkflowError};
use crate::infrastructure::DomProvider;
use crate::models::Descriptor;
use crate::services::Awaiter;
use crate::workflow::StepOutcome;

/// 翻页步骤
pub struct PaginationStep {
    awaiter: Awaiter,
    next_control: Descriptor,
    timings: Timings,
}

impl PaginationStep {
    pub fn new(labels: &UiLabels, timings: &Timings) -> Self {
        Self {
            awaiter: Awaiter::new(timings.poll_interval),
            next_control: Descriptor::button([labels.next_page.as_str()]),
            timings: timings.clone(),
        }
    }

    /// 翻到下一页
    pub async fn advance(&self, dom: &dyn DomProvider, current_page: usize) -> StepOutcome {
        info!("➡️ 正在翻页: {} → {}", current_page, current_page + 1);

        let next_button = match self
            .awaiter
            .wait_for(dom, &self.next_control, self.timings.navigation_timeout)
            .await
        {
            Ok(button) => button,
            Err(AppError::Workflow(WorkflowError::NotFound { .. })) => {
                warn!("⚠️ 第 {} 页找不到下一页按钮", current_page);
                return StepOutcome::Recoverable(WorkflowError::NavigationTimeout {
                    timeout_ms: self.timings.navigation_timeout.as_millis() as u64,
                });
            }
            Err(e) => {
                error!("翻页失败: {}", e);
                return StepOutcome::from_error(e);
            }
        };

        if let Err(e) = dom.activate(&next_button).await {
            error!("点击下一页按钮失败: {}", e);
            return StepOutcome::from_error(e);
        }

        info!("已点击下一页，等待页面加载");
        tokio::time::sleep(self.timings.navigation_settle).await;

        info!("✓ 翻页完成，当前第 {} 页", current_page + 1);
        StepOutcome::Success
    }
}
