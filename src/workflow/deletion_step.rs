//! 单个事件的删除流程 - 流程层
//!
//! 流程顺序：
//! 1. 点击事件
//! 2. 等待删除按钮（事件 / 任务两种）
//! 3. 点击删除
//! 4. 固定等待后检查重复事件对话框，有则确认
//!
//! 第 4 步的任何失败都只记日志：此时删除已经发生

use tracing::{error, info, warn};

use crate::config::{Timings, UiLabels};
use crate::error::{AppError, AppResult, WorkflowError};
use crate::infrastructure::chrome_dom::{DIALOG_OK_SELECTOR, RECURRING_DIALOG_SELECTOR};
use crate::infrastructure::DomProvider;
use crate::models::{Descriptor, ItemRef};
use crate::services::Awaiter;
use crate::workflow::StepOutcome;

/// 单个事件的删除步骤
pub struct DeletionStep {
    awaiter: Awaiter,
    delete_control: Descriptor,
    recurring_dialog: Descriptor,
    dialog_confirm: Descriptor,
    timings: Timings,
}

impl DeletionStep {
    pub fn new(labels: &UiLabels, timings: &Timings) -> Self {
        Self {
            awaiter: Awaiter::new(timings.poll_interval),
            delete_control: Descriptor::button(labels.delete_controls()),
            recurring_dialog: Descriptor::CssContainingText {
                selector: RECURRING_DIALOG_SELECTOR.to_string(),
                texts: labels.recurring_dialogs(),
            },
            dialog_confirm: Descriptor::Css(DIALOG_OK_SELECTOR.to_string()),
            timings: timings.clone(),
        }
    }

    /// 删除一个事件
    pub async fn run(&self, dom: &dyn DomProvider, item: &ItemRef) -> StepOutcome {
        info!("🗑️ 尝试删除事件: {}", item.preview());

        // 1. 点击事件
        if let Err(e) = dom.activate(item).await {
            error!("点击事件失败: {}", e);
            return StepOutcome::from_error(e);
        }

        // 2. 等待删除按钮
        let delete_button = match self
            .awaiter
            .wait_for(dom, &self.delete_control, self.timings.action_control_timeout)
            .await
        {
            Ok(button) => button,
            Err(AppError::Workflow(WorkflowError::NotFound { .. })) => {
                warn!("⚠️ 删除按钮未出现: {}", item.preview());
                return StepOutcome::Recoverable(WorkflowError::ActionControlTimeout {
                    timeout_ms: self.timings.action_control_timeout.as_millis() as u64,
                });
            }
            Err(e) => return StepOutcome::from_error(e),
        };

        // 3. 点击删除
        if let Err(e) = dom.activate(&delete_button).await {
            error!("点击删除按钮失败: {}", e);
            return StepOutcome::from_error(e);
        }
        info!("已点击删除，检查重复事件对话框");

        // 4. 重复事件对话框（尽力而为）
        tokio::time::sleep(self.timings.dialog_settle).await;
        match self.confirm_recurring_dialog(dom).await {
            Ok(true) => info!("✅ 重复事件已删除: {}", item.preview()),
            Ok(false) => info!("✅ 事件已删除: {}", item.preview()),
            Err(e) => {
                let failure = WorkflowError::DialogHandlingFailure {
                    reason: e.to_string(),
                };
                error!("处理删除对话框出错（已忽略）: {}", failure);
            }
        }

        StepOutcome::Success
    }

    /// 有对话框时确认并返回 `true`，没有返回 `false`
    async fn confirm_recurring_dialog(&self, dom: &dyn DomProvider) -> AppResult<bool> {
        if dom.locate(&self.recurring_dialog).await?.is_none() {
            return Ok(false);
        }

        info!("检测到重复事件对话框");
        let ok_button = self
            .awaiter
            .wait_for(dom, &self.dialog_confirm, self.timings.dialog_confirm_timeout)
            .await?;
        dom.activate(&ok_button).await?;
        Ok(true)
    }
}
