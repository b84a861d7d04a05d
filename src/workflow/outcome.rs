//! 单个步骤的执行结果

use crate::error::{AppError, WorkflowError};

/// 步骤结果
///
/// 编排器根据它决定下一个状态
#[derive(Debug)]
pub enum StepOutcome {
    /// 步骤完成
    Success,
    /// 失败，但流程可以继续
    Recoverable(WorkflowError),
    /// 无法继续
    Fatal(AppError),
}

impl StepOutcome {
    /// 把步骤中冒出的错误归类：连接断开为致命，其余可恢复
    pub fn from_error(err: AppError) -> Self {
        if err.is_fatal() {
            StepOutcome::Fatal(err)
        } else {
            StepOutcome::Recoverable(err.into_workflow_error())
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Success)
    }
}
