//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 管理浏览器资源（Browser、ChromeDom）
//! - 运行前检查与确认
//! - 输出运行报告
//!
//! ### `workflow_orchestrator` - 删除流程状态机
//! - 扫描 / 删除 / 翻页的状态转换
//! - 计数与错误记录
//! - 决定何时结束
//!
//! ## 层次关系
//!
//! ```text
//! app
//!     ↓
//! workflow_orchestrator (状态机)
//!     ↓
//! workflow::{DeletionStep, PaginationStep} (单个步骤)
//!     ↓
//! services (能力层：awaiter / matcher / report)
//!     ↓
//! infrastructure (基础设施：DomProvider / JsExecutor)
//! ```

pub mod app;
pub mod workflow_orchestrator;

// 重新导出主要类型
pub use app::{preflight, preflight_with, App};
pub use workflow_orchestrator::WorkflowOrchestrator;
