//! # Calendar Purge
//!
//! 按正则批量删除网页日历中的事件
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露 DOM 能力
//! - `DomProvider` - 查询 / 定位 / 点击 / 读取文字与尺寸
//! - `ChromeDom` - 基于 `JsExecutor` 的 CDP 实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `Awaiter` - 有限时长的元素轮询
//! - `Matcher` - 找出当前页匹配且可见的事件
//! - `ReportWriter` - 写运行报告
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 单个步骤
//! - `DeletionStep` - 点击 → 删除 → 重复事件对话框
//! - `PaginationStep` - 翻到下一页
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/workflow_orchestrator` - 扫描 / 删除 / 翻页状态机
//! - `orchestrator/app` - 浏览器资源、运行前确认、汇总输出

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::connect_to_browser_and_page;
pub use config::{Config, Timings, UiLabels};
pub use error::{AppError, AppResult};
pub use infrastructure::{ChromeDom, DomProvider, JsExecutor};
pub use models::{Descriptor, ElementSnapshot, Extent, ItemRef, MatchCriteria};
pub use orchestrator::{App, WorkflowOrchestrator};
pub use workflow::{RunOutcome, RunSummary, StepOutcome, WorkflowState};
