//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：编译正则、写日志文件头、连接（或启动）浏览器、创建 ChromeDom
//! 2. **运行前检查**：站点检查、展示示例并等待确认
//! 3. **执行删除**：委托 `WorkflowOrchestrator`
//! 4. **输出汇总**：写入运行报告并打印统计
//!
//! 本模块是唯一持有 Browser 的地方

use anyhow::Result;
use chromiumoxide::Browser;
use tokio::io::AsyncBufRead;
use tracing::{info, warn};

use crate::browser;
use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{ChromeDom, DomProvider, JsExecutor};
use crate::models::MatchCriteria;
use crate::orchestrator::WorkflowOrchestrator;
use crate::services::confirmation::{build_confirm_message, is_supported_host, Confirmer};
use crate::services::{Matcher, ReportWriter};
use crate::utils::logging::{init_log_file, log_startup, print_final_summary};
use crate::workflow::RunSummary;

/// 确认提示中展示的示例数量
const SAMPLE_LIMIT: usize = 5;

/// 应用主结构
pub struct App {
    config: Config,
    criteria: MatchCriteria,
    _browser: Browser,
    dom: ChromeDom,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 正则有误时在接触浏览器之前失败
        let criteria = config.criteria()?;
        info!("✓ 正则编译成功: {}", criteria);

        // 初始化日志文件
        init_log_file(&config.output_log_file)?;

        log_startup(&config);

        let (browser, page) = if config.headless {
            browser::launch_headless_browser(
                &config.target_url,
                config.chrome_executable.as_deref(),
            )
            .await?
        } else {
            browser::connect_to_browser_and_page(
                config.browser_debug_port,
                Some(&config.target_url),
                Some(&config.target_title),
            )
            .await?
        };

        // 创建 ChromeDom（持有 page）
        let dom = ChromeDom::new(JsExecutor::new(page));

        Ok(Self {
            config,
            criteria,
            _browser: browser,
            dom,
        })
    }

    /// 运行应用主逻辑
    ///
    /// 用户取消时返回 `None`
    pub async fn run(&self) -> Result<Option<RunSummary>> {
        if !preflight(&self.dom, &self.config, &self.criteria).await? {
            info!("操作已在输入阶段取消");
            return Ok(None);
        }

        let summary = WorkflowOrchestrator::new(&self.config, self.criteria.clone())
            .run(&self.dom)
            .await;

        ReportWriter::with_path(&self.config.output_log_file).write(&summary)?;
        print_final_summary(&summary, &self.config.output_log_file);

        Ok(Some(summary))
    }
}

/// 运行前检查：站点 + 示例确认，回答从标准输入读取
///
/// 返回 `false` 表示用户取消
pub async fn preflight(
    dom: &dyn DomProvider,
    config: &Config,
    criteria: &MatchCriteria,
) -> AppResult<bool> {
    let mut confirmer = Confirmer::stdin(config.auto_confirm);
    preflight_with(dom, config, criteria, &mut confirmer).await
}

/// 使用给定的确认来源执行运行前检查
pub async fn preflight_with<R: AsyncBufRead + Unpin>(
    dom: &dyn DomProvider,
    config: &Config,
    criteria: &MatchCriteria,
    confirmer: &mut Confirmer<R>,
) -> AppResult<bool> {
    let location = dom.location().await?.unwrap_or_default();
    if !is_supported_host(&location) {
        let warning = format!("当前页面 ({}) 可能不是 Google 日历，脚本可能无法正常工作", location);
        warn!("⚠️ {}", warning);
        if !confirmer.confirm(&format!("{}\n\n仍然继续吗？", warning)).await? {
            info!("用户选择不在非日历页面上继续");
            return Ok(false);
        }
    }

    let samples = Matcher::new().sample(dom, criteria, SAMPLE_LIMIT).await?;
    info!("当前页找到 {} 个匹配示例", samples.len());

    let message = build_confirm_message(criteria, &samples, config.max_pages);
    if !confirmer.confirm(&message).await? {
        info!("用户拒绝了确认");
        return Ok(false);
    }

    info!("✓ 用户已确认: {}", criteria);
    Ok(true)
}
