//! 运行前确认 - 业务能力层
//!
//! 删除不可撤销，开始前把正则和示例展示给用户并等待确认

use tokio::io::{stdin, AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::MatchCriteria;

/// 支持的日历站点
pub const SUPPORTED_HOST: &str = "calendar.google.com";

/// 构建确认提示
pub fn build_confirm_message(criteria: &MatchCriteria, samples: &[String], max_pages: usize) -> String {
    let mut message = format!(
        "确定要删除所有匹配以下正则的事件吗？\n\n正则: {}\n\n",
        criteria
    );

    if samples.is_empty() {
        message.push_str("（当前页没有匹配项，其他页可能存在）\n\n");
    } else {
        message.push_str("当前页的匹配示例:\n");
        for sample in samples {
            message.push_str(&format!("  - \"{}\"\n", sample));
        }
        message.push('\n');
    }

    message.push_str(&format!(
        "此操作无法撤销。程序将会:\n\
         1. 最多检查 {} 页日历\n\
         2. 删除每一个匹配的事件\n\
         3. 持续执行直到匹配事件全部删除\n",
        max_pages
    ));
    message
}

/// 页面地址是否属于支持的站点
pub fn is_supported_host(url: &str) -> bool {
    let rest = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let host = rest
        .split(|c| c == '/' || c == '?' || c == '#')
        .next()
        .unwrap_or("");
    let host = host.rsplit('@').next().unwrap_or(host);
    let host = host.split(':').next().unwrap_or(host);
    host.eq_ignore_ascii_case(SUPPORTED_HOST)
}

/// 解析用户输入
pub fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes" | "是"
    )
}

/// 终端确认
///
/// 整个运行前检查共用同一个输入缓冲，提前输入的回答不会丢失
pub struct Confirmer<R> {
    input: R,
    auto_confirm: bool,
}

impl Confirmer<BufReader<Stdin>> {
    /// 从标准输入读取回答
    pub fn stdin(auto_confirm: bool) -> Self {
        Self::with_input(BufReader::new(stdin()), auto_confirm)
    }
}

impl<R: AsyncBufRead + Unpin> Confirmer<R> {
    pub fn with_input(input: R, auto_confirm: bool) -> Self {
        Self {
            input,
            auto_confirm,
        }
    }

    /// 提问并等待回答
    ///
    /// `auto_confirm` 为真时直接通过
    pub async fn confirm(&mut self, message: &str) -> AppResult<bool> {
        if self.auto_confirm {
            info!("已开启自动确认，跳过提示");
            return Ok(true);
        }

        println!("{}", message);
        println!("输入 y 继续，其他任意输入取消:");

        let mut line = String::new();
        self.input
            .read_line(&mut line)
            .await
            .map_err(|e| AppError::Other(format!("读取输入失败: {}", e)))?;

        let accepted = is_affirmative(&line);
        if !accepted {
            warn!("用户取消了操作");
        }
        Ok(accepted)
    }
}
