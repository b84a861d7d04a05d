//! 运行报告写入服务 - 业务能力层
//!
//! 只负责把汇总和错误记录追加到日志文件

use std::fs::OpenOptions;
use std::io::Write;

use tracing::{debug, info};

use crate::error::{AppResult, FileError};
use crate::workflow::RunSummary;

/// 运行报告写入服务
pub struct ReportWriter {
    report_file_path: String,
}

impl ReportWriter {
    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            report_file_path: path.into(),
        }
    }

    /// 追加一次运行的汇总
    pub fn write(&self, summary: &RunSummary) -> AppResult<()> {
        debug!(
            "写入运行报告: 删除 {} | 错误 {}",
            summary.total_deleted, summary.total_errors
        );

        let report = render_report(summary);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.report_file_path)
            .map_err(|source| self.write_failed(source))?;
        file.write_all(report.as_bytes())
            .map_err(|source| self.write_failed(source))?;

        info!("运行报告已写入: {}", self.report_file_path);
        Ok(())
    }

    fn write_failed(&self, source: std::io::Error) -> FileError {
        FileError::WriteFailed {
            path: self.report_file_path.clone(),
            source,
        }
    }
}

fn render_report(summary: &RunSummary) -> String {
    let mut report = format!("{}\n{}\n", "-".repeat(60), summary);
    for record in &summary.errors {
        report.push_str(&format!(
            "[{}] 第 {} 页 | {}\n",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.page,
            record.message
        ));
    }
    report
}
