use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 删除流程中的错误
    #[error("流程错误: {0}")]
    Workflow(#[from] WorkflowError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 与浏览器的连接已断开
    #[error("浏览器连接已断开: {source}")]
    ConnectionLost {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 执行脚本失败
    #[error("执行脚本失败: {source}")]
    ScriptExecutionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 元素句柄已失效（元素已从页面移除）
    #[error("元素已不在页面中: {handle}")]
    StaleElement { handle: String },
}

/// 删除流程错误
///
/// `DialogHandlingFailure` 只在删除步骤内部出现，永远不会向上传播。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// 等待元素超时
    #[error("元素 {descriptor} 在 {timeout_ms}ms 内未出现")]
    NotFound { descriptor: String, timeout_ms: u64 },
    /// 删除按钮未在限定时间内出现
    #[error("删除按钮未出现 ({timeout_ms}ms)")]
    ActionControlTimeout { timeout_ms: u64 },
    /// 下一页按钮未在限定时间内出现
    #[error("下一页按钮未出现 ({timeout_ms}ms)")]
    NavigationTimeout { timeout_ms: u64 },
    /// 重复事件对话框处理失败
    #[error("重复事件对话框处理失败: {reason}")]
    DialogHandlingFailure { reason: String },
    /// 其他意外错误
    #[error("意外错误: {reason}")]
    Unexpected { reason: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置项为空
    #[error("配置项 {key} 不能为空")]
    EmptyValue { key: String },
    /// 最大页数非法
    #[error("最大页数必须 >= 1 (当前: {value})")]
    InvalidMaxPages { value: usize },
    /// 正则表达式非法
    #[error("无效的正则表达式 /{pattern}/{flags}: {reason}")]
    InvalidPattern {
        pattern: String,
        flags: String,
        reason: String,
    },
    /// 配置文件解析失败
    #[error("配置文件解析失败 ({path}): {reason}")]
    ProfileParseFailed { path: String, reason: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ========== 从常见错误类型转换 ==========

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        use chromiumoxide::error::CdpError;

        // websocket 或消息通道出错说明浏览器已经不可用
        match err {
            CdpError::Ws(_) | CdpError::ChannelSendError(_) => {
                AppError::Browser(BrowserError::ConnectionLost {
                    source: Box::new(err),
                })
            }
            other => AppError::Browser(BrowserError::ScriptExecutionFailed {
                source: Box::new(other),
            }),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Browser(BrowserError::ScriptExecutionFailed {
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建浏览器连接错误
    pub fn browser_connection_failed(
        port: u16,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed {
            port,
            source: Box::new(source),
        })
    }

    /// 创建连接断开错误
    pub fn connection_lost(reason: impl Into<String>) -> Self {
        let reason: String = reason.into();
        AppError::Browser(BrowserError::ConnectionLost {
            source: reason.into(),
        })
    }

    /// 创建意外流程错误
    pub fn unexpected(reason: impl Into<String>) -> Self {
        AppError::Workflow(WorkflowError::Unexpected {
            reason: reason.into(),
        })
    }

    /// 是否为无法恢复的错误
    ///
    /// 只有浏览器连接断开才视为致命，其余错误都允许流程继续。
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Browser(BrowserError::ConnectionLost { .. }))
    }

    /// 将任意错误归入流程错误分类
    pub fn into_workflow_error(self) -> WorkflowError {
        match self {
            AppError::Workflow(e) => e,
            other => WorkflowError::Unexpected {
                reason: other.to_string(),
            },
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
