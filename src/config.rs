//! 程序配置
//!
//! 优先级：环境变量 > 配置档（TOML）> 默认值

use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppResult, ConfigError};
use crate::models::loaders::{load_profile, Profile};
use crate::models::MatchCriteria;

/// 页面上的按钮 / 对话框文字
///
/// 不同语言的日历界面文字不同，所以全部可配置
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UiLabels {
    /// 下一页按钮的 aria-label
    pub next_page: String,
    /// 删除事件按钮的 aria-label
    pub delete_event: String,
    /// 删除任务按钮的 aria-label
    pub delete_task: String,
    /// 重复事件对话框中的文字
    pub recurring_event: String,
    /// 重复任务对话框中的文字
    pub recurring_task: String,
}

impl Default for UiLabels {
    fn default() -> Self {
        Self {
            next_page: "Next month".to_string(),
            delete_event: "Delete event".to_string(),
            delete_task: "Delete task".to_string(),
            recurring_event: "Delete repeating event".to_string(),
            recurring_task: "Delete recurring task".to_string(),
        }
    }
}

impl UiLabels {
    /// 两种删除按钮的标签
    pub fn delete_controls(&self) -> Vec<String> {
        vec![self.delete_event.clone(), self.delete_task.clone()]
    }

    /// 两种重复对话框的标签
    pub fn recurring_dialogs(&self) -> Vec<String> {
        vec![self.recurring_event.clone(), self.recurring_task.clone()]
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("next_page", &self.next_page),
            ("delete_event", &self.delete_event),
            ("delete_task", &self.delete_task),
            ("recurring_event", &self.recurring_event),
            ("recurring_task", &self.recurring_task),
        ];
        for (key, value) in fields {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyValue {
                    key: key.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// 各阶段的等待时间
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timings {
    /// 轮询元素的间隔
    pub poll_interval: Duration,
    /// 等待删除按钮的超时
    pub action_control_timeout: Duration,
    /// 点击删除后等待对话框渲染的时间
    pub dialog_settle: Duration,
    /// 等待对话框确认按钮的超时
    pub dialog_confirm_timeout: Duration,
    /// 等待下一页按钮的超时
    pub navigation_timeout: Duration,
    /// 翻页后等待新页面渲染的时间
    pub navigation_settle: Duration,
    /// 删除成功后到下一次扫描的间隔
    pub inter_delete_delay: Duration,
    /// 删除失败后的退避时间
    pub error_backoff: Duration,
    /// 页面级错误后的退避时间
    pub page_error_backoff: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            action_control_timeout: Duration::from_millis(3000),
            dialog_settle: Duration::from_millis(500),
            dialog_confirm_timeout: Duration::from_millis(2000),
            navigation_timeout: Duration::from_millis(3000),
            navigation_settle: Duration::from_millis(2000),
            inter_delete_delay: Duration::from_millis(800),
            error_backoff: Duration::from_millis(1500),
            page_error_backoff: Duration::from_millis(3000),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 目标URL
    pub target_url: String,
    /// 已打开的标签页标题（包含即可）
    pub target_title: String,
    /// 是否自行启动无头浏览器
    pub headless: bool,
    /// 无头模式下的浏览器路径
    pub chrome_executable: Option<String>,
    /// 最多处理的页数
    pub max_pages: usize,
    /// 匹配事件的正则
    pub match_pattern: String,
    /// 正则标志（i / m / s ...）
    pub match_flags: String,
    pub labels: UiLabels,
    pub timings: Timings,
    /// 同一页连续删除失败的上限
    pub max_consecutive_failures: usize,
    /// 跳过确认提示
    pub auto_confirm: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 配置档路径
    pub profile_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_debug_port: 9222,
            target_url: "https://calendar.google.com/calendar/r/month".to_string(),
            target_title: "Google Calendar".to_string(),
            headless: false,
            chrome_executable: None,
            max_pages: 12,
            match_pattern: String::new(),
            match_flags: "i".to_string(),
            labels: UiLabels::default(),
            timings: Timings::default(),
            max_consecutive_failures: 5,
            auto_confirm: false,
            verbose_logging: false,
            output_log_file: "purge_log.txt".to_string(),
            profile_file: None,
        }
    }
}

impl Config {
    /// 加载配置：默认值 → 配置档 → 环境变量，最后校验
    pub async fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("PROFILE_FILE") {
            let profile = load_profile(&path).await?;
            config.apply_profile(profile);
            config.profile_file = Some(path);
        }

        config.apply_env_with(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// 只从环境变量加载（不读取配置档）
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::default();
        config.apply_env_with(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// 用配置档覆盖当前值
    pub fn apply_profile(&mut self, profile: Profile) {
        if let Some(labels) = profile.labels {
            self.labels = labels;
        }
        if let Some(max_pages) = profile.max_pages {
            self.max_pages = max_pages;
        }
        if let Some(pattern) = profile.pattern {
            self.match_pattern = pattern;
        }
        if let Some(flags) = profile.flags {
            self.match_flags = flags;
        }
        if let Some(url) = profile.target_url {
            self.target_url = url;
        }
    }

    /// 用环境变量覆盖当前值
    ///
    /// `lookup` 负责按名字取值，测试时可以传入固定的表
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse = |key: &str, expected: &str| -> Result<Option<u64>, ConfigError> {
            parse_var(&lookup, key, expected)
        };

        if let Some(port) = parse_var::<u16, _>(&lookup, "BROWSER_DEBUG_PORT", "u16")? {
            self.browser_debug_port = port;
        }
        if let Some(v) = lookup("TARGET_URL") {
            self.target_url = v;
        }
        if let Some(v) = lookup("TARGET_TITLE") {
            self.target_title = v;
        }
        if let Some(v) = parse_var::<bool, _>(&lookup, "HEADLESS", "bool")? {
            self.headless = v;
        }
        if let Some(v) = lookup("CHROME_EXECUTABLE") {
            self.chrome_executable = Some(v);
        }
        if let Some(v) = parse_var::<usize, _>(&lookup, "MAX_PAGES", "usize")? {
            self.max_pages = v;
        }
        if let Some(v) = lookup("MATCH_PATTERN") {
            self.match_pattern = v;
        }
        if let Some(v) = lookup("MATCH_FLAGS") {
            self.match_flags = v;
        }
        if let Some(v) = lookup("NEXT_PAGE_LABEL") {
            self.labels.next_page = v;
        }
        if let Some(v) = lookup("DELETE_EVENT_LABEL") {
            self.labels.delete_event = v;
        }
        if let Some(v) = lookup("DELETE_TASK_LABEL") {
            self.labels.delete_task = v;
        }
        if let Some(v) = lookup("RECURRING_EVENT_LABEL") {
            self.labels.recurring_event = v;
        }
        if let Some(v) = lookup("RECURRING_TASK_LABEL") {
            self.labels.recurring_task = v;
        }
        if let Some(v) = parse_var::<usize, _>(&lookup, "MAX_CONSECUTIVE_FAILURES", "usize")? {
            self.max_consecutive_failures = v;
        }
        if let Some(v) = parse_var::<bool, _>(&lookup, "AUTO_CONFIRM", "bool")? {
            self.auto_confirm = v;
        }
        if let Some(v) = parse_var::<bool, _>(&lookup, "VERBOSE_LOGGING", "bool")? {
            self.verbose_logging = v;
        }
        if let Some(v) = lookup("OUTPUT_LOG_FILE") {
            self.output_log_file = v;
        }

        // --- 等待时间（毫秒） ---
        let timings = &mut self.timings;
        let slots: [(&str, &mut Duration); 9] = [
            ("POLL_INTERVAL_MS", &mut timings.poll_interval),
            ("ACTION_CONTROL_TIMEOUT_MS", &mut timings.action_control_timeout),
            ("DIALOG_SETTLE_MS", &mut timings.dialog_settle),
            ("DIALOG_CONFIRM_TIMEOUT_MS", &mut timings.dialog_confirm_timeout),
            ("NAVIGATION_TIMEOUT_MS", &mut timings.navigation_timeout),
            ("NAVIGATION_SETTLE_MS", &mut timings.navigation_settle),
            ("INTER_DELETE_DELAY_MS", &mut timings.inter_delete_delay),
            ("ERROR_BACKOFF_MS", &mut timings.error_backoff),
            ("PAGE_ERROR_BACKOFF_MS", &mut timings.page_error_backoff),
        ];
        for (key, slot) in slots {
            if let Some(ms) = parse(key, "u64")? {
                *slot = Duration::from_millis(ms);
            }
        }

        Ok(())
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pages < 1 {
            return Err(ConfigError::InvalidMaxPages {
                value: self.max_pages,
            });
        }
        if self.match_pattern.trim().is_empty() {
            return Err(ConfigError::EmptyValue {
                key: "match_pattern".to_string(),
            });
        }
        if self.max_consecutive_failures < 1 {
            return Err(ConfigError::EmptyValue {
                key: "max_consecutive_failures".to_string(),
            });
        }
        self.labels.validate()?;
        self.criteria().map(|_| ())
    }

    /// 按配置编译匹配条件
    pub fn criteria(&self) -> Result<MatchCriteria, ConfigError> {
        MatchCriteria::compile(&self.match_pattern, &self.match_flags)
    }
}

fn parse_var<T, F>(lookup: &F, var_name: &str, expected_type: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var_name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
    }
}
