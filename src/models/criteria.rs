use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::error::ConfigError;

/// 匹配条件
///
/// 构造后不可变；只能通过 [`MatchCriteria::compile`] 创建，
/// 所以持有的正则一定是由 `source_pattern` / `source_flags` 编译而来
#[derive(Debug, Clone)]
pub struct MatchCriteria {
    pattern: Regex,
    source_pattern: String,
    source_flags: String,
}

impl MatchCriteria {
    /// 编译正则
    ///
    /// 标志沿用浏览器的写法：`i` 忽略大小写，`m` 多行，`s` 点号匹配换行；
    /// `u` 始终开启，`g` / `y` 对"是否匹配"没有影响，直接接受
    pub fn compile(
        source_pattern: impl Into<String>,
        source_flags: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let source_pattern = source_pattern.into();
        let source_flags = source_flags.into();

        let invalid = |reason: String| ConfigError::InvalidPattern {
            pattern: source_pattern.clone(),
            flags: source_flags.clone(),
            reason,
        };

        if source_pattern.trim().is_empty() {
            return Err(invalid("正则不能为空".to_string()));
        }

        let mut builder = RegexBuilder::new(&source_pattern);
        let mut seen = Vec::new();
        for flag in source_flags.chars() {
            if seen.contains(&flag) {
                return Err(invalid(format!("重复的标志 '{}'", flag)));
            }
            seen.push(flag);

            match flag {
                'i' => {
                    builder.case_insensitive(true);
                }
                'm' => {
                    builder.multi_line(true);
                }
                's' => {
                    builder.dot_matches_new_line(true);
                }
                'u' | 'g' | 'y' => {}
                other => return Err(invalid(format!("不支持的标志 '{}'", other))),
            }
        }

        let pattern = builder.build().map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            pattern,
            source_pattern,
            source_flags,
        })
    }

    /// 文本中是否存在匹配
    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    pub fn source_pattern(&self) -> &str {
        &self.source_pattern
    }

    pub fn source_flags(&self) -> &str {
        &self.source_flags
    }
}

impl fmt::Display for MatchCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source_pattern, self.source_flags)
    }
}
