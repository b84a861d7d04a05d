//! 元素等待服务 - 业务能力层
//!
//! 页面没有"渲染完成"的通知，只能按固定间隔轮询

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::error::{AppResult, WorkflowError};
use crate::infrastructure::DomProvider;
use crate::models::{Descriptor, ItemRef};

/// 轮询间隔的下限，防止配置成 0 时空转
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// 元素等待服务
///
/// 职责：
/// - 按 `poll_interval` 轮询，直到元素出现或超时
/// - 第一次检查不等待
/// - 间隔比剩余时间长时只等到截止时间
/// - 超时只返回 `NotFound`，没有部分结果
pub struct Awaiter {
    poll_interval: Duration,
}

impl Awaiter {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
        }
    }

    /// 等待符合条件的元素出现
    ///
    /// # 返回
    /// 找到的元素；超时返回 `WorkflowError::NotFound`，
    /// 查找过程中的其他错误原样返回
    pub async fn wait_for(
        &self,
        dom: &dyn DomProvider,
        descriptor: &Descriptor,
        timeout: Duration,
    ) -> AppResult<ItemRef> {
        let start = Instant::now();

        loop {
            if let Some(item) = dom.locate(descriptor).await? {
                info!(
                    "✓ 找到元素: {} (等待 {}ms)",
                    descriptor,
                    start.elapsed().as_millis()
                );
                return Ok(item);
            }

            let elapsed = start.elapsed();
            if elapsed >= timeout {
                warn!(
                    "⚠️ 元素未在限定时间内出现: {} ({}ms)",
                    descriptor,
                    timeout.as_millis()
                );
                return Err(WorkflowError::NotFound {
                    descriptor: descriptor.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                }
                .into());
            }

            // 最后一次等待不越过截止时间
            let wait = self.poll_interval.min(timeout - elapsed);
            debug!("元素尚未出现，{}ms 后重试", wait.as_millis());
            sleep(wait).await;
        }
    }
}

impl Default for Awaiter {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}
