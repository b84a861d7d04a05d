//! DOM 能力接口
//!
//! 删除流程只通过这个 trait 读写页面，方便替换成内存实现做测试

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{Descriptor, ElementSnapshot, Extent, ItemRef};

/// 页面 DOM 能力
#[async_trait]
pub trait DomProvider: Send + Sync {
    /// 按文档顺序列出某类元素（例如 `span`）的快照
    async fn query_all(&self, kind: &str) -> AppResult<Vec<ItemRef>>;

    /// 查找第一个符合条件的元素，不存在时返回 `None`
    async fn locate(&self, descriptor: &Descriptor) -> AppResult<Option<ItemRef>>;

    /// 点击元素
    async fn activate(&self, item: &ItemRef) -> AppResult<()>;

    /// 元素的渲染尺寸；元素已消失时为 0
    async fn bounding_extent(&self, item: &ItemRef) -> AppResult<Extent>;

    /// 元素的文字内容
    async fn text(&self, item: &ItemRef) -> AppResult<String>;

    /// 一次读出某类元素的句柄、文字和尺寸
    ///
    /// 默认逐个元素读取；真实页面应覆盖为一次脚本调用，
    /// 保证同一元素的文字和尺寸来自同一次渲染
    async fn snapshot(&self, kind: &str) -> AppResult<Vec<ElementSnapshot>> {
        let mut elements = Vec::new();
        for item in self.query_all(kind).await? {
            let text = self.text(&item).await?;
            let extent = self.bounding_extent(&item).await?;
            elements.push(ElementSnapshot { item, text, extent });
        }
        Ok(elements)
    }

    /// 当前页面地址
    async fn location(&self) -> AppResult<Option<String>> {
        Ok(None)
    }
}
