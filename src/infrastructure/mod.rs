//! 基础设施层
//!
//! 持有稀缺资源（Page），只向上暴露 DOM 能力

pub mod chrome_dom;
pub mod dom;
pub mod js_executor;

#[cfg(test)]
pub(crate) mod fake_dom;

pub use chrome_dom::ChromeDom;
pub use dom::DomProvider;
pub use js_executor::JsExecutor;
