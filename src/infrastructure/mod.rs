//! 基础设施层
//!
//! 持有稀缺资源（浏览器 Page / 页面文档），只暴露页面能力。

pub mod chrome_page;
pub mod js_executor;
pub mod page;
pub mod static_page;

pub use chrome_page::ChromePage;
pub use js_executor::JsExecutor;
pub use page::{BoundingBox, NodeHandle, Point, QuizPage};
pub use static_page::{PageAction, StaticPage};
