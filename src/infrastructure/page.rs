//! 页面能力接口
//!
//! 提取器和自动填写只通过这个 trait 访问页面，不关心背后是真实浏览器
//! 还是一份静态 HTML。

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// 页面元素的不透明引用
///
/// 只在同一个页面实例内有效。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeHandle(pub u64);

impl std::fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 屏幕坐标
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// 元素的可见区域
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }
}

/// 页面能力
///
/// 职责：
/// - 按选择器查找元素（可限定在某个元素内部）
/// - 读取文本、class、属性
/// - 点击、拖拽、选择下拉项
/// - 等待元素出现
///
/// 所有文本都已去掉首尾空白。
#[async_trait]
pub trait QuizPage: Send + Sync {
    /// 查找所有匹配的元素，按文档顺序返回
    async fn query_all(&self, scope: Option<NodeHandle>, selector: &str)
        -> Result<Vec<NodeHandle>>;

    /// 查找第一个匹配的元素
    async fn query(&self, scope: Option<NodeHandle>, selector: &str) -> Result<Option<NodeHandle>> {
        Ok(self.query_all(scope, selector).await?.into_iter().next())
    }

    /// 元素的文本内容（已 trim）
    async fn text(&self, node: NodeHandle) -> Result<String>;

    /// 元素的 class 列表
    async fn classes(&self, node: NodeHandle) -> Result<Vec<String>>;

    /// 读取属性
    async fn attribute(&self, node: NodeHandle, name: &str) -> Result<Option<String>>;

    /// 点击元素
    async fn click(&self, node: NodeHandle) -> Result<()>;

    /// 元素位置，不可见时为 None
    async fn bounding_box(&self, node: NodeHandle) -> Result<Option<BoundingBox>>;

    /// 鼠标移动
    async fn mouse_move(&self, to: Point) -> Result<()>;

    /// 鼠标左键按下
    async fn mouse_down(&self, at: Point) -> Result<()>;

    /// 鼠标左键抬起
    async fn mouse_up(&self, at: Point) -> Result<()>;

    /// 在下拉框中选中文本为 `option_text` 的选项，返回是否找到该选项
    async fn select_option(&self, node: NodeHandle, option_text: &str) -> Result<bool>;

    /// 等待元素出现，超时返回错误
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<NodeHandle>;

    /// 元素是否带有某个 class
    async fn has_class(&self, node: NodeHandle, class: &str) -> Result<bool> {
        Ok(self.classes(node).await?.iter().any(|c| c == class))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_center() {
        let b = BoundingBox {
            x: 10.0,
            y: 20.0,
            width: 100.0,
            height: 40.0,
        };
        assert_eq!(b.center(), Point { x: 60.0, y: 40.0 });
    }
}
