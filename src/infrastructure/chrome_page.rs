//! 基于 chromiumoxide 的页面能力实现
//!
//! 元素引用通过注入 `data-quiz-node` 属性实现：第一次查到某个元素时给它编号，
//! 之后都用 `[data-quiz-node="n"]` 找回。

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchMouseEventParams, DispatchMouseEventType, MouseButton,
};
use serde::Deserialize;
use serde_json::json;
use tokio::time::sleep;
use tracing::debug;

use crate::error::BrowserError;
use crate::infrastructure::js_executor::JsExecutor;
use crate::infrastructure::page::{BoundingBox, NodeHandle, Point, QuizPage};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

const QUERY_ALL_JS: &str = r#"(args) => {
    const root = args.scope === null
        ? document
        : document.querySelector('[data-quiz-node="' + args.scope + '"]');
    if (!root) return { found: false, nodes: [] };
    window.__quizNodeSeq = window.__quizNodeSeq || 0;
    const nodes = Array.from(root.querySelectorAll(args.selector)).map((el) => {
        if (!el.dataset.quizNode) {
            window.__quizNodeSeq += 1;
            el.dataset.quizNode = String(window.__quizNodeSeq);
        }
        return Number(el.dataset.quizNode);
    });
    return { found: true, nodes };
}"#;

const INSPECT_JS: &str = r#"(args) => {
    const el = document.querySelector('[data-quiz-node="' + args.node + '"]');
    if (!el) return { found: false };
    const r = el.getBoundingClientRect();
    return {
        found: true,
        text: (el.textContent || '').trim(),
        classes: Array.from(el.classList),
        attribute: args.attribute === null ? null : el.getAttribute(args.attribute),
        rect: (r.width > 0 || r.height > 0)
            ? { x: r.x, y: r.y, width: r.width, height: r.height }
            : null,
    };
}"#;

const CLICK_JS: &str = r#"(args) => {
    const el = document.querySelector('[data-quiz-node="' + args.node + '"]');
    if (!el) return { found: false };
    el.scrollIntoView({ block: 'center' });
    el.click();
    return { found: true };
}"#;

const SELECT_OPTION_JS: &str = r#"(args) => {
    const el = document.querySelector('[data-quiz-node="' + args.node + '"]');
    if (!el) return { found: false, selected: false };
    const option = Array.from(el.options || []).find(
        (opt) => (opt.textContent || '').trim() === args.text
    );
    if (!option) return { found: true, selected: false };
    el.value = option.value;
    el.dispatchEvent(new Event('input', { bubbles: true }));
    el.dispatchEvent(new Event('change', { bubbles: true }));
    return { found: true, selected: true };
}"#;

#[derive(Debug, Deserialize)]
struct QueryReply {
    found: bool,
    nodes: Vec<u64>,
}

#[derive(Debug, Deserialize)]
struct InspectReply {
    found: bool,
    #[serde(default)]
    text: String,
    #[serde(default)]
    classes: Vec<String>,
    #[serde(default)]
    attribute: Option<String>,
    #[serde(default)]
    rect: Option<BoundingBox>,
}

#[derive(Debug, Deserialize)]
struct ActionReply {
    found: bool,
    #[serde(default)]
    selected: bool,
}

/// 一次鼠标事件的按键字段
#[derive(Debug, Clone, PartialEq)]
struct MouseFields {
    button: MouseButton,
    /// 事件发生后仍按住的键（左键为 1）
    buttons: i64,
    click_count: Option<i64>,
}

/// `pressed` 是事件发生前左键是否按住
fn mouse_fields(kind: &DispatchMouseEventType, pressed: bool) -> MouseFields {
    match kind {
        DispatchMouseEventType::MousePressed => MouseFields {
            button: MouseButton::Left,
            buttons: 1,
            click_count: Some(1),
        },
        DispatchMouseEventType::MouseReleased => MouseFields {
            button: MouseButton::Left,
            buttons: 0,
            click_count: Some(1),
        },
        _ if pressed => MouseFields {
            button: MouseButton::Left,
            buttons: 1,
            click_count: None,
        },
        _ => MouseFields {
            button: MouseButton::None,
            buttons: 0,
            click_count: None,
        },
    }
}

/// 真实浏览器页面
pub struct ChromePage {
    executor: JsExecutor,
    /// 左键是否处于按下状态（拖拽中）
    button_down: AtomicBool,
}

impl ChromePage {
    pub fn new(executor: JsExecutor) -> Self {
        Self {
            executor,
            button_down: AtomicBool::new(false),
        }
    }

    async fn inspect(&self, node: NodeHandle, attribute: Option<&str>) -> Result<InspectReply> {
        let reply: InspectReply = self
            .executor
            .call(INSPECT_JS, &json!({ "node": node.0, "attribute": attribute }))
            .await?;
        if !reply.found {
            return Err(BrowserError::StaleNode { node: node.0 }.into());
        }
        Ok(reply)
    }

    async fn dispatch_mouse(&self, kind: DispatchMouseEventType, at: Point) -> Result<()> {
        let fields = mouse_fields(&kind, self.button_down.load(Ordering::SeqCst));
        let mut builder = DispatchMouseEventParams::builder()
            .r#type(kind)
            .x(at.x)
            .y(at.y)
            .button(fields.button)
            .buttons(fields.buttons);
        if let Some(count) = fields.click_count {
            builder = builder.click_count(count);
        }
        let params = builder
            .build()
            .map_err(|e| anyhow!("构造鼠标事件失败: {}", e))?;
        self.executor
            .page()
            .execute(params)
            .await
            .map_err(BrowserError::from)?;
        self.button_down.store(fields.buttons != 0, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl QuizPage for ChromePage {
    async fn query_all(
        &self,
        scope: Option<NodeHandle>,
        selector: &str,
    ) -> Result<Vec<NodeHandle>> {
        let reply: QueryReply = self
            .executor
            .call(
                QUERY_ALL_JS,
                &json!({ "scope": scope.map(|n| n.0), "selector": selector }),
            )
            .await?;
        if !reply.found {
            if let Some(scope) = scope {
                return Err(BrowserError::StaleNode { node: scope.0 }.into());
            }
        }
        Ok(reply.nodes.into_iter().map(NodeHandle).collect())
    }

    async fn text(&self, node: NodeHandle) -> Result<String> {
        Ok(self.inspect(node, None).await?.text)
    }

    async fn classes(&self, node: NodeHandle) -> Result<Vec<String>> {
        Ok(self.inspect(node, None).await?.classes)
    }

    async fn attribute(&self, node: NodeHandle, name: &str) -> Result<Option<String>> {
        Ok(self.inspect(node, Some(name)).await?.attribute)
    }

    async fn click(&self, node: NodeHandle) -> Result<()> {
        let reply: ActionReply = self
            .executor
            .call(CLICK_JS, &json!({ "node": node.0 }))
            .await?;
        if !reply.found {
            return Err(BrowserError::StaleNode { node: node.0 }.into());
        }
        Ok(())
    }

    async fn bounding_box(&self, node: NodeHandle) -> Result<Option<BoundingBox>> {
        Ok(self.inspect(node, None).await?.rect)
    }

    async fn mouse_move(&self, to: Point) -> Result<()> {
        self.dispatch_mouse(DispatchMouseEventType::MouseMoved, to).await
    }

    async fn mouse_down(&self, at: Point) -> Result<()> {
        self.dispatch_mouse(DispatchMouseEventType::MousePressed, at).await
    }

    async fn mouse_up(&self, at: Point) -> Result<()> {
        self.dispatch_mouse(DispatchMouseEventType::MouseReleased, at).await
    }

    async fn select_option(&self, node: NodeHandle, option_text: &str) -> Result<bool> {
        let reply: ActionReply = self
            .executor
            .call(SELECT_OPTION_JS, &json!({ "node": node.0, "text": option_text }))
            .await?;
        if !reply.found {
            return Err(BrowserError::StaleNode { node: node.0 }.into());
        }
        Ok(reply.selected)
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<NodeHandle> {
        let started = Instant::now();
        loop {
            if let Some(node) = self.query(None, selector).await? {
                debug!("元素 {} 已出现 ({} ms)", selector, started.elapsed().as_millis());
                return Ok(node);
            }
            if started.elapsed() >= timeout {
                return Err(BrowserError::WaitTimeout {
                    selector: selector.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                }
                .into());
            }
            sleep(POLL_INTERVAL).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_gesture_button_state() {
        // 移动 → 按下 → 拖动 → 松开
        let hover = mouse_fields(&DispatchMouseEventType::MouseMoved, false);
        assert_eq!(hover.button, MouseButton::None);
        assert_eq!(hover.buttons, 0);
        assert_eq!(hover.click_count, None);

        let press = mouse_fields(&DispatchMouseEventType::MousePressed, false);
        assert_eq!(press.button, MouseButton::Left);
        assert_eq!(press.buttons, 1);
        assert_eq!(press.click_count, Some(1));

        let drag = mouse_fields(&DispatchMouseEventType::MouseMoved, true);
        assert_eq!(drag.button, MouseButton::Left);
        assert_eq!(drag.buttons, 1);

        let release = mouse_fields(&DispatchMouseEventType::MouseReleased, true);
        assert_eq!(release.button, MouseButton::Left);
        assert_eq!(release.buttons, 0);
        assert_eq!(release.click_count, Some(1));
    }
}
