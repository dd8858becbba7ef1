//! 静态 HTML 页面
//!
//! 用 `scraper` 解析一份保存下来的页面，实现同一套页面能力：
//! - 离线模式（`--html`）直接从文件提取题目
//! - 测试里当作无头夹具，点击/拖拽只记录不执行
//!
//! 没有真实布局，元素位置按文档顺序依次排列（每个元素一行，高 20px），
//! 带 `hidden` 属性或 `display:none` 的元素没有位置。

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use crate::error::BrowserError;
use crate::infrastructure::page::{BoundingBox, NodeHandle, Point, QuizPage};

const ROW_HEIGHT: f64 = 20.0;
const ROW_WIDTH: f64 = 200.0;

/// 静态页面上发生过的交互
#[derive(Debug, Clone, PartialEq)]
pub enum PageAction {
    Click(NodeHandle),
    MouseMove(Point),
    MouseDown(Point),
    MouseUp(Point),
    Select { node: NodeHandle, option: String },
}

/// 解析后的文档：所有元素按文档顺序编号
struct IndexedDocument<'a> {
    elements: Vec<ElementRef<'a>>,
}

impl<'a> IndexedDocument<'a> {
    fn element(&self, node: NodeHandle) -> Result<ElementRef<'a>> {
        usize::try_from(node.0)
            .ok()
            .and_then(|i| self.elements.get(i).copied())
            .ok_or_else(|| BrowserError::StaleNode { node: node.0 }.into())
    }
}

/// 静态 HTML 页面
pub struct StaticPage {
    html: String,
    actions: Mutex<Vec<PageAction>>,
}

impl StaticPage {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            actions: Mutex::new(Vec::new()),
        }
    }

    /// 从文件加载页面
    pub async fn from_file(path: &Path) -> Result<Self> {
        let html = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("无法读取HTML文件: {}", path.display()))?;
        Ok(Self::new(html))
    }

    /// 到目前为止记录下的交互
    pub fn actions(&self) -> Vec<PageAction> {
        self.lock_actions().clone()
    }

    fn lock_actions(&self) -> std::sync::MutexGuard<'_, Vec<PageAction>> {
        self.actions.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, action: PageAction) {
        self.lock_actions().push(action);
    }

    /// 每次调用重新解析文档，解析结果不跨 await 持有
    fn with_document<R>(&self, f: impl FnOnce(&IndexedDocument<'_>) -> Result<R>) -> Result<R> {
        let html = Html::parse_document(&self.html);
        let all = parse_selector("*")?;
        let doc = IndexedDocument {
            elements: html.select(&all).collect(),
        };
        f(&doc)
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|_| {
        BrowserError::InvalidSelector {
            selector: selector.to_string(),
        }
        .into()
    })
}

fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn is_hidden(el: &ElementRef<'_>) -> bool {
    let value = el.value();
    if value.attr("hidden").is_some() {
        return true;
    }
    value
        .attr("style")
        .map(|style| style.replace(' ', "").contains("display:none"))
        .unwrap_or(false)
}

#[async_trait]
impl QuizPage for StaticPage {
    async fn query_all(
        &self,
        scope: Option<NodeHandle>,
        selector: &str,
    ) -> Result<Vec<NodeHandle>> {
        self.with_document(|doc| {
            let selector = parse_selector(selector)?;
            let positions: HashMap<_, usize> = doc
                .elements
                .iter()
                .enumerate()
                .map(|(i, el)| (el.id(), i))
                .collect();
            let matched: Vec<ElementRef<'_>> = match scope {
                Some(scope) => doc.element(scope)?.select(&selector).collect(),
                None => doc
                    .elements
                    .iter()
                    .filter(|el| selector.matches(el))
                    .copied()
                    .collect(),
            };
            Ok(matched
                .iter()
                .filter_map(|el| positions.get(&el.id()))
                .map(|&i| NodeHandle(i as u64))
                .collect())
        })
    }

    async fn text(&self, node: NodeHandle) -> Result<String> {
        self.with_document(|doc| Ok(element_text(&doc.element(node)?)))
    }

    async fn classes(&self, node: NodeHandle) -> Result<Vec<String>> {
        self.with_document(|doc| {
            Ok(doc
                .element(node)?
                .value()
                .classes()
                .map(str::to_string)
                .collect())
        })
    }

    async fn attribute(&self, node: NodeHandle, name: &str) -> Result<Option<String>> {
        self.with_document(|doc| Ok(doc.element(node)?.value().attr(name).map(str::to_string)))
    }

    async fn click(&self, node: NodeHandle) -> Result<()> {
        self.with_document(|doc| doc.element(node).map(|_| ()))?;
        self.record(PageAction::Click(node));
        Ok(())
    }

    async fn bounding_box(&self, node: NodeHandle) -> Result<Option<BoundingBox>> {
        self.with_document(|doc| {
            let el = doc.element(node)?;
            if is_hidden(&el) {
                return Ok(None);
            }
            Ok(Some(BoundingBox {
                x: 0.0,
                y: node.0 as f64 * ROW_HEIGHT,
                width: ROW_WIDTH,
                height: ROW_HEIGHT,
            }))
        })
    }

    async fn mouse_move(&self, to: Point) -> Result<()> {
        self.record(PageAction::MouseMove(to));
        Ok(())
    }

    async fn mouse_down(&self, at: Point) -> Result<()> {
        self.record(PageAction::MouseDown(at));
        Ok(())
    }

    async fn mouse_up(&self, at: Point) -> Result<()> {
        self.record(PageAction::MouseUp(at));
        Ok(())
    }

    async fn select_option(&self, node: NodeHandle, option_text: &str) -> Result<bool> {
        let found = self.with_document(|doc| {
            let option = parse_selector("option")?;
            Ok(doc
                .element(node)?
                .select(&option)
                .any(|opt| element_text(&opt) == option_text))
        })?;
        if found {
            self.record(PageAction::Select {
                node,
                option: option_text.to_string(),
            });
        }
        Ok(found)
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<NodeHandle> {
        match self.query(None, selector).await? {
            Some(node) => Ok(node),
            None => Err(BrowserError::WaitTimeout {
                selector: selector.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div class="question multiple_choice_question" id="q1">
            <div class="question_text"> 2+2=? </div>
            <div class="answer"><input type="radio"> 3 </div>
            <div class="answer"><input type="radio"> 4 </div>
          </div>
          <div class="question" hidden></div>
        </body></html>
    "#;

    #[tokio::test]
    async fn test_query_in_document_order() {
        let page = StaticPage::new(PAGE);
        let questions = page.query_all(None, ".question").await.unwrap();
        assert_eq!(questions.len(), 2);
        assert!(questions[0] < questions[1]);

        let answers = page.query_all(Some(questions[0]), ".answer").await.unwrap();
        let texts: Vec<String> = futures::future::try_join_all(answers.iter().map(|a| page.text(*a)))
            .await
            .unwrap();
        assert_eq!(texts, vec!["3", "4"]);
    }

    #[tokio::test]
    async fn test_scoped_query_excludes_other_containers() {
        let page = StaticPage::new(PAGE);
        let questions = page.query_all(None, ".question").await.unwrap();
        let inside_second = page.query_all(Some(questions[1]), ".answer").await.unwrap();
        assert!(inside_second.is_empty());
    }

    #[tokio::test]
    async fn test_text_classes_and_attributes() {
        let page = StaticPage::new(PAGE);
        let q = page.query(None, ".question").await.unwrap().unwrap();
        let stem = page.query(Some(q), ".question_text").await.unwrap().unwrap();
        assert_eq!(page.text(stem).await.unwrap(), "2+2=?");
        assert!(page.has_class(q, "multiple_choice_question").await.unwrap());
        assert_eq!(page.attribute(q, "id").await.unwrap().as_deref(), Some("q1"));
    }

    #[tokio::test]
    async fn test_hidden_element_has_no_box() {
        let page = StaticPage::new(PAGE);
        let questions = page.query_all(None, ".question").await.unwrap();
        assert!(page.bounding_box(questions[0]).await.unwrap().is_some());
        assert!(page.bounding_box(questions[1]).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_click_is_recorded() {
        let page = StaticPage::new(PAGE);
        let radio = page.query(None, "input[type=\"radio\"]").await.unwrap().unwrap();
        page.click(radio).await.unwrap();
        assert_eq!(page.actions(), vec![PageAction::Click(radio)]);
    }

    #[tokio::test]
    async fn test_stale_node_and_bad_selector_are_errors() {
        let page = StaticPage::new(PAGE);
        tokio_test::assert_err!(page.text(NodeHandle(10_000)).await);
        tokio_test::assert_err!(page.query_all(None, "[[[").await);
        tokio_test::assert_err!(
            page.wait_for(".missing", Duration::from_millis(10)).await
        );
    }
}
