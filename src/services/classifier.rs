//! 题目分类器 - 业务能力层
//!
//! 把"一个题目容器 + 它里面能查到的子元素"变成 `QuestionModel`。
//! 分类器只看结构标记，不关心页面背后是浏览器还是静态 HTML。

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use crate::infrastructure::{NodeHandle, QuizPage};
use crate::models::{Markers, MatchPair, QuestionModel};

/// 题目分类器
///
/// 返回 `Ok(None)` 表示这个分类器不认识该容器，交给下一个分类器。
#[async_trait]
pub trait QuestionClassifier: Send + Sync {
    async fn classify(
        &self,
        page: &dyn QuizPage,
        container: NodeHandle,
        stem: &str,
    ) -> Result<Option<QuestionModel>>;
}

/// 依次读取多个元素的文本
pub(crate) async fn texts_of(page: &dyn QuizPage, nodes: &[NodeHandle]) -> Result<Vec<String>> {
    let mut texts = Vec::with_capacity(nodes.len());
    for node in nodes {
        texts.push(page.text(*node).await?);
    }
    Ok(texts)
}

/// 选择题：容器带 `multiple_choice_question` class
pub struct MultipleChoiceClassifier {
    marker_class: String,
    answer_selector: String,
}

impl MultipleChoiceClassifier {
    pub fn new(markers: &Markers) -> Self {
        Self {
            marker_class: markers.multiple_choice_class.clone(),
            answer_selector: markers.answer.clone(),
        }
    }
}

#[async_trait]
impl QuestionClassifier for MultipleChoiceClassifier {
    async fn classify(
        &self,
        page: &dyn QuizPage,
        container: NodeHandle,
        stem: &str,
    ) -> Result<Option<QuestionModel>> {
        if !page.has_class(container, &self.marker_class).await? {
            return Ok(None);
        }

        // 空文本的选项也保留，选项数与页面上的选项元素一一对应
        let answers = page.query_all(Some(container), &self.answer_selector).await?;
        let options = texts_of(page, &answers).await?;

        Ok(Some(
            QuestionModel::multiple_choice(stem, options).with_source(container),
        ))
    }
}

/// 连线题：容器带 `matching_question` class
pub struct MatchingClassifier {
    marker_class: String,
    term_selector: String,
    definition_selector: String,
}

impl MatchingClassifier {
    pub fn new(markers: &Markers) -> Self {
        Self {
            marker_class: markers.matching_class.clone(),
            term_selector: markers.matching_term.clone(),
            definition_selector: markers.matching_definition.clone(),
        }
    }
}

#[async_trait]
impl QuestionClassifier for MatchingClassifier {
    async fn classify(
        &self,
        page: &dyn QuizPage,
        container: NodeHandle,
        stem: &str,
    ) -> Result<Option<QuestionModel>> {
        if !page.has_class(container, &self.marker_class).await? {
            return Ok(None);
        }

        let terms = page.query_all(Some(container), &self.term_selector).await?;
        let definitions = page
            .query_all(Some(container), &self.definition_selector)
            .await?;

        if terms.len() != definitions.len() {
            warn!(
                "连线题左右数量不一致 (左 {} / 右 {})，只保留前 {} 组",
                terms.len(),
                definitions.len(),
                terms.len().min(definitions.len())
            );
        }

        let terms = texts_of(page, &terms).await?;
        let definitions = texts_of(page, &definitions).await?;
        let matches = terms
            .into_iter()
            .zip(definitions)
            .map(|(term, definition)| MatchPair { term, definition })
            .collect();

        Ok(Some(QuestionModel::matching(stem, matches).with_source(container)))
    }
}

/// 默认分类器顺序：选择题优先，其次连线题
pub fn default_classifiers(markers: &Markers) -> Vec<Box<dyn QuestionClassifier>> {
    vec![
        Box::new(MultipleChoiceClassifier::new(markers)),
        Box::new(MatchingClassifier::new(markers)),
    ]
}
