//! 题目提取服务 - 业务能力层
//!
//! 扫描页面上的所有题目容器，按文档顺序产出 `QuestionModel`。
//!
//! 提取是"尽力而为"：任何页面错误都只会让结果变少/变空，不会向上抛。

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::infrastructure::{NodeHandle, QuizPage};
use crate::models::{Markers, QuestionModel};
use crate::services::classifier::{default_classifiers, texts_of, QuestionClassifier};
use crate::utils::logging::truncate_text;

/// 题目提取器
pub struct Extractor {
    markers: Markers,
    classifiers: Vec<Box<dyn QuestionClassifier>>,
}

impl Extractor {
    /// 使用默认分类器（选择题、连线题）
    pub fn new(markers: Markers) -> Self {
        let classifiers = default_classifiers(&markers);
        Self {
            markers,
            classifiers,
        }
    }

    /// 使用自定义分类器列表，按顺序尝试，第一个认出的生效
    pub fn with_classifiers(markers: Markers, classifiers: Vec<Box<dyn QuestionClassifier>>) -> Self {
        Self {
            markers,
            classifiers,
        }
    }

    /// 提取页面上的所有题目
    ///
    /// 每个容器最多产出一道主题目，另外容器里的每个下拉框各产出一道下拉题。
    pub async fn extract(&self, page: &dyn QuizPage) -> Vec<QuestionModel> {
        let containers = match page.query_all(None, &self.markers.question).await {
            Ok(containers) => containers,
            Err(e) => {
                warn!("⚠️ 查找题目容器失败: {}", e);
                return Vec::new();
            }
        };
        debug!("找到 {} 个题目容器", containers.len());

        let mut questions = Vec::new();
        for (idx, container) in containers.into_iter().enumerate() {
            let extracted = self.extract_container(page, container, idx + 1).await;
            questions.extend(extracted);
        }

        info!("✓ 共提取 {} 道题目", questions.len());
        questions
    }

    /// 处理单个容器
    async fn extract_container(
        &self,
        page: &dyn QuizPage,
        container: NodeHandle,
        container_no: usize,
    ) -> Vec<QuestionModel> {
        let stem = self.stem(page, container).await;
        debug!("[容器 {}] 题干: {}", container_no, truncate_text(&stem, 80));

        let mut models = Vec::new();

        match self.classify(page, container, &stem).await {
            Ok(Some(model)) => {
                debug!("[容器 {}] 类型: {}", container_no, model.kind());
                models.push(model);
            }
            Ok(None) => debug!("[容器 {}] 未识别的题型，跳过", container_no),
            Err(e) => warn!("[容器 {}] ⚠️ 分类失败: {}", container_no, e),
        }

        models.extend(self.dropdowns(page, container, &stem, container_no).await);
        models
    }

    async fn classify(
        &self,
        page: &dyn QuizPage,
        container: NodeHandle,
        stem: &str,
    ) -> Result<Option<QuestionModel>> {
        for classifier in &self.classifiers {
            if let Some(model) = classifier.classify(page, container, stem).await? {
                return Ok(Some(model));
            }
        }
        Ok(None)
    }

    /// 题干，找不到或读取失败时为空串
    async fn stem(&self, page: &dyn QuizPage, container: NodeHandle) -> String {
        let node = match page.query(Some(container), &self.markers.question_text).await {
            Ok(Some(node)) => node,
            Ok(None) => return String::new(),
            Err(e) => {
                warn!("⚠️ 查找题干失败: {}", e);
                return String::new();
            }
        };
        page.text(node).await.unwrap_or_else(|e| {
            warn!("⚠️ 读取题干失败: {}", e);
            String::new()
        })
    }

    /// 容器里的所有下拉框，每个一道下拉题
    async fn dropdowns(
        &self,
        page: &dyn QuizPage,
        container: NodeHandle,
        stem: &str,
        container_no: usize,
    ) -> Vec<QuestionModel> {
        let selects = match page.query_all(Some(container), &self.markers.dropdown).await {
            Ok(selects) => selects,
            Err(e) => {
                warn!("[容器 {}] ⚠️ 查找下拉框失败: {}", container_no, e);
                return Vec::new();
            }
        };

        let mut models = Vec::with_capacity(selects.len());
        for (idx, select) in selects.into_iter().enumerate() {
            match self.dropdown(page, container, select, stem, idx + 1).await {
                Ok(model) => models.push(model),
                Err(e) => warn!(
                    "[容器 {}] ⚠️ 读取第 {} 个下拉框失败: {}",
                    container_no,
                    idx + 1,
                    e
                ),
            }
        }
        models
    }

    async fn dropdown(
        &self,
        page: &dyn QuizPage,
        container: NodeHandle,
        select: NodeHandle,
        stem: &str,
        dropdown_no: usize,
    ) -> Result<QuestionModel> {
        let option_nodes = page
            .query_all(Some(select), &self.markers.dropdown_option)
            .await?;
        let options: Vec<String> = texts_of(page, &option_nodes)
            .await?
            .into_iter()
            .filter(|text| !text.is_empty())
            .collect();

        let prompt = match self.label_text(page, container, select).await? {
            Some(label) => label,
            None if stem.is_empty() => format!("Dropdown {}", dropdown_no),
            None => format!("{} (Dropdown {})", stem, dropdown_no),
        };

        let known_answer = self.known_answer(page, container, select).await?;

        Ok(QuestionModel::dropdown(prompt, options)
            .with_known_answer(known_answer)
            .with_source(select))
    }

    /// `label[for=<id>]` 的文本，空 label 视为没有
    async fn label_text(
        &self,
        page: &dyn QuizPage,
        container: NodeHandle,
        select: NodeHandle,
    ) -> Result<Option<String>> {
        let Some(id) = page.attribute(select, "id").await? else {
            return Ok(None);
        };
        if id.is_empty() {
            return Ok(None);
        }
        let Some(label) = page.query(Some(container), &self.markers.label_for(&id)).await? else {
            return Ok(None);
        };
        let text = page.text(label).await?;
        Ok(if text.is_empty() { None } else { Some(text) })
    }

    /// 下拉框所在的 `.question_content` 区域里给出的 `.correct_answer`
    async fn known_answer(
        &self,
        page: &dyn QuizPage,
        container: NodeHandle,
        select: NodeHandle,
    ) -> Result<Option<String>> {
        let regions = page
            .query_all(Some(container), &self.markers.question_content)
            .await?;
        // 最内层的区域排在后面
        for region in regions.into_iter().rev() {
            let selects = page.query_all(Some(region), &self.markers.dropdown).await?;
            if !selects.contains(&select) {
                continue;
            }
            return match page.query(Some(region), &self.markers.correct_answer).await? {
                Some(node) => Ok(Some(page.text(node).await?)),
                None => Ok(None),
            };
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::StaticPage;
    use crate::models::{MatchPair, QuestionKind};

    fn extractor() -> Extractor {
        Extractor::new(Markers::default())
    }

    /// 判断题：按选择题建模，选项固定
    struct TrueFalseClassifier;

    #[async_trait::async_trait]
    impl QuestionClassifier for TrueFalseClassifier {
        async fn classify(
            &self,
            page: &dyn QuizPage,
            container: NodeHandle,
            stem: &str,
        ) -> Result<Option<QuestionModel>> {
            if !page.has_class(container, "true_false_question").await? {
                return Ok(None);
            }
            let options = vec!["True".to_string(), "False".to_string()];
            Ok(Some(
                QuestionModel::multiple_choice(stem, options).with_source(container),
            ))
        }
    }

    #[tokio::test]
    async fn test_injected_classifier_keeps_document_order() {
        let page = StaticPage::new(
            r#"<form>
              <div class="question true_false_question"><div class="question_text">Sky is blue</div></div>
              <div class="question multiple_choice_question">
                <div class="question_text">2+2=?</div>
                <div class="answer">4</div>
              </div>
              <div class="question essay_question"><div class="question_text">Why?</div></div>
            </form>"#,
        );
        let markers = Markers::default();
        let mut classifiers = default_classifiers(&markers);
        classifiers.push(Box::new(TrueFalseClassifier));

        let questions = Extractor::with_classifiers(markers, classifiers)
            .extract(&page)
            .await;
        let stems: Vec<&str> = questions.iter().map(|q| q.stem.as_str()).collect();
        assert_eq!(stems, ["Sky is blue", "2+2=?"]);
        assert_eq!(questions[0].options().unwrap(), ["True", "False"]);

        // 默认提取器不认识判断题
        assert_eq!(extractor().extract(&page).await.len(), 1);
    }

    #[tokio::test]
    async fn test_extracts_in_document_order() {
        let page = StaticPage::new(
            r#"<form>
              <div class="question multiple_choice_question">
                <div class="question_text">2+2=?</div>
                <div class="answer">A</div><div class="answer">B</div><div class="answer">C</div>
              </div>
              <div class="question essay_question"><div class="question_text">Why?</div></div>
              <div class="question matching_question">
                <div class="question_text">配对动物</div>
                <div class="matching_term">Dog</div><div class="matching_term">Cat</div>
                <div class="matching_definition">Canine</div><div class="matching_definition">Feline</div>
              </div>
            </form>"#,
        );

        let questions = extractor().extract(&page).await;
        assert_eq!(questions.len(), 2);

        assert_eq!(questions[0].kind(), QuestionKind::MultipleChoice);
        assert_eq!(questions[0].stem, "2+2=?");
        assert_eq!(questions[0].options().unwrap(), ["A", "B", "C"]);

        assert_eq!(questions[1].kind(), QuestionKind::Matching);
        assert_eq!(
            questions[1].matches().unwrap(),
            [MatchPair::new("Dog", "Canine"), MatchPair::new("Cat", "Feline")]
        );
    }

    #[tokio::test]
    async fn test_missing_stem_and_answers_still_yield_model() {
        let page = StaticPage::new(r#"<div class="question multiple_choice_question"></div>"#);
        let questions = extractor().extract(&page).await;
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].stem, "");
        assert!(questions[0].options().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dropdowns_follow_container_model() {
        let page = StaticPage::new(
            r#"<div class="question multiple_choice_question">
                 <div class="question_text">Fill in</div>
                 <div class="answer">x</div>
                 <label for="sel_a">The sky is</label>
                 <select id="sel_a"><option></option><option>blue</option><option>green</option></select>
                 <select id="sel_b"><option>up</option><option>down</option></select>
               </div>"#,
        );
        let questions = extractor().extract(&page).await;
        let kinds: Vec<_> = questions.iter().map(|q| q.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                QuestionKind::MultipleChoice,
                QuestionKind::Dropdown,
                QuestionKind::Dropdown
            ]
        );
        assert_eq!(questions[1].stem, "The sky is");
        assert_eq!(questions[1].options().unwrap(), ["blue", "green"]);
        assert_eq!(questions[2].stem, "Fill in (Dropdown 2)");
    }

    #[tokio::test]
    async fn test_dropdown_in_unclassified_container() {
        let page = StaticPage::new(
            r#"<div class="question multiple_dropdowns_question">
                 <select><option>a</option></select>
               </div>"#,
        );
        let questions = extractor().extract(&page).await;
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].kind(), QuestionKind::Dropdown);
        assert_eq!(questions[0].stem, "Dropdown 1");
    }

    #[tokio::test]
    async fn test_dropdown_picks_up_correct_answer() {
        let page = StaticPage::new(
            r#"<div class="question">
                 <div class="question_text">Capital</div>
                 <div class="question_content">
                   <select id="cap"><option>Paris</option><option>Rome</option></select>
                   <span class="correct_answer"> Paris </span>
                 </div>
               </div>"#,
        );
        let questions = extractor().extract(&page).await;
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].known_answer(), Some("Paris"));
    }

    #[tokio::test]
    async fn test_page_without_questions() {
        let page = StaticPage::new("<html><body><p>Not a quiz</p></body></html>");
        assert!(extractor().extract(&page).await.is_empty());
    }
}
