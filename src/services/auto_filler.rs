//! 自动填写 - 业务能力层
//!
//! 把选好的答案落到页面上：点单选、拖连线、选下拉项，最后提交。
//!
//! 题目编号在错误和日志里都是从 1 开始。

use std::collections::HashMap;
use std::time::Duration;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::FillError;
use crate::infrastructure::{NodeHandle, Point, QuizPage};
use crate::models::{AnswerOutcome, MatchPair, Markers, QuestionBody, QuestionModel};

/// 选项怎么选
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// 只填调用方给出的选择，没有选择的题跳过
    #[default]
    Supplied,
    /// 不看答案，每道选择题/下拉题都选第一项
    FirstAvailable,
}

/// 每道题选中的选项下标（题目下标 → 选项下标）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerChoices {
    chosen: HashMap<usize, usize>,
}

/// 宽松比较用：折叠空白、转小写
fn normalize(whitespace: &Regex, text: &str) -> String {
    whitespace.replace_all(text.trim(), " ").to_lowercase()
}

impl AnswerChoices {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定某道题选第几个选项
    pub fn choose(&mut self, question_index: usize, option_index: usize) {
        self.chosen.insert(question_index, option_index);
    }

    pub fn get(&self, question_index: usize) -> Option<usize> {
        self.chosen.get(&question_index).copied()
    }

    pub fn len(&self) -> usize {
        self.chosen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    /// 根据取到的答案文本推出选项下标
    ///
    /// 先精确匹配选项文本，找不到再忽略空白和大小写匹配。
    /// 没有答案、题目没有选项或匹配不上的题不会出现在结果里。
    pub fn from_outcomes(
        questions: &[QuestionModel],
        outcomes: &[AnswerOutcome],
    ) -> Result<Self, regex::Error> {
        let whitespace = Regex::new(r"\s+")?;
        let mut choices = Self::new();
        for outcome in outcomes {
            let Some(answer) = outcome.answer_text() else {
                continue;
            };
            let Some(options) = questions
                .get(outcome.question_index)
                .and_then(QuestionModel::options)
            else {
                continue;
            };

            let exact = options.iter().position(|option| option == answer);
            let loose = || {
                let wanted = normalize(&whitespace, answer);
                options
                    .iter()
                    .position(|option| normalize(&whitespace, option) == wanted)
            };
            match exact.or_else(loose) {
                Some(option_index) => choices.choose(outcome.question_index, option_index),
                None => debug!(
                    "[题目 {}] 答案 '{}' 不在选项中",
                    outcome.question_index + 1,
                    answer
                ),
            }
        }
        Ok(choices)
    }
}

/// 一次填写的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillReport {
    /// 已填写的题目下标
    pub filled: Vec<usize>,
    /// 没有可用选择而跳过的题目下标
    pub skipped: Vec<usize>,
    /// 完成的连线拖拽次数
    pub drags: usize,
}

/// 提交结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 确认框出现并已点击确认
    Confirmed,
    /// 已点提交，但没有等到确认框或确认按钮
    Unconfirmed,
}

/// 自动填写器
pub struct AutoFiller {
    markers: Markers,
    wait_timeout: Duration,
}

impl AutoFiller {
    pub fn new(markers: Markers, wait_timeout: Duration) -> Self {
        Self {
            markers,
            wait_timeout,
        }
    }

    /// 按顺序填写所有题目
    ///
    /// 任何一道题出错都会立即返回，不再处理后面的题目。
    pub async fn fill(
        &self,
        page: &dyn QuizPage,
        questions: &[QuestionModel],
        choices: &AnswerChoices,
        policy: SelectionPolicy,
    ) -> Result<FillReport, FillError> {
        let mut report = FillReport::default();

        for (idx, question) in questions.iter().enumerate() {
            let no = idx + 1;
            let choice = match policy {
                SelectionPolicy::Supplied => choices.get(idx),
                SelectionPolicy::FirstAvailable => Some(0),
            };

            let filled = match &question.body {
                QuestionBody::MultipleChoice { options } => {
                    self.fill_multiple_choice(page, question, options, choice, policy, no)
                        .await?
                }
                QuestionBody::Matching { matches } => {
                    report.drags += self.fill_matching(page, question, matches, no).await?;
                    true
                }
                QuestionBody::Dropdown { options, .. } => {
                    self.fill_dropdown(page, question, options, choice, no).await?
                }
            };

            if filled {
                report.filled.push(idx);
            } else {
                debug!("[题目 {}] 没有可用的选择，跳过", no);
                report.skipped.push(idx);
            }
        }

        info!(
            "✓ 自动填写完成: 已填 {} 题，跳过 {} 题",
            report.filled.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    async fn fill_multiple_choice(
        &self,
        page: &dyn QuizPage,
        question: &QuestionModel,
        options: &[String],
        choice: Option<usize>,
        policy: SelectionPolicy,
        no: usize,
    ) -> Result<bool, FillError> {
        if options.is_empty() {
            return Err(FillError::NoOptions { question: no });
        }
        let container = question
            .source
            .ok_or(FillError::MissingSource { question: no })?;

        let radio = match policy {
            SelectionPolicy::FirstAvailable => page
                .query(Some(container), &self.markers.radio)
                .await?
                .ok_or_else(|| FillError::missing_control(no, &self.markers.radio))?,
            SelectionPolicy::Supplied => {
                let Some(option_index) = choice else {
                    return Ok(false);
                };
                let answers = page.query_all(Some(container), &self.markers.answer).await?;
                let answer = answers.get(option_index).copied().ok_or_else(|| {
                    FillError::missing_control(
                        no,
                        format!("{} #{}", self.markers.answer, option_index + 1),
                    )
                })?;
                page.query(Some(answer), &self.markers.radio)
                    .await?
                    .ok_or_else(|| FillError::missing_control(no, &self.markers.radio))?
            }
        };

        page.click(radio).await?;
        debug!("[题目 {}] 已点击单选项", no);
        Ok(true)
    }

    /// 逐对拖拽，返回完成的拖拽次数
    async fn fill_matching(
        &self,
        page: &dyn QuizPage,
        question: &QuestionModel,
        matches: &[MatchPair],
        no: usize,
    ) -> Result<usize, FillError> {
        if matches.is_empty() {
            return Err(FillError::NoMatchingPairs { question: no });
        }
        let container = question
            .source
            .ok_or(FillError::MissingSource { question: no })?;

        let terms = page
            .query_all(Some(container), &self.markers.matching_term)
            .await?;
        let definitions = page
            .query_all(Some(container), &self.markers.matching_definition)
            .await?;

        for (i, pair) in matches.iter().enumerate() {
            let term = terms.get(i).copied().ok_or_else(|| {
                FillError::missing_control(no, format!("{} #{}", self.markers.matching_term, i + 1))
            })?;
            let definition = definitions.get(i).copied().ok_or_else(|| {
                FillError::missing_control(
                    no,
                    format!("{} #{}", self.markers.matching_definition, i + 1),
                )
            })?;

            let from = self.center_of(page, term, &self.markers.matching_term, no).await?;
            let to = self
                .center_of(page, definition, &self.markers.matching_definition, no)
                .await?;

            page.mouse_move(from).await?;
            page.mouse_down(from).await?;
            page.mouse_move(to).await?;
            page.mouse_up(to).await?;
            debug!("[题目 {}] 连线: {} → {}", no, pair.term, pair.definition);
        }

        Ok(matches.len())
    }

    async fn center_of(
        &self,
        page: &dyn QuizPage,
        node: NodeHandle,
        control: &str,
        no: usize,
    ) -> Result<Point, FillError> {
        page.bounding_box(node)
            .await?
            .map(|b| b.center())
            .ok_or_else(|| FillError::MissingPosition {
                question: no,
                control: control.to_string(),
            })
    }

    async fn fill_dropdown(
        &self,
        page: &dyn QuizPage,
        question: &QuestionModel,
        options: &[String],
        choice: Option<usize>,
        no: usize,
    ) -> Result<bool, FillError> {
        let Some(answer) = choice.and_then(|i| options.get(i)) else {
            return Ok(false);
        };
        let select = question
            .source
            .ok_or(FillError::MissingSource { question: no })?;

        if !page.select_option(select, answer).await? {
            return Err(FillError::OptionNotFound {
                question: no,
                answer: answer.clone(),
            });
        }
        debug!("[题目 {}] 下拉框已选择: {}", no, answer);
        Ok(true)
    }

    /// 点击提交，再点确认框里的确认按钮
    pub async fn submit(&self, page: &dyn QuizPage) -> Result<SubmitOutcome, FillError> {
        let submit = page
            .query(None, &self.markers.submit)
            .await?
            .ok_or_else(|| FillError::MissingSubmit {
                selector: self.markers.submit.clone(),
            })?;
        page.click(submit).await?;
        info!("📤 已点击提交");

        let confirmation = match page
            .wait_for(&self.markers.confirmation, self.wait_timeout)
            .await
        {
            Ok(node) => node,
            Err(e) => {
                warn!("⚠️ 没有等到提交确认框: {}", e);
                return Ok(SubmitOutcome::Unconfirmed);
            }
        };

        match page
            .query(Some(confirmation), &self.markers.confirm_button)
            .await?
        {
            Some(button) => {
                page.click(button).await?;
                info!("✅ 已确认提交");
                Ok(SubmitOutcome::Confirmed)
            }
            None => {
                warn!("⚠️ 确认框里没有确认按钮");
                Ok(SubmitOutcome::Unconfirmed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{PageAction, StaticPage};
    use crate::models::AnswerStatus;
    use crate::services::Extractor;

    fn filler() -> AutoFiller {
        AutoFiller::new(Markers::default(), Duration::from_millis(10))
    }

    fn ok(index: usize, text: &str) -> AnswerOutcome {
        AnswerOutcome::new(
            index,
            AnswerStatus::Ok {
                answer_text: text.to_string(),
            },
        )
    }

    const MC_PAGE: &str = r#"
        <div class="question multiple_choice_question">
          <div class="question_text">2+2=?</div>
          <div class="answer"><input type="radio" id="a"> A </div>
          <div class="answer"><input type="radio" id="b"> B </div>
          <div class="answer"><input type="radio" id="c"> C </div>
        </div>
        <button type="submit">Submit</button>"#;

    #[test]
    fn test_choices_match_exact_then_loose() {
        let questions = vec![
            QuestionModel::multiple_choice("q1", vec!["Paris".into(), "Rome".into()]),
            QuestionModel::multiple_choice("q2", vec!["New  York".into(), "Boston".into()]),
            QuestionModel::multiple_choice("q3", vec!["x".into()]),
            QuestionModel::matching("q4", vec![MatchPair::new("a", "b")]),
        ];
        let outcomes = vec![
            ok(0, "Rome"),
            ok(1, "new york"),
            ok(2, "y"),
            ok(3, "a"),
        ];
        let choices = AnswerChoices::from_outcomes(&questions, &outcomes).unwrap();
        assert_eq!(choices.get(0), Some(1));
        assert_eq!(choices.get(1), Some(0));
        assert_eq!(choices.get(2), None);
        assert_eq!(choices.get(3), None);
        assert_eq!(choices.len(), 2);
    }

    #[tokio::test]
    async fn test_multiple_choice_clicks_chosen_radio() {
        let page = StaticPage::new(MC_PAGE);
        let questions = Extractor::new(Markers::default()).extract(&page).await;
        let choices = AnswerChoices::from_outcomes(&questions, &[ok(0, "B")]).unwrap();

        let report = filler()
            .fill(&page, &questions, &choices, SelectionPolicy::Supplied)
            .await
            .unwrap();
        assert_eq!(report.filled, vec![0]);

        let radio_b = page.query(None, "#b").await.unwrap().unwrap();
        assert_eq!(page.actions(), vec![PageAction::Click(radio_b)]);
    }

    #[tokio::test]
    async fn test_supplied_policy_skips_unanswered() {
        let page = StaticPage::new(MC_PAGE);
        let questions = Extractor::new(Markers::default()).extract(&page).await;

        let report = filler()
            .fill(&page, &questions, &AnswerChoices::new(), SelectionPolicy::Supplied)
            .await
            .unwrap();
        assert_eq!(report.skipped, vec![0]);
        assert!(page.actions().is_empty());
    }

    #[tokio::test]
    async fn test_first_available_clicks_first_radio() {
        let page = StaticPage::new(MC_PAGE);
        let questions = Extractor::new(Markers::default()).extract(&page).await;

        filler()
            .fill(&page, &questions, &AnswerChoices::new(), SelectionPolicy::FirstAvailable)
            .await
            .unwrap();
        let radio_a = page.query(None, "#a").await.unwrap().unwrap();
        assert_eq!(page.actions(), vec![PageAction::Click(radio_a)]);
    }

    #[tokio::test]
    async fn test_multiple_choice_without_options_is_fatal() {
        let page = StaticPage::new(r#"<div class="question multiple_choice_question"></div>"#);
        let questions = Extractor::new(Markers::default()).extract(&page).await;
        let err = filler()
            .fill(&page, &questions, &AnswerChoices::new(), SelectionPolicy::FirstAvailable)
            .await
            .unwrap_err();
        assert!(matches!(err, FillError::NoOptions { question: 1 }));
    }

    #[tokio::test]
    async fn test_matching_drags_each_pair() {
        let page = StaticPage::new(
            r#"<div class="question matching_question">
                 <div class="matching_term">Dog</div><div class="matching_term">Cat</div>
                 <div class="matching_definition">Canine</div><div class="matching_definition">Feline</div>
               </div>"#,
        );
        let questions = Extractor::new(Markers::default()).extract(&page).await;
        let report = filler()
            .fill(&page, &questions, &AnswerChoices::new(), SelectionPolicy::Supplied)
            .await
            .unwrap();
        assert_eq!(report.drags, 2);

        let actions = page.actions();
        assert_eq!(actions.len(), 8);
        assert!(matches!(actions[1], PageAction::MouseDown(_)));
        assert!(matches!(actions[3], PageAction::MouseUp(_)));
    }

    #[tokio::test]
    async fn test_matching_missing_term_stops_before_further_pairs() {
        let page = StaticPage::new(
            r#"<div class="question matching_question">
                 <div class="matching_term">Dog</div>
                 <div class="matching_definition">Canine</div><div class="matching_definition">Feline</div>
                 <div class="matching_definition">Bovine</div>
               </div>"#,
        );
        let container = page.query(None, ".question").await.unwrap().unwrap();
        let questions = vec![QuestionModel::matching(
            "",
            vec![
                MatchPair::new("Dog", "Canine"),
                MatchPair::new("Cat", "Feline"),
                MatchPair::new("Cow", "Bovine"),
            ],
        )
        .with_source(container)];

        let err = filler()
            .fill(&page, &questions, &AnswerChoices::new(), SelectionPolicy::Supplied)
            .await
            .unwrap_err();
        assert!(matches!(err, FillError::MissingControl { question: 1, .. }));
        // 只完成了第一对
        assert_eq!(page.actions().len(), 4);
    }

    #[tokio::test]
    async fn test_matching_hidden_control_has_no_position() {
        let page = StaticPage::new(
            r#"<div class="question matching_question">
                 <div class="matching_term" style="display: none">Dog</div>
                 <div class="matching_definition">Canine</div>
               </div>"#,
        );
        let questions = Extractor::new(Markers::default()).extract(&page).await;
        let err = filler()
            .fill(&page, &questions, &AnswerChoices::new(), SelectionPolicy::Supplied)
            .await
            .unwrap_err();
        assert!(matches!(err, FillError::MissingPosition { .. }));
        assert!(page.actions().is_empty());
    }

    #[tokio::test]
    async fn test_dropdown_selects_chosen_option() {
        let page = StaticPage::new(
            r#"<div class="question">
                 <select id="s"><option>red</option><option>blue</option></select>
               </div>"#,
        );
        let questions = Extractor::new(Markers::default()).extract(&page).await;
        let choices = AnswerChoices::from_outcomes(&questions, &[ok(0, "Blue")]).unwrap();

        filler()
            .fill(&page, &questions, &choices, SelectionPolicy::Supplied)
            .await
            .unwrap();
        let select = page.query(None, "#s").await.unwrap().unwrap();
        assert_eq!(
            page.actions(),
            vec![PageAction::Select {
                node: select,
                option: "blue".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_submit_without_confirmation_is_unconfirmed() {
        let page = StaticPage::new(MC_PAGE);
        let outcome = filler().submit(&page).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Unconfirmed);
        assert_eq!(page.actions().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_clicks_confirm_button() {
        let page = StaticPage::new(
            r#"<form><button type="submit">Submit</button></form>
               <div class="quiz-submission-confirmation">
                 <button type="submit" id="confirm">Yes</button>
               </div>"#,
        );
        let outcome = filler().submit(&page).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Confirmed);

        let confirm = page.query(None, "#confirm").await.unwrap().unwrap();
        assert_eq!(page.actions().last(), Some(&PageAction::Click(confirm)));
    }

    #[tokio::test]
    async fn test_submit_missing_button_is_fatal() {
        let page = StaticPage::new("<div></div>");
        let err = filler().submit(&page).await.unwrap_err();
        assert!(matches!(err, FillError::MissingSubmit { .. }));
    }
}
