//! 测验处理流程 - 流程层
//!
//! 核心职责：定义"一份测验"的完整处理流程
//!
//! 流程顺序：
//! 1. 提取题目
//! 2. 取答案并发布到看板
//! 3. 渲染面板
//! 4. 自动填写
//! 5. 提交
//!
//! 页面先被提取器读取，再被自动填写修改，两步严格先后执行。

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use crate::config::{AnswerBackend, Config};
use crate::error::AppError;
use crate::infrastructure::QuizPage;
use crate::models::{AnswerStatus, QuestionKind, QuestionModel};
use crate::orchestrator::{AnswerOrchestrator, OutcomeBoard};
use crate::presentation::{render_json, render_panel};
use crate::services::{
    AnswerChoices, AnswerSource, AutoFiller, Extractor, FillReport, HttpAnswerClient,
    LlmAnswerSource, SelectionPolicy, SubmitOutcome,
};
use crate::utils::logging::{log_questions_found, log_run_complete};

/// 按配置创建答案来源
pub fn answer_source(config: &Config) -> Result<Arc<dyn AnswerSource>> {
    Ok(match config.answer_backend {
        AnswerBackend::Http => Arc::new(HttpAnswerClient::from_config(config)?),
        AnswerBackend::Llm => Arc::new(LlmAnswerSource::new(config)),
    })
}

/// 流程开关
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowOptions {
    /// 是否取答案
    pub fetch_answers: bool,
    /// 是否自动填写
    pub fill: bool,
    /// 填写后是否提交（不填写时不提交）
    pub submit: bool,
    pub policy: SelectionPolicy,
    /// 面板输出 JSON
    pub json: bool,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            fetch_answers: true,
            fill: true,
            submit: true,
            policy: SelectionPolicy::Supplied,
            json: false,
        }
    }
}

/// 一次运行的汇总
#[derive(Debug, Clone)]
pub struct QuizRunSummary {
    pub questions: Vec<QuestionModel>,
    /// 渲染好的面板（文本或 JSON）
    pub rendered: String,
    pub answered: usize,
    pub failed: usize,
    pub fill: Option<FillReport>,
    pub submit: Option<SubmitOutcome>,
}

/// 测验处理流程
///
/// - 编排 提取 → 取答案 → 填写 → 提交
/// - 不持有页面资源，只借用
/// - 持有看板，重复运行时整体替换结果
pub struct QuizFlow {
    extractor: Extractor,
    orchestrator: AnswerOrchestrator,
    filler: AutoFiller,
    board: OutcomeBoard,
}

impl QuizFlow {
    pub fn new(config: &Config, source: Arc<dyn AnswerSource>) -> Self {
        Self {
            extractor: Extractor::new(config.markers.clone()),
            orchestrator: AnswerOrchestrator::new(source, config.answer_concurrency),
            filler: AutoFiller::new(
                config.markers.clone(),
                Duration::from_millis(config.wait_timeout_ms),
            ),
            board: OutcomeBoard::new(),
        }
    }

    pub fn board(&self) -> &OutcomeBoard {
        &self.board
    }

    pub async fn run(&mut self, page: &dyn QuizPage, options: &FlowOptions) -> Result<QuizRunSummary> {
        // 1. 提取
        let questions = self.extractor.extract(page).await;
        let by_kind: Vec<(String, usize)> = [
            QuestionKind::MultipleChoice,
            QuestionKind::Matching,
            QuestionKind::Dropdown,
        ]
        .into_iter()
        .map(|kind| {
            let count = questions.iter().filter(|q| q.kind() == kind).count();
            (kind.to_string(), count)
        })
        .collect();
        log_questions_found(questions.len(), &by_kind);

        // 2. 取答案
        if options.fetch_answers {
            self.orchestrator.run_into(&questions, &mut self.board).await;
        } else {
            // 上一轮的结果属于别的题目，不能带到这次
            self.board.clear();
            info!("⏭️ 跳过取答案");
        }

        let answered = self.board.answered();
        let failed = self
            .board
            .outcomes()
            .iter()
            .filter(|o| {
                matches!(
                    o.status,
                    AnswerStatus::HttpError { .. } | AnswerStatus::NetworkError { .. }
                )
            })
            .count();

        // 3. 渲染
        let rendered = if options.json {
            render_json(&questions, &self.board)?
        } else {
            render_panel(&questions, &self.board)
        };

        // 4. 填写
        let fill = if options.fill {
            let choices = AnswerChoices::from_outcomes(&questions, self.board.outcomes())?;
            let report = self
                .filler
                .fill(page, &questions, &choices, options.policy)
                .await
                .map_err(AppError::from)?;
            Some(report)
        } else {
            info!("⏭️ 跳过自动填写");
            None
        };

        // 5. 提交
        let submit = if fill.is_some() && options.submit {
            Some(self.filler.submit(page).await.map_err(AppError::from)?)
        } else {
            None
        };

        log_run_complete(answered, failed, questions.len());

        Ok(QuizRunSummary {
            questions,
            rendered,
            answered,
            failed,
            fill,
            submit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{PageAction, StaticPage};
    use crate::models::AnswerRequest;
    use async_trait::async_trait;

    /// 永远回答 "B"
    struct AlwaysB;

    #[async_trait]
    impl AnswerSource for AlwaysB {
        async fn fetch(&self, _request: &AnswerRequest) -> AnswerStatus {
            AnswerStatus::Ok {
                answer_text: "B".into(),
            }
        }
    }

    const PAGE: &str = r#"
        <form>
          <div class="question multiple_choice_question">
            <div class="question_text">2+2=?</div>
            <div class="answer"><input type="radio" id="ra"> A </div>
            <div class="answer"><input type="radio" id="rb"> B </div>
          </div>
          <button type="submit" id="go">Submit</button>
        </form>"#;

    fn flow() -> QuizFlow {
        QuizFlow::new(&Config::default(), Arc::new(AlwaysB))
    }

    #[tokio::test]
    async fn test_full_run_fills_and_submits() {
        let page = StaticPage::new(PAGE);
        let summary = flow().run(&page, &FlowOptions::default()).await.unwrap();

        assert_eq!(summary.questions.len(), 1);
        assert_eq!(summary.answered, 1);
        assert!(summary.rendered.contains("Answer: B"));
        assert_eq!(summary.fill.unwrap().filled, vec![0]);
        assert_eq!(summary.submit, Some(SubmitOutcome::Unconfirmed));

        let rb = page.query(None, "#rb").await.unwrap().unwrap();
        let go = page.query(None, "#go").await.unwrap().unwrap();
        assert_eq!(
            page.actions(),
            vec![PageAction::Click(rb), PageAction::Click(go)]
        );
    }

    #[tokio::test]
    async fn test_no_answers_no_fill_is_read_only() {
        let page = StaticPage::new(PAGE);
        let options = FlowOptions {
            fetch_answers: false,
            fill: false,
            ..FlowOptions::default()
        };
        let mut flow = flow();
        let summary = flow.run(&page, &options).await.unwrap();

        assert!(summary.rendered.contains("Fetching answer..."));
        assert!(summary.fill.is_none());
        assert!(summary.submit.is_none());
        assert!(page.actions().is_empty());
        assert_eq!(flow.board().generation(), 0);
    }

    #[tokio::test]
    async fn test_rerun_keeps_board_size() {
        let page = StaticPage::new(PAGE);
        let options = FlowOptions {
            fill: false,
            json: true,
            ..FlowOptions::default()
        };
        let mut flow = flow();
        flow.run(&page, &options).await.unwrap();
        let summary = flow.run(&page, &options).await.unwrap();

        assert_eq!(flow.board().len(), 1);
        assert_eq!(flow.board().generation(), 2);
        let json: serde_json::Value = serde_json::from_str(&summary.rendered).unwrap();
        assert_eq!(json["questions"][0]["outcome"]["answerText"], "B");
    }

    #[tokio::test]
    async fn test_skipped_fetch_forgets_previous_page() {
        let mut flow = flow();
        let first = StaticPage::new(PAGE);
        let fetch_only = FlowOptions {
            fill: false,
            ..FlowOptions::default()
        };
        flow.run(&first, &fetch_only).await.unwrap();
        assert_eq!(flow.board().answered(), 1);

        let other = StaticPage::new(
            r#"<div class="question multiple_choice_question">
                 <div class="question_text">other quiz</div>
                 <div class="answer"><input type="radio"> A </div>
                 <div class="answer"><input type="radio"> B </div>
               </div>"#,
        );
        let options = FlowOptions {
            fetch_answers: false,
            submit: false,
            ..FlowOptions::default()
        };
        let summary = flow.run(&other, &options).await.unwrap();

        assert!(flow.board().is_empty());
        assert_eq!(summary.answered, 0);
        assert!(!summary.rendered.contains("Answer: B"));
        assert!(summary.rendered.contains("Fetching answer..."));
        assert_eq!(summary.fill.unwrap().skipped, vec![0]);
        assert!(other.actions().is_empty());
    }
}
