//! 取答案编排器 - 编排层
//!
//! ## 职责
//!
//! 1. **逐题派发**：每道题生成一个 `AnswerRequest`，交给答案来源
//! 2. **失败隔离**：单题失败只体现在它自己的 `AnswerOutcome` 里
//! 3. **保持顺序**：无论完成先后，结果按提取顺序返回
//! 4. **限制并发**：同时在途的请求不超过 `concurrency`

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::models::{AnswerOutcome, AnswerRequest, AnswerStatus, QuestionModel};
use crate::orchestrator::outcome_board::OutcomeBoard;
use crate::services::AnswerSource;
use crate::utils::logging::truncate_text;

/// 取答案编排器
pub struct AnswerOrchestrator {
    source: Arc<dyn AnswerSource>,
    concurrency: usize,
}

impl AnswerOrchestrator {
    /// # 参数
    /// - `source`: 答案来源
    /// - `concurrency`: 同时在途的请求数，0 按 1 处理
    pub fn new(source: Arc<dyn AnswerSource>, concurrency: usize) -> Self {
        Self {
            source,
            concurrency: concurrency.max(1),
        }
    }

    /// 为每道题取答案，返回与输入等长、同序的结果
    pub async fn run(&self, questions: &[QuestionModel]) -> Vec<AnswerOutcome> {
        info!(
            "🔎 开始取答案: {} 道题，并发 {}",
            questions.len(),
            self.concurrency
        );

        stream::iter(questions.iter().enumerate())
            .map(|(index, question)| self.answer_one(index, question))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    /// 取答案并发布到看板，替换上一轮的结果
    pub async fn run_into(&self, questions: &[QuestionModel], board: &mut OutcomeBoard) {
        let outcomes = self.run(questions).await;
        board.publish(outcomes);
    }

    /// 单独问一道只有题干的题
    pub async fn ask(&self, stem: &str) -> AnswerOutcome {
        let request = AnswerRequest::new(stem.trim(), Vec::new());
        let status = self.source.get_answer(&request).await;
        log_status(0, &status);
        AnswerOutcome::new(0, status)
    }

    async fn answer_one(&self, index: usize, question: &QuestionModel) -> AnswerOutcome {
        let request = AnswerRequest::from(question);
        let status = self.source.get_answer(&request).await;
        log_status(index, &status);
        AnswerOutcome::new(index, status)
    }
}

fn log_status(index: usize, status: &AnswerStatus) {
    let no = index + 1;
    match status {
        AnswerStatus::Ok { answer_text } => {
            info!("[题目 {}] ✓ 答案: {}", no, truncate_text(answer_text, 60))
        }
        AnswerStatus::HttpError { code } => warn!("[题目 {}] ❌ 答案服务返回 HTTP {}", no, code),
        AnswerStatus::NetworkError { message } => {
            warn!("[题目 {}] ❌ 网络错误: {}", no, message)
        }
        AnswerStatus::Empty => info!("[题目 {}] ⚠️ 没有答案", no),
    }
}
