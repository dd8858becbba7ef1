//! 答案面板
//!
//! 把题目和看板上的结果渲染成纯文本或 JSON，只读不写。

use serde::Serialize;

use crate::models::{AnswerOutcome, AnswerStatus, QuestionModel};
use crate::orchestrator::OutcomeBoard;

/// 单道题的结果行
pub fn outcome_line(outcome: Option<&AnswerOutcome>) -> String {
    match outcome.map(|o| &o.status) {
        None => "Fetching answer...".to_string(),
        Some(AnswerStatus::Ok { answer_text }) => format!("Answer: {}", answer_text),
        Some(AnswerStatus::HttpError { code }) => {
            format!("Error: Could not get answer ({})", code)
        }
        Some(AnswerStatus::NetworkError { .. }) => "Network error fetching answer.".to_string(),
        Some(AnswerStatus::Empty) => "No answer found.".to_string(),
    }
}

/// 文本面板
pub fn render_panel(questions: &[QuestionModel], board: &OutcomeBoard) -> String {
    let mut out = String::new();
    for (idx, question) in questions.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        out.push_str(&format!("Q{}: {}\n", idx + 1, question.stem));

        if let Some(options) = question.options() {
            for option in options {
                out.push_str(&format!("  • {}\n", option));
            }
        }
        if let Some(matches) = question.matches() {
            for pair in matches {
                out.push_str(&format!("  • {} → {}\n", pair.term, pair.definition));
            }
        }
        if let Some(known) = question.known_answer() {
            out.push_str(&format!("  Scraped answer: {}\n", known));
        }

        out.push_str(&format!("  {}\n", outcome_line(board.get(idx))));
    }
    out
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PanelEntry<'a> {
    index: usize,
    #[serde(flatten)]
    question: &'a QuestionModel,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<&'a AnswerStatus>,
}

#[derive(Serialize)]
struct PanelDocument<'a> {
    generation: u64,
    questions: Vec<PanelEntry<'a>>,
}

/// JSON 输出，字段与文本面板一致
pub fn render_json(questions: &[QuestionModel], board: &OutcomeBoard) -> serde_json::Result<String> {
    let document = PanelDocument {
        generation: board.generation(),
        questions: questions
            .iter()
            .enumerate()
            .map(|(index, question)| PanelEntry {
                index,
                question,
                outcome: board.get(index).map(|o| &o.status),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&document)
}
