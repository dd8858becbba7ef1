use serde::{Deserialize, Serialize};

use crate::models::question::QuestionModel;

/// 发给答案服务的请求体
///
/// 线上格式：`{ "stem": "...", "options": ["...", ...] }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub stem: String,
    pub options: Vec<String>,
}

impl AnswerRequest {
    pub fn new(stem: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            stem: stem.into(),
            options,
        }
    }

    /// 题干和选项都为空时请求无效，不能发出
    pub fn is_malformed(&self) -> bool {
        self.stem.is_empty() && self.options.is_empty()
    }
}

impl From<&QuestionModel> for AnswerRequest {
    fn from(question: &QuestionModel) -> Self {
        Self {
            stem: question.stem.clone(),
            options: question.options().map(<[String]>::to_vec).unwrap_or_default(),
        }
    }
}

/// 答案服务的成功响应体
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnswerResponse {
    #[serde(default)]
    pub answer: Option<String>,
}

/// 单次取答案的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum AnswerStatus {
    /// 拿到了答案
    Ok {
        #[serde(rename = "answerText")]
        answer_text: String,
    },
    /// 服务返回非 2xx
    HttpError { code: u16 },
    /// 网络层失败（连不上、超时）
    NetworkError { message: String },
    /// 没有答案，或请求在本地就被拒绝
    Empty,
}

impl AnswerStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, AnswerStatus::Ok { .. })
    }

    pub fn answer_text(&self) -> Option<&str> {
        match self {
            AnswerStatus::Ok { answer_text } => Some(answer_text),
            _ => None,
        }
    }

    /// 日志里用的简短标签
    pub fn label(&self) -> &'static str {
        match self {
            AnswerStatus::Ok { .. } => "ok",
            AnswerStatus::HttpError { .. } => "httpError",
            AnswerStatus::NetworkError { .. } => "networkError",
            AnswerStatus::Empty => "empty",
        }
    }
}

/// 一道题的取答案结果，创建后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    /// 题目在提取顺序中的位置（从 0 开始）
    pub question_index: usize,
    #[serde(flatten)]
    pub status: AnswerStatus,
}

impl AnswerOutcome {
    pub fn new(question_index: usize, status: AnswerStatus) -> Self {
        Self {
            question_index,
            status,
        }
    }

    pub fn answer_text(&self) -> Option<&str> {
        self.status.answer_text()
    }
}
