use serde::{Deserialize, Serialize};

use crate::infrastructure::NodeHandle;

/// 题目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// 选择题
    MultipleChoice,
    /// 连线题
    Matching,
    /// 下拉题
    Dropdown,
}

impl std::fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            QuestionKind::MultipleChoice => "选择题",
            QuestionKind::Matching => "连线题",
            QuestionKind::Dropdown => "下拉题",
        };
        write!(f, "{}", name)
    }
}

/// 连线题的一组配对
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPair {
    pub term: String,
    pub definition: String,
}

impl MatchPair {
    pub fn new(term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            definition: definition.into(),
        }
    }
}

/// 题目主体
///
/// 选项和配对互斥：选择题/下拉题只有 `options`，连线题只有 `matches`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionBody {
    MultipleChoice {
        options: Vec<String>,
    },
    Matching {
        matches: Vec<MatchPair>,
    },
    Dropdown {
        options: Vec<String>,
        /// 复习页面上 `.correct_answer` 给出的答案，仅用于展示
        #[serde(default, skip_serializing_if = "Option::is_none")]
        known_answer: Option<String>,
    },
}

/// 从页面提取出的一道题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionModel {
    /// 题干，找不到时为空串
    pub stem: String,
    #[serde(flatten)]
    pub body: QuestionBody,
    /// 题目所在的页面元素，只给自动填写用
    #[serde(skip)]
    pub source: Option<NodeHandle>,
}

impl QuestionModel {
    /// 创建选择题
    pub fn multiple_choice(stem: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            stem: stem.into(),
            body: QuestionBody::MultipleChoice { options },
            source: None,
        }
    }

    /// 创建连线题
    pub fn matching(stem: impl Into<String>, matches: Vec<MatchPair>) -> Self {
        Self {
            stem: stem.into(),
            body: QuestionBody::Matching { matches },
            source: None,
        }
    }

    /// 创建下拉题
    pub fn dropdown(stem: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            stem: stem.into(),
            body: QuestionBody::Dropdown {
                options,
                known_answer: None,
            },
            source: None,
        }
    }

    /// 关联页面元素
    pub fn with_source(mut self, source: NodeHandle) -> Self {
        self.source = Some(source);
        self
    }

    /// 附加页面上给出的答案（仅下拉题有效）
    pub fn with_known_answer(mut self, answer: Option<String>) -> Self {
        if let QuestionBody::Dropdown { known_answer, .. } = &mut self.body {
            *known_answer = answer;
        }
        self
    }

    pub fn kind(&self) -> QuestionKind {
        match self.body {
            QuestionBody::MultipleChoice { .. } => QuestionKind::MultipleChoice,
            QuestionBody::Matching { .. } => QuestionKind::Matching,
            QuestionBody::Dropdown { .. } => QuestionKind::Dropdown,
        }
    }

    /// 选项（连线题返回 None）
    pub fn options(&self) -> Option<&[String]> {
        match &self.body {
            QuestionBody::MultipleChoice { options } | QuestionBody::Dropdown { options, .. } => {
                Some(options)
            }
            QuestionBody::Matching { .. } => None,
        }
    }

    /// 配对（非连线题返回 None）
    pub fn matches(&self) -> Option<&[MatchPair]> {
        match &self.body {
            QuestionBody::Matching { matches } => Some(matches),
            _ => None,
        }
    }

    pub fn known_answer(&self) -> Option<&str> {
        match &self.body {
            QuestionBody::Dropdown { known_answer, .. } => known_answer.as_deref(),
            _ => None,
        }
    }
}
