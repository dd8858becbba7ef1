//! 业务能力层（Services）
//!
//! 每个服务只描述"我能做什么"：提取题目、取答案、填写页面。
//! 不关心流程顺序，也不持有浏览器。

pub mod answer_client;
pub mod auto_filler;
pub mod classifier;
pub mod extractor;
pub mod llm_answer;

pub use answer_client::{AnswerSource, HttpAnswerClient};
pub use auto_filler::{AnswerChoices, AutoFiller, FillReport, SelectionPolicy, SubmitOutcome};
pub use classifier::{MatchingClassifier, MultipleChoiceClassifier, QuestionClassifier};
pub use extractor::Extractor;
pub use llm_answer::LlmAnswerSource;
