pub mod answer;
pub mod markers;
pub mod question;

pub use answer::{AnswerOutcome, AnswerRequest, AnswerResponse, AnswerStatus};
pub use markers::Markers;
pub use question::{MatchPair, QuestionBody, QuestionKind, QuestionModel};
