pub mod quiz_flow;

pub use quiz_flow::{answer_source, FlowOptions, QuizFlow, QuizRunSummary};
