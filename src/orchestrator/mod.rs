//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 把"一批题目"变成"一批答案结果"，是结果状态的唯一写入者。
//!
//! ## 模块划分
//!
//! ### `answer_orchestrator` - 取答案编排器
//! - 逐题派发请求，限制并发
//! - 单题失败互不影响
//! - 结果按提取顺序返回
//!
//! ### `outcome_board` - 答案看板
//! - 保存最近一轮的全部结果
//! - 每轮整体替换，带轮次计数
//!
//! ## 层次关系
//!
//! ```text
//! workflow::QuizFlow (提取 → 取答案 → 填写 → 提交)
//!     ↓
//! answer_orchestrator (处理 Vec<QuestionModel>)
//!     ↓
//! services::AnswerSource (处理单个 AnswerRequest)
//! ```

pub mod answer_orchestrator;
pub mod outcome_board;

pub use answer_orchestrator::AnswerOrchestrator;
pub use outcome_board::OutcomeBoard;
