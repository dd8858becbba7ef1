//! # Quiz Helper
//!
//! 从 Canvas 测验页面提取题目、向答案服务获取答案、自动填写并提交
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page / 页面文档），只暴露页面能力
//! - `QuizPage` - 页面能力接口：查找、读取、点击、拖拽、等待
//! - `ChromePage` - 基于 `JsExecutor` 的真实浏览器实现
//! - `StaticPage` - 基于 `scraper` 的静态 HTML 实现（离线 / 测试）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个题目或单个请求
//! - `Extractor` - 题目提取（可插拔的 `QuestionClassifier`）
//! - `HttpAnswerClient` / `LlmAnswerSource` - 取答案能力
//! - `AutoFiller` - 填写和提交能力
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/` - 把一批题目变成一批答案结果
//! - `AnswerOrchestrator` - 逐题派发、失败隔离、保持顺序
//! - `OutcomeBoard` - 最近一轮结果，整体替换
//!
//! ### ④ 流程层（Workflow）
//! - `workflow/` - 定义"一份测验"的完整处理流程
//! - `QuizFlow` - 提取 → 取答案 → 渲染 → 填写 → 提交
//!
//! 外围：`browser/`（会话）、`presentation/`（面板）、`cli`、`config`。
//!
//! ## 模块结构

pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod presentation;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::CanvasSession;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{ChromePage, QuizPage, StaticPage};
pub use models::{AnswerOutcome, AnswerRequest, AnswerStatus, QuestionKind, QuestionModel};
pub use orchestrator::{AnswerOrchestrator, OutcomeBoard};
pub use services::{AnswerSource, AutoFiller, Extractor, HttpAnswerClient};
pub use workflow::{FlowOptions, QuizFlow, QuizRunSummary};
