//! 展示层
//!
//! 只读取题目和看板，不修改任何状态。

pub mod panel;

pub use panel::{outcome_line, render_json, render_panel};
