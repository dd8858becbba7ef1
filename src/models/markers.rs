//! 页面结构标记
//!
//! 识别题目和定位控件用到的 CSS 选择器 / class 名，默认值对应 Canvas 测验页面。

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markers {
    /// 题目容器
    pub question: String,
    /// 选择题容器上的 class
    pub multiple_choice_class: String,
    /// 连线题容器上的 class
    pub matching_class: String,
    /// 题干
    pub question_text: String,
    /// 选择题选项
    pub answer: String,
    /// 选项里的单选控件
    pub radio: String,
    /// 连线题左侧
    pub matching_term: String,
    /// 连线题右侧
    pub matching_definition: String,
    /// 下拉框
    pub dropdown: String,
    /// 下拉框选项
    pub dropdown_option: String,
    /// 下拉题所在区域，用来找 `correct_answer`
    pub question_content: String,
    /// 复习页上给出的正确答案
    pub correct_answer: String,
    /// 提交按钮
    pub submit: String,
    /// 提交后的确认框
    pub confirmation: String,
    /// 确认框里的确认按钮
    pub confirm_button: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            question: ".question".to_string(),
            multiple_choice_class: "multiple_choice_question".to_string(),
            matching_class: "matching_question".to_string(),
            question_text: ".question_text".to_string(),
            answer: ".answer".to_string(),
            radio: "input[type=\"radio\"]".to_string(),
            matching_term: ".matching_term".to_string(),
            matching_definition: ".matching_definition".to_string(),
            dropdown: "select".to_string(),
            dropdown_option: "option".to_string(),
            question_content: ".question_content".to_string(),
            correct_answer: ".correct_answer".to_string(),
            submit: "button[type=\"submit\"]".to_string(),
            confirmation: ".quiz-submission-confirmation".to_string(),
            confirm_button: "button[type=\"submit\"]".to_string(),
        }
    }
}

impl Markers {
    /// 与下拉框 id 关联的 label
    pub fn label_for(&self, id: &str) -> String {
        format!("label[for=\"{}\"]", id.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let markers: Markers = toml::from_str("question = \".quiz-item\"").unwrap();
        assert_eq!(markers.question, ".quiz-item");
        assert_eq!(markers.answer, ".answer");
    }

    #[test]
    fn test_label_for_escapes_quotes() {
        let markers = Markers::default();
        assert_eq!(markers.label_for("q_1"), "label[for=\"q_1\"]");
        assert_eq!(markers.label_for("a\"b"), "label[for=\"a\\\"b\"]");
    }
}
