//! LLM 答案来源 - 业务能力层
//!
//! 不经过答案服务，直接调用 OpenAI 兼容的 Chat Completion 接口回答题目。
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{AnswerRequest, AnswerStatus};
use crate::services::answer_client::AnswerSource;

/// 只允许从选项里挑答案，不要解释
const SYSTEM_PROMPT: &str = "You are a helpful assistant designed to answer quiz questions accurately. \
If options are provided, select the correct answer ONLY from those options. \
Provide ONLY the answer without any extra explanation or punctuation unless it is part of the answer.";

const MAX_TOKENS: u32 = 100;

/// 上游失败时按答案服务的约定记作 500
const PROVIDER_FAILURE_CODE: u16 = 500;

/// LLM 答案来源
///
/// 职责：
/// - 把一道题拼成提示词
/// - 调用 LLM，失败折叠成 `AnswerStatus`
/// - 不关心题目顺序，不重试
pub struct LlmAnswerSource {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl LlmAnswerSource {
    /// 创建新的 LLM 答案来源
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
        }
    }

    /// 调用 LLM
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（已 trim，可能为空串）
    async fn send_to_llm(&self, user_message: &str) -> Result<String, OpenAIError> {
        debug!("调用 LLM API，模型: {}", self.model_name);

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(SYSTEM_PROMPT)
            .build()?;
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![
                ChatCompletionRequestMessage::System(system_msg),
                ChatCompletionRequestMessage::User(user_msg),
            ])
            .max_tokens(MAX_TOKENS)
            .build()?;

        let response = self.client.chat().create(request).await?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();

        Ok(content.trim().to_string())
    }
}

/// 拼出用户消息
pub(crate) fn build_user_message(request: &AnswerRequest) -> String {
    let mut message = format!("Question: {}\n\n", request.stem);
    if request.options.is_empty() {
        message.push_str("Provide the correct answer.");
    } else {
        message.push_str("Options:\n");
        for option in &request.options {
            message.push_str(&format!("- {}\n", option));
        }
        message.push_str("\nPlease choose the correct answer from the options provided.");
    }
    message
}

#[async_trait]
impl AnswerSource for LlmAnswerSource {
    async fn fetch(&self, request: &AnswerRequest) -> AnswerStatus {
        let user_message = build_user_message(request);

        match self.send_to_llm(&user_message).await {
            Ok(answer) if !answer.is_empty() => AnswerStatus::Ok {
                answer_text: answer,
            },
            Ok(_) => {
                warn!("LLM 返回内容为空");
                AnswerStatus::HttpError {
                    code: PROVIDER_FAILURE_CODE,
                }
            }
            Err(OpenAIError::Reqwest(e)) => {
                warn!("LLM API 网络错误: {}", e);
                AnswerStatus::NetworkError {
                    message: e.to_string(),
                }
            }
            Err(e) => {
                warn!("LLM API 调用失败: {}", e);
                AnswerStatus::HttpError {
                    code: PROVIDER_FAILURE_CODE,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_lists_options() {
        let request = AnswerRequest::new("2+2=?", vec!["3".into(), "4".into()]);
        let message = build_user_message(&request);
        assert!(message.starts_with("Question: 2+2=?\n\nOptions:\n- 3\n- 4\n"));
        assert!(message.ends_with("from the options provided."));
    }

    #[test]
    fn test_user_message_without_options() {
        let request = AnswerRequest::new("Name a primary colour", vec![]);
        let message = build_user_message(&request);
        assert!(message.ends_with("Provide the correct answer."));
        assert!(!message.contains("Options:"));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_network_error() {
        let config = Config {
            llm_api_key: "test-key".to_string(),
            llm_api_base_url: "http://127.0.0.1:9/v1".to_string(),
            ..Config::default()
        };
        let source = LlmAnswerSource::new(&config);
        let status = source
            .get_answer(&AnswerRequest::new("2+2=?", vec!["4".into()]))
            .await;
        assert!(matches!(status, AnswerStatus::NetworkError { .. }));
    }

    /// 需要真实的 LLM_API_KEY
    #[tokio::test]
    #[ignore]
    async fn test_real_provider_answers() {
        let _ = tracing_subscriber::fmt::try_init();
        let source = LlmAnswerSource::new(&Config::from_env().unwrap());
        let status = source
            .get_answer(&AnswerRequest::new(
                "What is 2+2?",
                vec!["3".into(), "4".into(), "5".into()],
            ))
            .await;
        println!("LLM 结果: {:?}", status);
        assert!(status.is_ok());
    }
}
