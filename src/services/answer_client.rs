//! 答案服务客户端 - 业务能力层
//!
//! 只负责"一道题 → 一个答案状态"，不重试，不关心题目顺序。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{AnswerRequest, AnswerResponse, AnswerStatus};
use crate::utils::logging::truncate_text;

/// 答案来源
///
/// 实现者只需要提供 `fetch`；`get_answer` 负责在本地拦截无效请求，
/// 保证题干和选项都为空的题目不会产生任何网络请求。
#[async_trait]
pub trait AnswerSource: Send + Sync {
    /// 真正发出请求，失败全部折叠进 `AnswerStatus`
    async fn fetch(&self, request: &AnswerRequest) -> AnswerStatus;

    async fn get_answer(&self, request: &AnswerRequest) -> AnswerStatus {
        if request.is_malformed() {
            debug!("题干和选项都为空，不发请求");
            return AnswerStatus::Empty;
        }
        self.fetch(request).await
    }
}

/// 走 HTTP 的答案服务客户端
///
/// `POST <endpoint>`，请求体 `{ "stem": ..., "options": [...] }`，
/// 成功响应 `{ "answer": "..." }`。
pub struct HttpAnswerClient {
    client: Client,
    endpoint: String,
}

impl HttpAnswerClient {
    /// 创建客户端
    ///
    /// # 参数
    /// - `endpoint`: 答案服务地址
    /// - `timeout`: 单次请求的超时时间（连接 + 读取）
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(
            config.answer_endpoint_url.clone(),
            Duration::from_secs(config.answer_timeout_secs),
        )
    }
}

#[async_trait]
impl AnswerSource for HttpAnswerClient {
    async fn fetch(&self, request: &AnswerRequest) -> AnswerStatus {
        debug!(
            "请求答案: {} ({} 个选项)",
            truncate_text(&request.stem, 50),
            request.options.len()
        );

        let response = match self.client.post(&self.endpoint).json(request).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("答案服务网络错误: {}", e);
                return AnswerStatus::NetworkError {
                    message: e.to_string(),
                };
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("答案服务返回 HTTP {}", status.as_u16());
            return AnswerStatus::HttpError {
                code: status.as_u16(),
            };
        }

        // 读取中途断开算网络错误，读完了但解不出来算没有答案
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                warn!("读取答案响应失败: {}", e);
                return AnswerStatus::NetworkError {
                    message: e.to_string(),
                };
            }
        };

        status_from_body(&body)
    }
}

/// 把 2xx 响应体解释成答案状态
pub(crate) fn status_from_body(body: &[u8]) -> AnswerStatus {
    let parsed: AnswerResponse = match serde_json::from_slice(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!("答案响应无法解析: {}", e);
            return AnswerStatus::Empty;
        }
    };

    match parsed.answer.as_deref().map(str::trim) {
        Some(answer) if !answer.is_empty() => AnswerStatus::Ok {
            answer_text: answer.to_string(),
        },
        _ => AnswerStatus::Empty,
    }
}
