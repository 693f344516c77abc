/// 题目后端 HTTP 客户端
///
/// 封装拉取/提交两个接口的 HTTP 调用
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::clients::api::ProblemApi;
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::{ProblemSource, SubmissionItem, SubmitAck};

/// 凭证请求头
const API_KEY_HEADER: &str = "x-api-key";

/// 题目后端 HTTP 客户端
pub struct HttpProblemApi {
    client: Client,
    base_url: String,
}

impl HttpProblemApi {
    /// 创建新的 HTTP 客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// 检查响应状态并解析 JSON
    async fn parse_response<T: DeserializeOwned>(endpoint: &str, response: Response) -> AppResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;

        if !status.is_success() {
            let message = extract_message(&body);
            warn!("API 返回错误 ({}): status={}, message={:?}", endpoint, status, message);

            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(AppError::unauthorized(
                    message.unwrap_or_else(|| "Invalid API Key".to_string()),
                ));
            }

            return Err(ApiError::BadResponse {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                message,
            }
            .into());
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ProblemApi for HttpProblemApi {
    async fn fetch_problems(&self, api_key: &str) -> AppResult<Vec<ProblemSource>> {
        let endpoint = self.endpoint("problems");
        debug!("拉取题目: {}", endpoint);

        let response = self
            .client
            .get(&endpoint)
            .header(API_KEY_HEADER, api_key)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint.as_str(), e))?;

        let problems: Vec<ProblemSource> = Self::parse_response(&endpoint, response).await?;
        debug!("拉取到 {} 道题目", problems.len());

        Ok(problems)
    }

    async fn submit_batch(&self, api_key: &str, items: &[SubmissionItem]) -> AppResult<SubmitAck> {
        let endpoint = self.endpoint("submit");
        debug!("提交 {} 条结果: {}", items.len(), endpoint);

        let response = self
            .client
            .post(&endpoint)
            .header(API_KEY_HEADER, api_key)
            .json(items)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint.as_str(), e))?;

        let ack: SubmitAck = Self::parse_response(&endpoint, response).await?;
        if !ack.success {
            return Err(ApiError::BadResponse {
                endpoint,
                status: 200,
                message: Some(ack.message),
            }
            .into());
        }

        Ok(ack)
    }
}

/// 从错误响应体中提取 message 字段，不是 JSON 时使用原文
fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(json) => json
            .get("message")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        Err(_) => Some(trimmed.to_string()),
    }
}
