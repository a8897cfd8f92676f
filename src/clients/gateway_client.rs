//! 生成网关客户端
//!
//! 封装所有与生成网关的交互：带指数退避的重试、调用超时、
//! 错误分类、响应信封解包
//!
//! ## 调用链
//!
//! `call()` → 超时保护 → `post_with_retry()` → 传输层 → 网关
//!
//! 网关是一个本地代理端点，负责持有上游生成服务的密钥，
//! 客户端永远不接触密钥本身

use crate::clients::transport::{HttpTransport, RawResponse, Transport};
use crate::config::{Config, RetryPolicy};
use crate::error::{ApiError, ApiResult, TransportError};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

// ========== 响应信封 ==========

/// 成功响应信封：{ candidates: [ { content: { parts: [ { text } ] } } ] }
#[derive(Debug, Deserialize)]
struct ResponseEnvelope {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(default)]
    text: String,
}

/// 错误响应体：{ error, details?: { promptFeedback?: { blockReason? } } }
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    details: Option<ErrorDetails>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetails {
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

// ========== 客户端 ==========

/// 生成网关客户端
pub struct GatewayClient<T: Transport = HttpTransport> {
    transport: T,
    endpoint: String,
    retry: RetryPolicy,
    timeout: Duration,
}

impl GatewayClient<HttpTransport> {
    /// 创建使用真实 HTTP 传输的客户端
    pub fn new(config: &Config) -> Self {
        Self::with_transport(HttpTransport::new(), config)
    }
}

impl<T: Transport> GatewayClient<T> {
    /// 创建使用自定义传输的客户端
    pub fn with_transport(transport: T, config: &Config) -> Self {
        Self {
            transport,
            endpoint: config.gateway_url.clone(),
            retry: config.retry.clone(),
            timeout: config.request_timeout(),
        }
    }

    /// 调用生成网关
    ///
    /// # 参数
    /// - `prompt`: 提示词
    /// - `schema`: 期望的响应结构描述（可选）
    ///
    /// # 返回
    /// 返回候选文本解析出的 JSON 值
    ///
    /// 整个调用（含重试等待）受超时保护，超时时间短于部署平台的
    /// 硬超时，保证调用方看到的是明确的超时错误而不是被平台掐断。
    /// 截止时间一到，底层尚未结束的重试/网络错误一律让位于超时错误
    pub async fn call(&self, prompt: &str, schema: Option<&Value>) -> ApiResult<Value> {
        let timeout_ms = self.timeout.as_millis() as u64;
        match tokio::time::timeout(self.timeout, self.call_inner(prompt, schema)).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::Timeout { timeout_ms }),
        }
    }

    async fn call_inner(&self, prompt: &str, schema: Option<&Value>) -> ApiResult<Value> {
        let mut payload = json!({ "prompt": prompt });
        if let Some(schema) = schema {
            payload["schema"] = schema.clone();
        }

        let response = self
            .post_with_retry(&payload)
            .await
            .map_err(|e| ApiError::network(&self.endpoint, e))?;

        if !response.is_success() {
            return Err(self.classify_failure(&response));
        }

        Self::unwrap_envelope(&response)
    }

    /// 带重试的网关调用
    ///
    /// 命中过载状态码或网络失败时按指数退避重试；其他任何响应
    /// （成功或非过载的错误状态）立即返回。重试耗尽后再做最后
    /// 一次无条件尝试，结果不论成败原样返回
    async fn post_with_retry(&self, payload: &Value) -> Result<RawResponse, TransportError> {
        let mut retry_count = 0;
        let mut delay = self.retry.initial_delay();

        while retry_count < self.retry.max_retries {
            match self.transport.post(&self.endpoint, payload).await {
                Ok(response) => {
                    // 不是过载状态，直接返回
                    if response.status != self.retry.transient_status_code {
                        return Ok(response);
                    }
                    retry_count += 1;
                    warn!(
                        "服务过载，第 {}/{} 次重试，等待 {} 毫秒...",
                        retry_count,
                        self.retry.max_retries,
                        delay.as_millis()
                    );
                }
                Err(e) => {
                    // 网络失败同样重试
                    retry_count += 1;
                    warn!(
                        "网络错误 ({})，第 {}/{} 次重试，等待 {} 毫秒...",
                        e,
                        retry_count,
                        self.retry.max_retries,
                        delay.as_millis()
                    );
                }
            }

            sleep(delay).await;
            delay *= 2; // 指数退避
        }

        // 重试耗尽，做最后一次尝试
        self.transport.post(&self.endpoint, payload).await
    }

    /// 对非成功响应做错误分类
    fn classify_failure(&self, response: &RawResponse) -> ApiError {
        debug!("网关错误响应体: {}", response.body);

        // 先按文本读取再尝试解析，响应体不一定是 JSON
        let parsed: ErrorBody = match serde_json::from_str(&response.body) {
            Ok(v) => v,
            Err(_) => {
                return ApiError::EnvelopeParseFailed {
                    status: response.status,
                    body: response.body.clone(),
                }
            }
        };

        // 最后一次尝试仍然过载
        if response.status == self.retry.transient_status_code {
            return ApiError::Overloaded;
        }

        // 上游安全策略拦截
        if let Some(reason) = parsed
            .details
            .and_then(|d| d.prompt_feedback)
            .and_then(|f| f.block_reason)
        {
            return ApiError::blocked(reason);
        }

        let message = if parsed.error.is_empty() {
            format!("状态码 {}", response.status)
        } else {
            parsed.error
        };

        ApiError::RequestFailed {
            status: response.status,
            message,
        }
    }

    /// 解包成功响应信封，取出首个候选文本并解析为 JSON
    fn unwrap_envelope(response: &RawResponse) -> ApiResult<Value> {
        let envelope: ResponseEnvelope =
            serde_json::from_str(&response.body).map_err(|_| ApiError::EnvelopeParseFailed {
                status: response.status,
                body: response.body.clone(),
            })?;

        if envelope.candidates.is_empty() {
            return Err(ApiError::NoCandidates);
        }

        let text = envelope
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ApiError::EmptyContent);
        }

        serde_json::from_str(&text).map_err(|e| {
            warn!("无法解析候选文本: {}", text);
            ApiError::PayloadParseFailed {
                source: Box::new(e),
            }
        })
    }
}
