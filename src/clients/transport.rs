//! HTTP 传输层
//!
//! 网关客户端只依赖 `Transport` 能力，不直接依赖 reqwest，
//! 测试时可以换成脚本化的假传输

use crate::error::TransportError;
use serde_json::Value;
use std::future::Future;

/// 一次 HTTP 调用的原始结果
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP 状态码
    pub status: u16,
    /// 响应体文本（先按文本读取，不假设是 JSON）
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP 传输能力
pub trait Transport {
    /// 向目标地址 POST 一个 JSON 负载，返回原始响应
    ///
    /// 只有网络层面的失败（连接不上、DNS 解析失败等）才返回 Err；
    /// 服务端返回的错误状态码属于正常响应
    fn post(
        &self,
        url: &str,
        payload: &Value,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}

/// 基于 reqwest 的真实传输
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    async fn post(&self, url: &str, payload: &Value) -> Result<RawResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| Box::new(e) as TransportError)?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Box::new(e) as TransportError)?;

        Ok(RawResponse { status, body })
    }
}
