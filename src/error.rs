use crate::models::GeneratedQuestion;
use std::fmt;

/// 传输层错误（网络不通、DNS 解析失败等）
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// 网关调用错误
///
/// 对应生成网关的五类失败：过载、内容拦截、响应不可解析、超时、网络异常
#[derive(Debug)]
pub enum ApiError {
    /// 网络请求失败（重试耗尽后仍然失败）
    Network {
        endpoint: String,
        source: TransportError,
    },
    /// 服务暂时过载（重试耗尽后仍返回过载状态）
    Overloaded,
    /// 内容生成被上游安全策略拦截
    Blocked {
        reason: String,
    },
    /// 网关返回非成功状态，且响应体携带服务端错误信息
    RequestFailed {
        status: u16,
        message: String,
    },
    /// 响应信封（外层 JSON）解析失败
    EnvelopeParseFailed {
        status: u16,
        body: String,
    },
    /// 响应中没有任何候选结果
    NoCandidates,
    /// 响应为空或格式不符合预期
    EmptyContent,
    /// 候选文本（内层 JSON）解析失败
    PayloadParseFailed {
        source: Box<serde_json::Error>,
    },
    /// 请求超时（超过网关调用的截止时间）
    Timeout {
        timeout_ms: u64,
    },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network { endpoint, source } => {
                write!(f, "网络请求失败 ({}): {}", endpoint, source)
            }
            ApiError::Overloaded => {
                write!(f, "服务暂时过载，请稍后再试")
            }
            ApiError::Blocked { reason } => {
                write!(f, "内容生成被拦截，原因: {}", reason)
            }
            ApiError::RequestFailed { status, message } => {
                write!(f, "网关调用失败 ({}): {}", status, message)
            }
            ApiError::EnvelopeParseFailed { status, body } => {
                write!(f, "网关调用失败 ({}): {}", status, body)
            }
            ApiError::NoCandidates => {
                write!(f, "接口未返回有效候选结果")
            }
            ApiError::EmptyContent => {
                write!(f, "接口返回内容为空或格式无效")
            }
            ApiError::PayloadParseFailed { source } => {
                write!(f, "无法解析服务端返回的内容: {}", source)
            }
            ApiError::Timeout { timeout_ms } => {
                write!(f, "请求超过时间限制 ({}毫秒)，请重试", timeout_ms)
            }
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            ApiError::PayloadParseFailed { source } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// 批量生成中断错误
///
/// 单个批次失败会中止整轮生成，但之前批次已经生成的题目不应丢失，
/// 随错误一并带回，由调用方决定是保留还是丢弃
#[derive(Debug)]
pub struct BatchRunError {
    /// 中断前已累积的题目
    pub partial: Vec<GeneratedQuestion>,
    /// 导致中断的底层错误
    pub source: ApiError,
}

impl fmt::Display for BatchRunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "批量生成中断 (已完成 {} 道题目): {}",
            self.partial.len(),
            self.source
        )
    }
}

impl std::error::Error for BatchRunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

// ========== 便捷构造函数 ==========

impl ApiError {
    /// 创建网络请求失败错误
    pub fn network(endpoint: impl Into<String>, source: TransportError) -> Self {
        ApiError::Network {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// 创建内容拦截错误
    pub fn blocked(reason: impl Into<String>) -> Self {
        ApiError::Blocked {
            reason: reason.into(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 网关调用结果类型
pub type ApiResult<T> = Result<T, ApiError>;
