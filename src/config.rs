use std::time::Duration;

/// 重试策略
///
/// 原先重试参数散落在各个调用点，这里统一收拢为一个配置项，
/// 所有需要重试的网关调用共享同一份策略
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// 最大重试次数
    pub max_retries: usize,
    /// 首次重试前的等待时间（毫秒），之后按指数退避翻倍
    pub initial_delay_ms: u64,
    /// 视为"服务暂时过载"的 HTTP 状态码，只有命中才会重试
    pub transient_status_code: u16,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 1000,
            transient_status_code: 503,
        }
    }
}

impl RetryPolicy {
    /// 首次重试的等待时长
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }
}

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 生成网关地址（本地代理，由它持有上游 API 密钥）
    pub gateway_url: String,
    /// 单次网关调用的超时时间（毫秒），需小于部署平台的硬超时（10 秒）
    pub request_timeout_ms: u64,
    /// 题目生成模式下每批请求的题目数量
    pub generation_batch_size: usize,
    /// 题目列表转换模式下每批请求的题目数量
    pub conversion_batch_size: usize,
    /// 重试策略
    pub retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway_url: "http://localhost:5173/api/generateQuiz".to_string(),
            request_timeout_ms: 9000,
            generation_batch_size: 10,
            conversion_batch_size: 20,
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            gateway_url: std::env::var("GATEWAY_URL").unwrap_or(default.gateway_url),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_ms),
            generation_batch_size: std::env::var("GENERATION_BATCH_SIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.generation_batch_size),
            conversion_batch_size: std::env::var("CONVERSION_BATCH_SIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.conversion_batch_size),
            retry: RetryPolicy {
                max_retries: std::env::var("MAX_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.retry.max_retries),
                initial_delay_ms: std::env::var("INITIAL_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.retry.initial_delay_ms),
                transient_status_code: std::env::var("TRANSIENT_STATUS_CODE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.retry.transient_status_code),
            },
        }
    }

    /// 单次网关调用的超时时长
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
