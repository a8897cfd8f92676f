//! # Quiz Batch Gen
//!
//! 一个用于批量生成测验题目的 Rust 客户端
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 传输层（Transport）
//! - `clients/transport` - 只暴露"POST 一个 JSON 负载"的能力
//! - `HttpTransport` - 基于 reqwest 的真实传输，测试时可替换
//!
//! ### ② 客户端层（Gateway Client）
//! - `clients/gateway_client` - 生成网关客户端
//! - 指数退避重试、调用超时、错误分类、响应信封解包
//!
//! ### ③ 业务能力层（Services）
//! - `services/prompt_builder` - 提示词构建（纯函数）
//! - 素材格式化、去重条款、可靠性规则、输出结构描述
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_generator` - 批量生成编排器
//! - 切批、串行调用、校验收录、进度上报
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use clients::{GatewayClient, HttpTransport, RawResponse, Transport};
pub use config::{Config, RetryPolicy};
pub use error::{ApiError, ApiResult, BatchRunError};
pub use models::{
    AnswerOption, GeneratedQuestion, QuestionOrder, QuizSource, SourceFile, SourceKind, SourcePage,
};
pub use orchestrator::{GenerationProgress, QuizGenerator};
