//! 批量生成编排器 - 编排层
//!
//! ## 职责
//!
//! 把"生成 N 道题目"的请求切成固定大小的批次，逐批调用生成网关，
//! 校验、去重并累积结果，对外报告整轮进度。
//!
//! ## 设计特点
//!
//! - **严格串行**：每批的去重条款依赖之前所有批次的产出，
//!   批次之间绝不并发，按批次序号递增依次执行
//! - **批内失败静默**：单道题目校验不过只丢弃该题，不中断批次
//! - **批间失败中止**：任何一次网关调用失败立即中止整轮，
//!   已累积的题目随错误一并带回
//! - **累加器独占**：累积列表在一轮生成期间由编排器独占，
//!   结束后所有权移交调用方

use crate::clients::transport::{HttpTransport, Transport};
use crate::clients::GatewayClient;
use crate::config::Config;
use crate::error::{ApiError, BatchRunError};
use crate::models::{GeneratedQuestion, QuestionOrder, QuizSource};
use crate::services::{
    build_conversion_prompt, build_generation_prompt, format_source, question_schema,
};
use crate::utils::simple_uuid;
use crate::utils::logging::{log_batch_complete, log_batch_start, log_run_complete, log_run_start};
use rand::Rng;
use serde_json::Value;
use tracing::{debug, error};

/// 一轮生成的进度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationProgress {
    /// 当前批次编号（从 1 开始）
    pub batch: usize,
    /// 批次总数
    pub total_batches: usize,
    /// 整轮完成百分比（0-100）
    pub percent: u8,
}

/// 批量生成编排器
pub struct QuizGenerator<T: Transport = HttpTransport> {
    client: GatewayClient<T>,
    generation_batch_size: usize,
    conversion_batch_size: usize,
}

impl QuizGenerator<HttpTransport> {
    /// 创建使用真实 HTTP 传输的编排器
    pub fn new(config: &Config) -> Self {
        Self::with_client(GatewayClient::new(config), config)
    }
}

impl<T: Transport> QuizGenerator<T> {
    /// 创建使用自定义网关客户端的编排器
    pub fn with_client(client: GatewayClient<T>, config: &Config) -> Self {
        Self {
            client,
            generation_batch_size: config.generation_batch_size,
            conversion_batch_size: config.conversion_batch_size,
        }
    }

    /// 批量生成题目
    ///
    /// # 参数
    /// - `source`: 出题素材
    /// - `order`: 素材分页顺序（`Mixed` 时每批重新洗牌）
    /// - `instructions`: 用户自定义要求（可为空）
    /// - `total`: 期望的题目总数
    /// - `prior`: 既有题目（用于去重，不计入本轮产出）
    /// - `rng`: 随机源（洗牌与标识生成）
    /// - `on_progress`: 进度回调，按整轮百分比推进
    ///
    /// # 返回
    /// 返回本轮新生成的题目。某一批返回零道有效题目不会中止整轮；
    /// 网关调用失败立即中止，已累积的题目随 [`BatchRunError`] 带回
    pub async fn generate(
        &self,
        source: &QuizSource,
        order: QuestionOrder,
        instructions: &str,
        total: usize,
        prior: &[GeneratedQuestion],
        rng: &mut impl Rng,
        on_progress: &mut dyn FnMut(GenerationProgress),
    ) -> Result<Vec<GeneratedQuestion>, BatchRunError> {
        let batch_size = self.generation_batch_size;
        let num_batches = div_ceil(total, batch_size);
        let mut accumulated: Vec<GeneratedQuestion> = Vec::new();
        let schema = question_schema();

        log_run_start(total, batch_size, num_batches);

        for i in 0..num_batches {
            // 接口可能超量返回，差值用饱和减法避免回绕
            let batch_count = batch_size.min(total.saturating_sub(accumulated.len()));
            if batch_count == 0 {
                break;
            }

            log_batch_start(i + 1, num_batches, batch_count);
            on_progress(GenerationProgress {
                batch: i + 1,
                total_batches: num_batches,
                percent: run_percent(i, batch_size, batch_count, total),
            });

            // 去重集合 = 外部既有题目 ∪ 本轮已累积题目
            let known: Vec<String> = prior
                .iter()
                .chain(accumulated.iter())
                .map(|q| q.question.clone())
                .collect();

            // Mixed 顺序下每批重新洗牌素材分页
            let content = format_source(source, order, rng);
            let prompt =
                build_generation_prompt(&content, batch_count, instructions, &known, source.kind);

            let batch_data = match self.client.call(&prompt, Some(&schema)).await {
                Ok(data) => data,
                Err(e) => {
                    error!("❌ 第 {}/{} 批生成失败，整轮中止: {}", i + 1, num_batches, e);
                    return Err(self.abort(accumulated, e));
                }
            };

            let (valid, returned) = append_valid(&mut accumulated, batch_data, rng);
            log_batch_complete(i + 1, valid, returned);
        }

        log_run_complete(accumulated.len(), total);
        Ok(accumulated)
    }

    /// 批量转换既有题目列表
    ///
    /// # 参数
    /// - `source`: 转换素材（整卷文本按页拆分）
    /// - `total`: 期望转换的题目数量
    /// - `prior`: 已转换的题目（决定本批从第几题继续）
    /// - `rng`: 随机源（标识生成）
    /// - `on_progress`: 进度回调，按批次比例推进
    ///
    /// # 返回
    /// 返回本轮转换出的题目，最多 `total` 道
    pub async fn convert(
        &self,
        source: &QuizSource,
        total: usize,
        prior: &[GeneratedQuestion],
        rng: &mut impl Rng,
        on_progress: &mut dyn FnMut(GenerationProgress),
    ) -> Result<Vec<GeneratedQuestion>, BatchRunError> {
        let batch_size = self.conversion_batch_size;
        let num_batches = div_ceil(total, batch_size);
        let mut accumulated: Vec<GeneratedQuestion> = Vec::new();
        let schema = question_schema();

        // 转换始终按原始顺序取整卷文本，整轮只格式化一次
        let full_text = format_source(source, QuestionOrder::Sequential, rng);

        log_run_start(total, batch_size, num_batches);

        for i in 0..num_batches {
            let batch_count = batch_size.min(total.saturating_sub(accumulated.len()));
            if batch_count == 0 {
                break;
            }

            // 从上次转换停下的位置继续（题号从 1 开始）
            let start_index = prior.len() + accumulated.len() + 1;

            log_batch_start(i + 1, num_batches, batch_count);
            on_progress(GenerationProgress {
                batch: i + 1,
                total_batches: num_batches,
                percent: batch_percent(i + 1, num_batches),
            });

            let prompt = build_conversion_prompt(&full_text, start_index, batch_count);

            let batch_data = match self.client.call(&prompt, Some(&schema)).await {
                Ok(data) => data,
                Err(e) => {
                    error!("❌ 第 {}/{} 批转换失败，整轮中止: {}", i + 1, num_batches, e);
                    return Err(self.abort(accumulated, e));
                }
            };

            let (valid, returned) = append_valid(&mut accumulated, batch_data, rng);
            log_batch_complete(i + 1, valid, returned);

            if accumulated.len() >= total {
                break;
            }
        }

        accumulated.truncate(total);
        log_run_complete(accumulated.len(), total);
        Ok(accumulated)
    }

    fn abort(&self, partial: Vec<GeneratedQuestion>, source: ApiError) -> BatchRunError {
        BatchRunError { partial, source }
    }
}

/// 校验并收录一批返回结果
///
/// 逐项反序列化并校验形状，不合格的题目静默丢弃；
/// 合格的题目分配新标识后追加到累加器。
/// 返回 (有效数量, 接口返回数量)
fn append_valid(
    accumulated: &mut Vec<GeneratedQuestion>,
    batch_data: Value,
    rng: &mut impl Rng,
) -> (usize, usize) {
    let Value::Array(items) = batch_data else {
        // 响应可解析但不是数组，按零道新题处理，不算错误
        debug!("接口返回的不是题目数组，本批计为 0 道");
        return (0, 0);
    };

    let returned = items.len();
    let mut valid = 0;

    for item in items {
        match serde_json::from_value::<GeneratedQuestion>(item) {
            Ok(mut question) if question.is_valid() => {
                question.id = simple_uuid(rng);
                accumulated.push(question);
                valid += 1;
            }
            Ok(question) => {
                debug!("丢弃形状不合格的题目: {}", question);
            }
            Err(e) => {
                debug!("丢弃无法解析的题目条目: {}", e);
            }
        }
    }

    (valid, returned)
}

/// 整轮进度百分比（生成模式）：按已请求数量相对总量计算
fn run_percent(batch_index: usize, batch_size: usize, batch_count: usize, total: usize) -> u8 {
    let requested = batch_index * batch_size + batch_count;
    ((requested as f64 / total as f64) * 100.0).round() as u8
}

/// 批次进度百分比（转换模式）：按批次序号相对批次总数计算
fn batch_percent(batch_num: usize, total_batches: usize) -> u8 {
    ((batch_num as f64 / total_batches as f64) * 100.0).round() as u8
}

fn div_ceil(total: usize, batch_size: usize) -> usize {
    (total + batch_size - 1) / batch_size
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnswerOption;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    #[test]
    fn test_div_ceil() {
        assert_eq!(div_ceil(25, 10), 3);
        assert_eq!(div_ceil(20, 10), 2);
        assert_eq!(div_ceil(1, 10), 1);
        assert_eq!(div_ceil(0, 10), 0);
    }

    #[test]
    fn test_run_percent_spans_whole_run() {
        // total=25, batch=10 → 三批的进度为 40 / 80 / 100
        assert_eq!(run_percent(0, 10, 10, 25), 40);
        assert_eq!(run_percent(1, 10, 10, 25), 80);
        assert_eq!(run_percent(2, 10, 5, 25), 100);
    }

    #[test]
    fn test_batch_percent() {
        assert_eq!(batch_percent(1, 3), 33);
        assert_eq!(batch_percent(2, 3), 67);
        assert_eq!(batch_percent(3, 3), 100);
    }

    fn raw_question(correct_flags: &[bool]) -> Value {
        let options: Vec<Value> = correct_flags
            .iter()
            .map(|&is_correct| {
                json!({ "text": "选项", "isCorrect": is_correct, "explanation": "解析" })
            })
            .collect();
        json!({ "topic": "主题", "question": "题干", "options": options })
    }

    #[test]
    fn test_append_valid_filters_bad_shapes() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut accumulated = Vec::new();

        let mut blank_stem = raw_question(&[true]);
        blank_stem["question"] = json!("");

        let batch = json!([
            raw_question(&[true, false, false, false]),
            raw_question(&[false, false]),      // 没有正确选项
            raw_question(&[true, true]),        // 多个正确选项
            blank_stem,                          // 空题干
            { "garbage": true },                 // 无法解析
            raw_question(&[false, true, false, false]),
        ]);

        let (valid, returned) = append_valid(&mut accumulated, batch, &mut rng);

        assert_eq!(returned, 6);
        assert_eq!(valid, 2);
        assert_eq!(accumulated.len(), 2);
        for q in &accumulated {
            assert!(!q.id.is_empty());
            assert_eq!(q.options.iter().filter(|o| o.is_correct).count(), 1);
        }
    }

    #[test]
    fn test_append_valid_assigns_distinct_ids() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut accumulated = Vec::new();

        let batch = json!([
            raw_question(&[true, false]),
            raw_question(&[true, false]),
        ]);
        append_valid(&mut accumulated, batch, &mut rng);

        assert_ne!(accumulated[0].id, accumulated[1].id);
    }

    #[test]
    fn test_append_valid_non_array_counts_zero() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut accumulated = vec![GeneratedQuestion {
            id: "既有".to_string(),
            topic: String::new(),
            question: "题干".to_string(),
            options: vec![AnswerOption {
                text: "A".to_string(),
                is_correct: true,
                explanation: String::new(),
            }],
            guideline: None,
        }];

        let (valid, returned) = append_valid(&mut accumulated, json!({ "not": "array" }), &mut rng);

        assert_eq!((valid, returned), (0, 0));
        assert_eq!(accumulated.len(), 1);
    }
}
