use anyhow::{bail, Result};
use quiz_batch_gen::{Config, QuestionOrder, QuizGenerator, QuizSource};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 加载配置
    let config = Config::from_env();

    // 解析命令行参数：主题 [数量]
    let mut args = std::env::args().skip(1);
    let Some(topic) = args.next() else {
        bail!("用法: quiz_batch_gen <主题> [数量]");
    };
    let total: usize = match args.next() {
        Some(v) => v.parse()?,
        None => 10,
    };

    let generator = QuizGenerator::new(&config);
    let source = QuizSource::from_topic(topic);
    let mut rng = rand::thread_rng();

    let questions = generator
        .generate(
            &source,
            QuestionOrder::Sequential,
            "",
            total,
            &[],
            &mut rng,
            &mut |p| {
                info!("进度: {}%（第 {}/{} 批）", p.percent, p.batch, p.total_batches);
            },
        )
        .await?;

    println!("{}", serde_json::to_string_pretty(&questions)?);

    Ok(())
}
