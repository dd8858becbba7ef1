use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use quiz_helper::cli::Cli;
use quiz_helper::config::{AnswerBackend, Config};
use quiz_helper::utils::logging;
use quiz_helper::workflow::{answer_source, QuizFlow, QuizRunSummary};
use quiz_helper::{AppError, CanvasSession, StaticPage};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help / --version 也走这里，只有真正的参数错误返回 1
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let config = Config::load(cli.config.as_deref());
    let verbose = cli.verbose
        || config
            .as_ref()
            .map(|c| c.verbose_logging)
            .unwrap_or(false);
    logging::init(verbose);

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(AppError::from(e).into()),
    };

    match result {
        Ok(()) => {
            info!("✅ 全部完成");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("❌ 运行失败: {:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli, mut config: Config) -> Result<()> {
    if let Some(endpoint) = &cli.endpoint {
        config.answer_endpoint_url = endpoint.clone();
    }

    let source_name = match config.answer_backend {
        AnswerBackend::Http => config.answer_endpoint_url.clone(),
        AnswerBackend::Llm => format!("LLM ({})", config.llm_model_name),
    };
    logging::log_startup(&cli.course_id, &cli.quiz_id, &source_name);

    let options = cli.flow_options();
    let mut flow = QuizFlow::new(&config, answer_source(&config)?);

    // 离线模式：直接读保存的页面
    if let Some(path) = &cli.html {
        info!("📂 离线模式: {}", path.display());
        let page = StaticPage::from_file(path).await?;
        let summary = flow.run(&page, &options).await?;
        print_summary(&summary);
        return Ok(());
    }

    let credentials = config.credentials().map_err(AppError::from)?;
    let session = CanvasSession::open(&config).await?;

    let result: Result<QuizRunSummary> = async {
        // 连接已有浏览器时沿用它的登录状态
        if session.is_launched() {
            session.login(&credentials).await?;
        }
        session
            .navigate_to_quiz(
                &credentials.base_url,
                &cli.course_id,
                &cli.quiz_id,
                &config.markers.question,
            )
            .await?;
        let page = session.quiz_page();
        flow.run(&page, &options).await
    }
    .await;

    session.close().await?;
    let summary = result?;
    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &QuizRunSummary) {
    println!("{}", summary.rendered);
    if let Some(report) = &summary.fill {
        info!(
            "📝 已填写 {} 题，跳过 {} 题，连线 {} 次",
            report.filled.len(),
            report.skipped.len(),
            report.drags
        );
    }
    if let Some(outcome) = summary.submit {
        info!("📤 提交结果: {:?}", outcome);
    }
}
