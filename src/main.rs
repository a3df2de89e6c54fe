use clap::Parser;
use csv_batch_api::config::{self, Cli, Command};
use csv_batch_api::core::date_filter;
use csv_batch_api::utils::error::{ErrorSeverity, ProcessError};
use csv_batch_api::utils::{logger, validation::Validate};
use csv_batch_api::{AppConfig, CsvProcessor, LocalFileSource};
use std::net::SocketAddr;
use std::path::Path;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日誌
    logger::init(cli.verbose, cli.json_logs);

    if cli.verbose {
        tracing::debug!("CLI args: {:?}", cli);
    }

    let config = match config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        exit_with(&e);
    }

    match cli.command() {
        Command::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.host().to_string());
            let port = port.unwrap_or_else(|| config.port());
            let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
            csv_batch_api::serve(&config, addr).await?;
        }
        Command::Process {
            file,
            window_days,
            pretty,
        } => process_file(&config, &file, window_days, pretty).await,
        Command::TestDate { date, window_days } => {
            let window_days = window_days
                .or_else(|| config.filter.as_ref().map(|f| f.window_days))
                .unwrap_or(7);
            let today = CsvProcessor::today();
            let matches = date_filter::matches(&date, window_days, today);
            match date_filter::parse_date(&date) {
                Ok(parsed) => tracing::info!("📅 Parsed '{}' as {}", date, parsed),
                Err(e) => tracing::info!("📅 {}", e),
            }
            println!(
                "{}",
                serde_json::json!({
                    "dateString": date,
                    "windowDays": window_days,
                    "referenceDate": today,
                    "matches": matches,
                })
            );
        }
    }

    Ok(())
}

async fn process_file(config: &AppConfig, file: &Path, window_days: Option<u32>, pretty: bool) {
    let settings = match config.processing_settings() {
        Ok(settings) => settings,
        Err(e) => exit_with(&e),
    };
    let processor = CsvProcessor::new(settings);

    let result = processor
        .process(LocalFileSource::new(file), window_days, CancellationToken::new())
        .await;

    match result {
        Ok(summary) => {
            let output = if pretty {
                serde_json::to_string_pretty(&summary)
            } else {
                serde_json::to_string(&summary)
            };
            match output {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("❌ Failed to serialize result: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Err(e) => exit_with(&e),
    }
}

fn exit_with(e: &ProcessError) -> ! {
    tracing::error!(
        "❌ Failed: {} (Kind: {:?}, Severity: {:?})",
        e,
        e.kind(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 130,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
