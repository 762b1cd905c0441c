use anyhow::Context;
use auction_ocr::{cli, config, dispatcher, logging, pipeline, scanner};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use dispatcher::{DispatchOptions, Dispatcher, FileEvent};
use pipeline::Pipeline;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::config_path()?,
    };
    let mut config = Config::load(Some(&config_path))
        .with_context(|| format!("設定ファイルを読み込めません: {}", config_path.display()))?;

    match cli.command {
        Commands::Watch { folder, overrides } => {
            overrides.apply(&mut config);
            if let Some(folder) = folder {
                config.screenshot_folder = folder;
            }
            config.validate()?;

            let pipeline = Pipeline::from_config(&config, true)?;
            let (tx, rx) = mpsc::channel(config.dispatcher.queue_capacity);
            let watcher = dispatcher::watch_folder(&config.screenshot_folder, tx)
                .context("フォルダ監視の初期化に失敗しました")?;

            let shutdown = CancellationToken::new();
            let token = shutdown.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    token.cancel();
                }
            });

            let summary = Dispatcher::new(pipeline, DispatchOptions::from(&config))
                .run(rx, shutdown)
                .await;
            drop(watcher);

            tracing::info!(
                dispatched = summary.dispatched,
                succeeded = summary.succeeded,
                failed = summary.failed,
                "stopped watching"
            );
        }

        Commands::Parse { file, emit, overrides } => {
            overrides.apply(&mut config);
            config.validate()?;

            let pipeline = Pipeline::from_config(&config, emit)?;
            let records = if emit {
                pipeline.process_file(&file).await?.records
            } else {
                pipeline.extract_records(&file).await?
            };

            println!("{}", serde_json::to_string_pretty(&records)?);
        }

        Commands::Scan { folder, overrides } => {
            overrides.apply(&mut config);
            let folder = folder.unwrap_or_else(|| config.screenshot_folder.clone());
            config.validate()?;

            println!("📸 auction-ocr - 一括解析\n");
            let files = scanner::scan_folder(&folder, &config.image_suffix)?;
            println!("✔ {}枚のスクリーンショットを検出\n", files.len());
            if files.is_empty() {
                return Ok(());
            }

            let pipeline = Pipeline::from_config(&config, true)?;
            let options = DispatchOptions {
                settle: Duration::ZERO,
                ..DispatchOptions::from(&config)
            };

            let (tx, rx) = mpsc::channel(config.dispatcher.queue_capacity);
            let feeder = tokio::spawn(async move {
                for path in files {
                    if tx.send(FileEvent::new(path)).await.is_err() {
                        break;
                    }
                }
            });

            let summary = Dispatcher::new(pipeline, options)
                .run(rx, CancellationToken::new())
                .await;
            feeder.await?;

            println!("✔ 成功: {} / 失敗: {}", summary.succeeded, summary.failed);
            println!("\n✅ 解析完了");
        }

        Commands::Config { show, init } => {
            if init {
                if config_path.exists() {
                    println!("設定ファイルは既に存在します: {}", config_path.display());
                } else {
                    Config::default().save(&config_path)?;
                    println!("✔ 設定ファイルを作成しました: {}", config_path.display());
                }
            }

            if show || !init {
                let mut shown = config.clone();
                if shown.metrics.password.is_some() {
                    shown.metrics.password = Some("********".into());
                }
                println!("設定: {}", config_path.display());
                println!("{}", serde_json::to_string_pretty(&shown)?);
            }
        }
    }

    Ok(())
}
