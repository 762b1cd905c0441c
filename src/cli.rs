use crate::config::Config;
use crate::ocr::OcrTransport;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "auction-ocr")]
#[command(about = "取引所スクリーンショットのOCR解析・価格メトリクス送信ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 設定ファイル（デフォルト: ~/.config/auction-ocr/config.json）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// スクリーンショットフォルダを監視して新しい画像を解析
    Watch {
        /// 監視するフォルダ（デフォルト: ./screenshots/）
        #[arg(short = 'f', long = "screenshot-folder")]
        folder: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// 1枚のスクリーンショットを解析して結果をJSONで出力
    Parse {
        /// スクリーンショットのパス
        #[arg(required = true)]
        file: PathBuf,

        /// 結果をメトリクスとして送信する
        #[arg(long)]
        emit: bool,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// フォルダ内の既存スクリーンショットを一括解析
    Scan {
        /// 対象フォルダ（デフォルト: 設定のスクリーンショットフォルダ）
        folder: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// 設定を表示/初期化
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// デフォルト設定ファイルを書き出す
        #[arg(long)]
        init: bool,
    },
}

/// 設定ファイルの値を上書きするオプション
#[derive(Args, Debug, Default, Clone)]
pub struct Overrides {
    /// 処理後もスクリーンショットを残す
    #[arg(short = 'k', long)]
    pub keep_screenshots: bool,

    /// OCRサーバーのURL
    #[arg(long)]
    pub ocr_url: Option<String>,

    /// OCRサーバーへの送信方式
    #[arg(long, value_enum)]
    pub transport: Option<OcrTransport>,

    /// メトリクス送信先URL
    #[arg(long)]
    pub metrics_url: Option<String>,

    /// 同時に処理するファイル数
    #[arg(long)]
    pub max_concurrent: Option<usize>,
}

impl Overrides {
    pub fn apply(&self, config: &mut Config) {
        if self.keep_screenshots {
            config.keep_screenshots = true;
        }
        if let Some(url) = &self.ocr_url {
            config.ocr.endpoint = url.clone();
        }
        if let Some(transport) = self.transport {
            config.ocr.transport = transport;
        }
        if let Some(url) = &self.metrics_url {
            config.metrics.endpoint = Some(url.clone());
        }
        if let Some(n) = self.max_concurrent {
            config.dispatcher.max_concurrent_runs = n;
        }
    }
}
