use crate::error::{AppError, Result};
use crate::ocr::OcrTransport;
use auction_ocr_common::ScreenLayout;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const PASSWORD_ENV: &str = "AUCTION_OCR_METRICS_PASSWORD";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 監視するスクリーンショットフォルダ
    pub screenshot_folder: PathBuf,
    /// 処理後もスクリーンショットを残す
    pub keep_screenshots: bool,
    /// 処理対象とするファイル名の接尾辞
    pub image_suffix: String,
    pub ocr: OcrConfig,
    pub metrics: MetricsConfig,
    pub layout: ScreenLayout,
    pub dispatcher: DispatcherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// OCRサーバーのベースURL（`docker run --rm -p 8080:8080 otiai10/ocrserver`）
    pub endpoint: String,
    pub transport: OcrTransport,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// 送信先URL。未設定ならログ出力のみ
    pub endpoint: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub metric_name: String,
    /// 設定時は数量も別メトリクスとして送信
    pub amount_metric_name: Option<String>,
    pub user_agent: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// 同時に処理するファイル数の上限
    pub max_concurrent_runs: usize,
    /// 監視イベントのキュー長
    pub queue_capacity: usize,
    /// 書き込み通知をまとめるための待ち時間
    pub settle_millis: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            screenshot_folder: PathBuf::from("./screenshots/"),
            keep_screenshots: false,
            image_suffix: ".png".into(),
            ocr: OcrConfig::default(),
            metrics: MetricsConfig::default(),
            layout: ScreenLayout::default(),
            dispatcher: DispatcherConfig::default(),
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080".into(),
            transport: OcrTransport::Base64,
            timeout_seconds: 30,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            username: None,
            password: None,
            metric_name: "new_world_auction_house_item_price".into(),
            amount_metric_name: None,
            user_agent: concat!("New World Auction House Parser v", env!("CARGO_PKG_VERSION")).into(),
            timeout_seconds: 10,
        }
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_concurrent_runs: 4,
            queue_capacity: 64,
            settle_millis: 250,
        }
    }
}

impl Config {
    /// 設定ファイルを読み込む。ファイルがなければデフォルト値
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str::<Config>(&content)?
        } else {
            Self::default()
        };

        // 環境変数を優先
        if let Ok(password) = std::env::var(PASSWORD_ENV) {
            if !password.is_empty() {
                config.metrics.password = Some(password);
            }
        }

        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| AppError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("auction-ocr").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;

        if self.dispatcher.max_concurrent_runs == 0 {
            return Err(AppError::Config("max_concurrent_runs は1以上にしてください".into()));
        }
        if self.dispatcher.queue_capacity == 0 {
            return Err(AppError::Config("queue_capacity は1以上にしてください".into()));
        }
        if self.image_suffix.is_empty() {
            return Err(AppError::Config("image_suffix が空です".into()));
        }
        Ok(())
    }
}
