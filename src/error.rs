use auction_ocr_common::ImageRegion;
use std::fmt;
use thiserror::Error;

/// 1ファイル分のパイプラインのどの段階で失敗したか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Read,
    Extract,
    Ocr,
    Emit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Read => write!(f, "read"),
            Stage::Extract => write!(f, "extract"),
            Stage::Ocr => write!(f, "ocr"),
            Stage::Emit => write!(f, "emit"),
        }
    }
}

/// パイプライン（領域切り出し・OCR・メトリクス送信）のエラー
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("スクリーンショット読み込みエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("画像デコードエラー: {0}")]
    DecodeFailed(String),

    #[error("領域 {region} が画像サイズ {image_width}x{image_height} を超えています")]
    OutOfBounds {
        region: ImageRegion,
        image_width: u32,
        image_height: u32,
    },

    #[error("画像エンコードエラー: {0}")]
    EncodeFailed(String),

    #[error("OCRサーバー通信エラー: {0}")]
    TransportFailed(String),

    #[error("OCRレスポンスが不正: {0}")]
    MalformedResponse(String),

    #[error("メトリクス送信エラー: {0}")]
    EmissionFailed(String),
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Io(_) => Stage::Read,
            PipelineError::DecodeFailed(_) | PipelineError::OutOfBounds { .. } => Stage::Extract,
            PipelineError::EncodeFailed(_)
            | PipelineError::TransportFailed(_)
            | PipelineError::MalformedResponse(_) => Stage::Ocr,
            PipelineError::EmissionFailed(_) => Stage::Emit,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("フォルダ監視を開始できません: {0}")]
    Watch(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] auction_ocr_common::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
