//! OCRクライアント
//!
//! 切り出した領域を外部OCRサーバーに送り、認識テキストを受け取る。
//! 再試行やキャッシュはしない（1回の実行につき1領域1リクエスト）。

mod client;

pub use client::HttpOcrClient;

use crate::error::PipelineError;
use async_trait::async_trait;
use clap::ValueEnum;
use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// 画像からテキストを認識する
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, image: &DynamicImage) -> Result<String, PipelineError>;
}

/// OCRサーバーへの画像の送り方
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrTransport {
    /// JSON本文にbase64で埋め込む（`POST /base64`）
    #[default]
    Base64,
    /// multipartでファイルとして送る（`POST /file`）
    Multipart,
}

impl OcrTransport {
    pub fn path(&self) -> &'static str {
        match self {
            OcrTransport::Base64 => "base64",
            OcrTransport::Multipart => "file",
        }
    }
}

/// 切り出した領域をPNGにエンコード
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, PipelineError> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| PipelineError::EncodeFailed(e.to_string()))?;
    Ok(buf)
}

/// OCRサーバーのレスポンス本文から `result` を取り出す
pub fn parse_response(body: &str) -> Result<String, PipelineError> {
    let json: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| PipelineError::MalformedResponse(format!("JSONではありません: {}", e)))?;

    match json.get("result") {
        Some(serde_json::Value::String(text)) => Ok(text.clone()),
        Some(other) => Err(PipelineError::MalformedResponse(format!(
            "result が文字列ではありません: {}",
            other
        ))),
        None => Err(PipelineError::MalformedResponse("result がありません".into())),
    }
}
