use super::{encode_png, parse_response, OcrTransport, TextRecognizer};
use crate::config::OcrConfig;
use crate::error::PipelineError;
use async_trait::async_trait;
use base64::Engine as _;
use image::DynamicImage;
use reqwest::multipart::{Form, Part};
use std::time::Duration;

/// HTTP経由のOCRクライアント（otiai10/ocrserver 互換）
#[derive(Debug, Clone)]
pub struct HttpOcrClient {
    client: reqwest::Client,
    endpoint: String,
    transport: OcrTransport,
}

impl HttpOcrClient {
    pub fn new(config: &OcrConfig) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| PipelineError::TransportFailed(format!("HTTPクライアント生成エラー: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            transport: config.transport,
        })
    }

    fn url(&self) -> String {
        format!("{}/{}", self.endpoint, self.transport.path())
    }

    async fn send(&self, png: Vec<u8>) -> Result<reqwest::Response, PipelineError> {
        let request = match self.transport {
            OcrTransport::Base64 => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(&png);
                self.client
                    .post(self.url())
                    .json(&serde_json::json!({ "base64": encoded }))
            }
            OcrTransport::Multipart => {
                let part = Part::bytes(png)
                    .file_name("region.png")
                    .mime_str("image/png")
                    .map_err(|e| PipelineError::EncodeFailed(e.to_string()))?;
                self.client
                    .post(self.url())
                    .multipart(Form::new().part("file", part))
            }
        };

        request.send().await.map_err(|e| {
            PipelineError::TransportFailed(format!("{} に接続できません: {}", self.endpoint, e))
        })
    }
}

#[async_trait]
impl TextRecognizer for HttpOcrClient {
    async fn recognize(&self, image: &DynamicImage) -> Result<String, PipelineError> {
        let png = encode_png(image)?;
        let response = self.send(png).await?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PipelineError::TransportFailed(format!("レスポンス読み込みエラー: {}", e)))?;
        tracing::trace!(%status, body = %body, "OCR response");

        if !status.is_success() {
            let preview: String = body.chars().take(200).collect();
            return Err(PipelineError::TransportFailed(format!(
                "OCRサーバーがエラーを返しました ({}): {}",
                status, preview
            )));
        }

        parse_response(&body)
    }
}
