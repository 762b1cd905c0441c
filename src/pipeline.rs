//! 1ファイル分の処理
//!
//! 1. スクリーンショットをデコードし、タイトル・価格列・数量列を切り出す
//! 2. 3領域をOCRサーバーで認識
//! 3. 価格・数量をパースし、同じ行同士を突き合わせる
//! 4. 有効なレコードを1件ずつメトリクスとして送信
//!
//! 切り出しとOCRの失敗はその時点で実行全体を中断する（部分的な結果は送らない）。
//! 送信失敗はログに残して次のレコードへ進む。

use crate::config::Config;
use crate::error::PipelineError;
use crate::metrics::{LogSink, MetricNames, MetricsSink, RemoteSink};
use crate::ocr::{HttpOcrClient, TextRecognizer};
use crate::region;
use auction_ocr_common::{
    normalize_title, pair, parse_amounts, parse_prices, ParsedNumber, PricedRecord, ScreenLayout,
};
use chrono::Utc;
use image::DynamicImage;
use std::path::Path;
use std::sync::Arc;

/// OCR結果をパースしたもの（まだ突き合わせ前）
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedFields {
    pub title: String,
    pub prices: Vec<ParsedNumber<f64>>,
    pub amounts: Vec<ParsedNumber<i64>>,
}

impl RecognizedFields {
    pub fn records(&self) -> Vec<PricedRecord> {
        if self.title.is_empty() {
            return Vec::new();
        }
        pair(&self.title, &self.prices, &self.amounts).collect()
    }
}

/// 1回の実行結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub records: Vec<PricedRecord>,
    /// 送信に成功したサンプル数
    pub emitted: usize,
    /// 送信に失敗したサンプル数
    pub emission_failures: usize,
    /// タイトルが読めなかったため捨てた有効行の数
    pub skipped_rows: usize,
}

struct Crops {
    title: DynamicImage,
    price: DynamicImage,
    amount: DynamicImage,
}

#[derive(Clone)]
pub struct Pipeline {
    recognizer: Arc<dyn TextRecognizer>,
    sink: Arc<dyn MetricsSink>,
    layout: ScreenLayout,
    metric_names: MetricNames,
}

impl Pipeline {
    pub fn new(
        recognizer: Arc<dyn TextRecognizer>,
        sink: Arc<dyn MetricsSink>,
        layout: ScreenLayout,
        metric_names: MetricNames,
    ) -> Self {
        Self {
            recognizer,
            sink,
            layout,
            metric_names,
        }
    }

    /// 設定からHTTPクライアントを組み立てる
    ///
    /// `emit` がfalse、または送信先が未設定の場合はログ出力のみのシンクを使う。
    pub fn from_config(config: &Config, emit: bool) -> Result<Self, PipelineError> {
        let recognizer: Arc<dyn TextRecognizer> = Arc::new(HttpOcrClient::new(&config.ocr)?);

        let sink: Arc<dyn MetricsSink> = match (&config.metrics.endpoint, emit) {
            (Some(endpoint), true) => Arc::new(RemoteSink::new(endpoint, &config.metrics)?),
            (None, true) => {
                tracing::warn!("no metrics endpoint configured; observations are only logged");
                Arc::new(LogSink)
            }
            (_, false) => Arc::new(LogSink),
        };

        Ok(Self::new(
            recognizer,
            sink,
            config.layout,
            MetricNames::from(&config.metrics),
        ))
    }

    /// ファイルを読み込んで処理し、レコードを送信する
    pub async fn process_file(&self, path: &Path) -> Result<RunReport, PipelineError> {
        let bytes = tokio::fs::read(path).await?;
        let fields = self.recognize(bytes).await?;
        Ok(self.emit(&fields).await)
    }

    /// 送信せずにレコードだけを返す
    pub async fn extract_records(&self, path: &Path) -> Result<Vec<PricedRecord>, PipelineError> {
        let bytes = tokio::fs::read(path).await?;
        Ok(self.recognize(bytes).await?.records())
    }

    /// 切り出し・OCR・パースまで
    pub async fn recognize(&self, bytes: Vec<u8>) -> Result<RecognizedFields, PipelineError> {
        let layout = self.layout;
        let crops = tokio::task::spawn_blocking(move || -> Result<Crops, PipelineError> {
            let image = region::decode(&bytes)?;
            Ok(Crops {
                title: region::crop(&image, layout.title)?,
                price: region::crop(&image, layout.price)?,
                amount: region::crop(&image, layout.amount)?,
            })
        })
        .await
        .map_err(|e| PipelineError::DecodeFailed(format!("デコードタスクが異常終了: {}", e)))??;

        let (title, prices, amounts) = tokio::try_join!(
            self.recognizer.recognize(&crops.title),
            self.recognizer.recognize(&crops.price),
            self.recognizer.recognize(&crops.amount),
        )?;

        let fields = RecognizedFields {
            title: normalize_title(&title),
            prices: parse_prices(&prices),
            amounts: parse_amounts(&amounts),
        };
        tracing::debug!(title = %fields.title, prices = ?fields.prices, "parsed prices");
        tracing::debug!(title = %fields.title, amounts = ?fields.amounts, "parsed amounts");

        if fields.prices.len() != fields.amounts.len() {
            tracing::debug!(
                prices = fields.prices.len(),
                amounts = fields.amounts.len(),
                "price and amount row counts differ; extra rows are dropped"
            );
        }

        Ok(fields)
    }

    /// 有効な行を1件ずつ送信する
    pub async fn emit(&self, fields: &RecognizedFields) -> RunReport {
        let mut report = RunReport::default();
        if fields.title.is_empty() {
            report.skipped_rows = pair("", &fields.prices, &fields.amounts).count();
            if report.skipped_rows > 0 {
                tracing::warn!(
                    skipped_rows = report.skipped_rows,
                    "title region recognized no text; valid rows were not emitted"
                );
            }
            return report;
        }

        for record in pair(&fields.title, &fields.prices, &fields.amounts) {
            tracing::info!(
                title = %record.title,
                amount = record.amount,
                price = record.price,
                "{}: {} for {} gold",
                record.title,
                record.amount,
                record.price
            );

            for observation in self.metric_names.observations(&record, Utc::now()) {
                match self.sink.write(&observation).await {
                    Ok(()) => report.emitted += 1,
                    Err(e) => {
                        report.emission_failures += 1;
                        tracing::warn!(
                            title = %record.title,
                            metric = %observation.metric,
                            stage = %e.stage(),
                            error = %e,
                            "error remote writing"
                        );
                    }
                }
            }
            report.records.push(record);
        }

        report
    }
}
