//! メトリクス送信
//!
//! 1レコードを時系列サンプル（メトリクス名・ラベル・値・時刻）として送る。
//! 送信先はすべてのタスクから共有される `Arc<dyn MetricsSink>`。

mod remote;

pub use remote::RemoteSink;

use crate::config::MetricsConfig;
use crate::error::PipelineError;
use async_trait::async_trait;
use auction_ocr_common::PricedRecord;
use chrono::{DateTime, Utc};

pub const ITEM_LABEL: &str = "item_name";

/// 時系列サンプル1件
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub metric: String,
    pub labels: Vec<(String, String)>,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

impl Observation {
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[async_trait]
pub trait MetricsSink: Send + Sync {
    async fn write(&self, observation: &Observation) -> Result<(), PipelineError>;
}

/// 送信するメトリクス名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricNames {
    pub price: String,
    pub amount: Option<String>,
}

impl From<&MetricsConfig> for MetricNames {
    fn from(config: &MetricsConfig) -> Self {
        Self {
            price: config.metric_name.clone(),
            amount: config.amount_metric_name.clone(),
        }
    }
}

impl Default for MetricNames {
    fn default() -> Self {
        (&MetricsConfig::default()).into()
    }
}

impl MetricNames {
    /// レコードからサンプルを作る。価格は常に、数量は名前が設定されている場合のみ
    pub fn observations(&self, record: &PricedRecord, timestamp: DateTime<Utc>) -> Vec<Observation> {
        let labels = vec![(ITEM_LABEL.to_string(), record.title.clone())];

        let mut observations = vec![Observation {
            metric: self.price.clone(),
            labels: labels.clone(),
            value: record.price,
            timestamp,
        }];

        if let Some(amount_metric) = &self.amount {
            observations.push(Observation {
                metric: amount_metric.clone(),
                labels,
                value: record.amount as f64,
                timestamp,
            });
        }

        observations
    }
}

/// ログ出力のみ（送信先未設定時・`parse` コマンド用）
#[derive(Debug, Clone, Default)]
pub struct LogSink;

#[async_trait]
impl MetricsSink for LogSink {
    async fn write(&self, observation: &Observation) -> Result<(), PipelineError> {
        tracing::debug!(
            metric = %observation.metric,
            item = observation.label(ITEM_LABEL).unwrap_or_default(),
            value = observation.value,
            timestamp = %observation.timestamp.to_rfc3339(),
            "observation (not sent)"
        );
        Ok(())
    }
}
