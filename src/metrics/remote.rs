//! HTTPでのサンプル送信（InfluxDB line protocol）

use super::{MetricsSink, Observation};
use crate::config::MetricsConfig;
use crate::error::PipelineError;
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RemoteSink {
    client: reqwest::Client,
    endpoint: String,
    username: Option<String>,
    password: Option<String>,
}

impl RemoteSink {
    pub fn new(endpoint: &str, config: &MetricsConfig) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| PipelineError::EmissionFailed(format!("HTTPクライアント生成エラー: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }
}

#[async_trait]
impl MetricsSink for RemoteSink {
    async fn write(&self, observation: &Observation) -> Result<(), PipelineError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(line_protocol(observation));

        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_ref());
        }

        let response = request
            .send()
            .await
            .map_err(|e| PipelineError::EmissionFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(200).collect();
            return Err(PipelineError::EmissionFailed(format!("{}: {}", status, preview)));
        }
        Ok(())
    }
}

/// `metric,label=value value=<f64> <unix nanos>` 形式の1行
pub fn line_protocol(observation: &Observation) -> String {
    let mut line = escape(&observation.metric, &[',', ' ']);
    for (key, value) in &observation.labels {
        line.push(',');
        line.push_str(&escape(key, &[',', '=', ' ']));
        line.push('=');
        line.push_str(&escape(value, &[',', '=', ' ']));
    }
    line.push_str(&format!(" value={}", observation.value));
    if let Some(nanos) = observation.timestamp.timestamp_nanos_opt() {
        line.push_str(&format!(" {}", nanos));
    }
    line
}

fn escape(s: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '\\' || special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
