// 📨 Enrollment Webhook - one POST per submission
// HTTP 200 is the only success. No automatic retry; the user is asked to try again.

use crate::config::Config;
use crate::enrollment::EnrollmentSubmission;
use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

pub const RETRY_PROMPT: &str =
    "No pudimos enviar tu inscripción. Revisa tu conexión e inténtalo de nuevo.";

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("Webhook request failed: {0}")]
    Network(String),

    #[error("Webhook returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

impl SubmissionError {
    /// Same prompt for every failure
    pub fn user_message(&self) -> &'static str {
        RETRY_PROMPT
    }
}

pub struct WebhookClient {
    client: Client,
    endpoint: String,
}

impl WebhookClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.webhook_url.clone(),
            Duration::from_secs(config.webhook_timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST the submission as JSON
    pub async fn submit(&self, submission: &EnrollmentSubmission) -> Result<(), SubmissionError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Idempotency-Key", submission.idempotency_key())
            .json(submission)
            .send()
            .await
            .map_err(|e| {
                warn!(
                    submission_id = %submission.submission_id,
                    "Enrollment webhook unreachable: {}", e
                );
                SubmissionError::Network(e.to_string())
            })?;

        match response.status() {
            StatusCode::OK => {
                info!(
                    submission_id = %submission.submission_id,
                    program = %submission.program_name,
                    total = submission.final_total,
                    "Enrollment submitted"
                );
                Ok(())
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                warn!(
                    submission_id = %submission.submission_id,
                    status = status.as_u16(),
                    "Enrollment webhook rejected submission"
                );
                Err(SubmissionError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{EquipmentCatalog, ProgramRegistry};
    use crate::enrollment::EnrollmentForm;
    use crate::promo::PromoRegistry;
    use chrono::Utc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn submission() -> EnrollmentSubmission {
        let form = EnrollmentForm {
            parent_name: "Laura".to_string(),
            student_name: "Sofía".to_string(),
            email: "laura@example.com".to_string(),
            program_id: "trial".to_string(),
            owned_item_ids: vec![],
            promo_code: None,
        };
        EnrollmentSubmission::build(
            &form,
            &ProgramRegistry::new(),
            &EquipmentCatalog::new(),
            &PromoRegistry::new(),
            Utc::now(),
        )
        .unwrap()
    }

    /// Serve one request with a fixed status line; returns the raw request
    async fn serve_once(status_line: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/hook", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];

            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);

                let text = String::from_utf8_lossy(&buf);
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|l| {
                            let (k, v) = l.split_once(':')?;
                            k.eq_ignore_ascii_case("content-length")
                                .then(|| v.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if buf.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!("{}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n", status_line);
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&buf).into_owned()
        });

        (url, handle)
    }

    #[tokio::test]
    async fn test_submit_ok() {
        let (url, server) = serve_once("HTTP/1.1 200 OK").await;
        let client = WebhookClient::new(url, Duration::from_secs(5)).unwrap();
        let submission = submission();

        client.submit(&submission).await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /hook"));
        assert!(request.to_lowercase().contains("idempotency-key"));
        assert!(request.contains("\"programName\":\"Clase Muestra\""));
        assert!(request.contains("\"finalTotal\":330.0"));
    }

    #[tokio::test]
    async fn test_non_200_is_error() {
        let (url, server) = serve_once("HTTP/1.1 201 Created").await;
        let client = WebhookClient::new(url, Duration::from_secs(5)).unwrap();

        let err = client.submit(&submission()).await.unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, SubmissionError::Status { status: 201, .. }));
        assert_eq!(err.user_message(), RETRY_PROMPT);
    }

    #[tokio::test]
    async fn test_network_failure() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            WebhookClient::new(format!("http://{}/hook", addr), Duration::from_secs(2)).unwrap();
        let err = client.submit(&submission()).await.unwrap_err();

        assert!(matches!(err, SubmissionError::Network(_)));
        assert_eq!(err.user_message(), RETRY_PROMPT);
    }

    #[test]
    fn test_from_config() {
        let config = Config::default();
        let client = WebhookClient::from_config(&config).unwrap();
        assert_eq!(client.endpoint(), crate::config::DEFAULT_WEBHOOK_URL);
    }
}
