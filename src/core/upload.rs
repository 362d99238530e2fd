//! CDN upload proxy.
//!
//! Forwards admin image uploads to the storage CDN and relays its reply. The CDN
//! accepts either a multipart form with a single `file` field or the raw file bytes.

use crate::config::UploadConfig;
use crate::errors::{Error, Result};
use reqwest::{
    Client,
    header::CONTENT_TYPE,
    multipart::{Form, Part},
};
use tracing::{info, instrument, warn};

/// Content type assumed when the caller gives none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A successful CDN reply, relayed verbatim to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

/// HTTP client bound to one upload endpoint.
#[derive(Debug, Clone)]
pub struct UploadClient {
    client: Client,
    url: String,
}

impl UploadClient {
    /// Builds a client with the configured endpoint and request timeout.
    ///
    /// # Errors
    /// Returns an HTTP error if the TLS backend cannot be initialised.
    pub fn new(config: &UploadConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sends `bytes` as the `file` field of a multipart form.
    ///
    /// # Errors
    /// Returns [`Error::Upstream`] when the CDN answers with a non-success status and
    /// an HTTP error when it cannot be reached.
    #[instrument(skip(self, bytes), fields(size = bytes.len(), url = %self.url))]
    pub async fn upload_file(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<UpstreamReply> {
        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(content_type)?;
        let form = Form::new().part("file", part);

        let response = self.client.post(&self.url).multipart(form).send().await?;
        relay(response).await
    }

    /// Sends `bytes` as the request body under the given content type.
    ///
    /// # Errors
    /// Same as [`UploadClient::upload_file`].
    #[instrument(skip(self, bytes), fields(size = bytes.len(), url = %self.url))]
    pub async fn upload_raw(&self, bytes: Vec<u8>, content_type: &str) -> Result<UpstreamReply> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        relay(response).await
    }
}

async fn relay(response: reqwest::Response) -> Result<UpstreamReply> {
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = response.text().await?;

    if status.is_success() {
        info!(status = status.as_u16(), "Upload accepted");
        Ok(UpstreamReply {
            status: status.as_u16(),
            content_type,
            body,
        })
    } else {
        warn!(status = status.as_u16(), "Upload rejected by CDN");
        Err(Error::Upstream {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::io::Read;
    use std::sync::mpsc;
    use std::thread;

    /// What the mock CDN saw.
    #[derive(Debug)]
    pub(crate) struct Captured {
        pub content_type: Option<String>,
        pub body: Vec<u8>,
    }

    /// Starts a one-shot CDN stub answering `status` with `reply`.
    pub(crate) fn mock_cdn(status: u16, reply: &'static str) -> (UploadConfig, mpsc::Receiver<Captured>) {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            if let Ok(mut request) = server.recv() {
                let content_type = request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Content-Type"))
                    .map(|h| h.value.as_str().to_string());
                let mut body = Vec::new();
                request.as_reader().read_to_end(&mut body).unwrap();
                tx.send(Captured { content_type, body }).unwrap();

                let header =
                    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                        .unwrap();
                let response = tiny_http::Response::from_string(reply)
                    .with_status_code(status)
                    .with_header(header);
                let _ = request.respond(response);
            }
        });

        let config = UploadConfig {
            url: format!("http://{addr}/upload"),
            ..UploadConfig::default()
        };
        (config, rx)
    }

    #[tokio::test]
    async fn test_upload_file_sends_multipart_field() -> Result<()> {
        let (config, seen) = mock_cdn(200, r#"{"url":"https://cdn.example/a.png"}"#);
        let client = UploadClient::new(&config)?;

        let reply = client
            .upload_file(b"PNGDATA".to_vec(), "a.png", "image/png")
            .await?;
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, r#"{"url":"https://cdn.example/a.png"}"#);
        assert_eq!(reply.content_type.as_deref(), Some("application/json"));

        let captured = seen.recv().unwrap();
        assert!(captured.content_type.unwrap().starts_with("multipart/form-data"));
        let body = String::from_utf8_lossy(&captured.body);
        assert!(body.contains(r#"name="file""#));
        assert!(body.contains(r#"filename="a.png""#));
        assert!(body.contains("PNGDATA"));
        Ok(())
    }

    #[tokio::test]
    async fn test_upload_raw_keeps_content_type() -> Result<()> {
        let (config, seen) = mock_cdn(201, r#"{"ok":true}"#);
        let client = UploadClient::new(&config)?;

        let reply = client.upload_raw(vec![1, 2, 3], "image/webp").await?;
        assert_eq!(reply.status, 201);

        let captured = seen.recv().unwrap();
        assert_eq!(captured.content_type.as_deref(), Some("image/webp"));
        assert_eq!(captured.body, vec![1, 2, 3]);
        Ok(())
    }

    #[tokio::test]
    async fn test_upstream_failure_carries_status_and_body() -> Result<()> {
        let (config, _seen) = mock_cdn(413, "too large");
        let client = UploadClient::new(&config)?;

        let result = client.upload_raw(vec![0; 16], DEFAULT_CONTENT_TYPE).await;
        match result {
            Err(Error::Upstream { status, body }) => {
                assert_eq!(status, 413);
                assert_eq!(body, "too large");
            }
            other => panic!("expected upstream failure, got {other:?}"),
        }
        Ok(())
    }
}
