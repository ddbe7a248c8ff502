// HTTP transfer of a single stream to a local file

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::errors::TransferError;
use super::models::{NetworkConfig, StreamDescriptor};
use super::traits::StreamTransfer;

/// Fetches stream URLs with reqwest, honoring the configured proxy
pub struct HttpTransfer {
    client: reqwest::Client,
}

impl HttpTransfer {
    pub fn new(network: &NetworkConfig) -> Result<Self, TransferError> {
        let mut builder = reqwest::Client::builder().connect_timeout(Duration::from_secs(
            network.timeout.map_or(30, u64::from),
        ));

        if let Some(proxy_url) = network.proxy.as_deref() {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

/// Per-stream headers the platform handed out, skipping unusable ones
fn header_map(stream: &StreamDescriptor) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in &stream.http_headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(n), Ok(v)) => {
                headers.insert(n, v);
            }
            _ => warn!("Skipping invalid header {} for stream {}", name, stream.id),
        }
    }
    headers
}

#[async_trait]
impl StreamTransfer for HttpTransfer {
    async fn transfer(&self, stream: &StreamDescriptor, dest: &Path) -> Result<u64, TransferError> {
        let mut response = self
            .client
            .get(&stream.url)
            .headers(header_map(stream))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TransferError::Status(response.status().as_u16()));
        }

        // Truncates any file left by a previous run
        let mut file = File::create(dest).await?;
        let mut written: u64 = 0;

        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        debug!("Wrote {} bytes of stream {} to {}", written, stream.id, dest.display());
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merger::models::StreamKind;
    use std::collections::BTreeMap;

    #[test]
    fn test_header_map_skips_invalid_entries() {
        let mut http_headers = BTreeMap::new();
        http_headers.insert("User-Agent".to_string(), "Mozilla/5.0".to_string());
        http_headers.insert("Bad Header".to_string(), "x".to_string());

        let stream = StreamDescriptor {
            id: "140".to_string(),
            kind: StreamKind::AudioOnly,
            height: None,
            abr: Some(128.0),
            mime_type: "audio/mp4".to_string(),
            url: "https://cdn.example/140".to_string(),
            http_headers,
            filesize: None,
        };

        let headers = header_map(&stream);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("user-agent").unwrap(), "Mozilla/5.0");
    }

    #[test]
    fn test_invalid_proxy_is_rejected() {
        let network = NetworkConfig {
            proxy: Some("not a proxy url".to_string()),
            timeout: None,
        };
        assert!(HttpTransfer::new(&network).is_err());
    }
}
