// yt-dlp resolver - uses the native `yt-dlp` binary in --dump-json mode
//
// Only metadata is fetched here. The direct URLs and headers of every
// format are kept on the descriptors so the transfer step can fetch them.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::diagnostics::diagnose_error;
use crate::merger::errors::ResolveError;
use crate::merger::models::{NetworkConfig, Resource, StreamDescriptor, StreamKind};
use crate::merger::tools::{ToolManager, ToolType};
use crate::merger::traits::ResourceResolver;
use crate::merger::utils::{get_proxy_args, get_timeout_args, run_output_with_timeout};

/// Process timeout when the network config has none
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Resolver backed by the yt-dlp binary
pub struct YtDlpResolver {
    ytdlp_path: String,
    network: NetworkConfig,
}

impl YtDlpResolver {
    pub fn new(network: NetworkConfig) -> Self {
        Self {
            ytdlp_path: ToolManager::new().locate(ToolType::YtDlp),
            network,
        }
    }

    /// Use an explicit binary instead of the discovered one
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.ytdlp_path = path.into();
        self
    }

    /// Build command arguments
    fn build_args(&self, url: &str) -> Vec<String> {
        let mut args = vec![
            "--dump-json".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
        ];
        args.extend(get_timeout_args(&self.network));
        args.extend(get_proxy_args(&self.network));
        args.push(url.to_string());
        args
    }

    /// Process timeout: socket timeout plus headroom for extraction
    fn process_timeout(&self) -> u64 {
        self.network
            .timeout
            .map_or(DEFAULT_TIMEOUT_SECS, |t| u64::from(t) * 4)
    }

    /// Parse yt-dlp JSON output into a resource
    pub fn parse_json(stdout: &[u8]) -> Result<Resource, ResolveError> {
        let json_str = String::from_utf8_lossy(stdout);
        let json: serde_json::Value = serde_json::from_str(&json_str)
            .map_err(|e| ResolveError::ParseError(format!("Invalid JSON: {}", e)))?;

        let streams = Self::parse_formats(&json)?;

        Ok(Resource {
            id: json["id"].as_str().unwrap_or("unknown").to_string(),
            title: json["title"].as_str().unwrap_or("Unknown").to_string(),
            webpage_url: json["webpage_url"].as_str().unwrap_or("").to_string(),
            streams,
        })
    }

    fn parse_formats(json: &serde_json::Value) -> Result<Vec<StreamDescriptor>, ResolveError> {
        let formats_array = json["formats"]
            .as_array()
            .ok_or_else(|| ResolveError::ParseError("No formats array in JSON".to_string()))?;

        let mut streams = Vec::new();

        for f in formats_array {
            let has_video = f["vcodec"].as_str().map_or(false, |v| v != "none" && !v.is_empty());
            let has_audio = f["acodec"].as_str().map_or(false, |a| a != "none" && !a.is_empty());

            let kind = match (has_video, has_audio) {
                (true, false) => StreamKind::VideoOnly,
                (false, true) => StreamKind::AudioOnly,
                (true, true) => StreamKind::Progressive,
                // Storyboards and other non-media entries
                (false, false) => continue,
            };

            let url = match f["url"].as_str() {
                Some(u) if !u.is_empty() => u.to_string(),
                _ => continue,
            };

            let id = f["format_id"].as_str().unwrap_or("").to_string();

            // HLS and DASH entries point at a manifest, not at the media
            let protocol = f["protocol"].as_str().unwrap_or("https");
            if !is_direct_protocol(protocol) {
                debug!("Skipping format {} served over {}", id, protocol);
                continue;
            }

            let ext = f["ext"].as_str().unwrap_or("");

            let http_headers: BTreeMap<String, String> = f["http_headers"]
                .as_object()
                .map(|headers| {
                    headers
                        .iter()
                        .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                        .collect()
                })
                .unwrap_or_default();

            streams.push(StreamDescriptor {
                id,
                kind,
                height: f["height"].as_u64().map(|h| h as u32),
                abr: f["abr"].as_f64().map(|a| a as f32),
                mime_type: mime_type_for(kind, ext),
                url,
                http_headers,
                filesize: f["filesize"].as_u64().or_else(|| f["filesize_approx"].as_u64()),
            });
        }

        Ok(streams)
    }
}

impl Default for YtDlpResolver {
    fn default() -> Self {
        Self::new(NetworkConfig::default())
    }
}

/// Whether the format URL can be fetched with a single GET
fn is_direct_protocol(protocol: &str) -> bool {
    matches!(protocol, "http" | "https")
}

/// Container mime type from stream kind and file extension
fn mime_type_for(kind: StreamKind, ext: &str) -> String {
    let ext = match ext {
        "m4a" => "mp4",
        "weba" => "webm",
        other => other,
    };
    match kind {
        StreamKind::AudioOnly => format!("audio/{}", ext),
        _ => format!("video/{}", ext),
    }
}

#[async_trait]
impl ResourceResolver for YtDlpResolver {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn resolve(&self, url: &str) -> Result<Resource, ResolveError> {
        let args = self.build_args(url);
        debug!("Running {} {}", self.ytdlp_path, args.join(" "));

        let output = run_output_with_timeout(&self.ytdlp_path, args, self.process_timeout())
            .await
            .map_err(ResolveError::from)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            if let Some(reason) = diagnose_error(&stderr) {
                let hint = if reason.is_permanent() {
                    " (retrying will not help)"
                } else if reason.proxy_might_help() {
                    " (a proxy might help)"
                } else {
                    ""
                };
                warn!("{} refused {}: {}{}", self.name(), url, reason.description(), hint);
            }
            return Err(ResolveError::from(stderr));
        }

        let mut resource = Self::parse_json(&output.stdout)?;
        if resource.webpage_url.is_empty() {
            resource.webpage_url = url.to_string();
        }
        info!(
            "Resolved \"{}\" ({}) with {} streams",
            resource.title,
            resource.webpage_url,
            resource.streams.len()
        );
        Ok(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merger::stream_selector::StreamSelector;

    const SAMPLE: &str = r#"{
        "id": "JP7WM82XO4g",
        "title": "Cloud | Raj/Talk",
        "webpage_url": "https://www.youtube.com/watch?v=JP7WM82XO4g",
        "formats": [
            {"format_id": "sb0", "ext": "mhtml", "vcodec": "none", "acodec": "none",
             "url": "https://i.ytimg.com/sb"},
            {"format_id": "140", "ext": "m4a", "vcodec": "none", "acodec": "mp4a.40.2",
             "abr": 129.478, "url": "https://rr.googlevideo.com/140", "filesize": 1000,
             "http_headers": {"User-Agent": "Mozilla/5.0", "Accept": "*/*"}},
            {"format_id": "251", "ext": "webm", "vcodec": "none", "acodec": "opus", "abr": 160.0,
             "url": "https://rr.googlevideo.com/251"},
            {"format_id": "136", "ext": "mp4", "vcodec": "avc1.4d401f", "acodec": "none",
             "height": 720, "url": "https://rr.googlevideo.com/136", "filesize_approx": 5000},
            {"format_id": "18", "ext": "mp4", "vcodec": "avc1.42001E", "acodec": "mp4a.40.2",
             "height": 360, "url": "https://rr.googlevideo.com/18"},
            {"format_id": "137", "ext": "mp4", "vcodec": "avc1.640028", "acodec": "none",
             "height": 1080}
        ]
    }"#;

    #[test]
    fn test_parse_resource() {
        let res = YtDlpResolver::parse_json(SAMPLE.as_bytes()).unwrap();
        assert_eq!(res.id, "JP7WM82XO4g");
        assert_eq!(res.title, "Cloud | Raj/Talk");

        // storyboard and url-less entries are dropped
        let ids: Vec<&str> = res.streams.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["140", "251", "136", "18"]);
    }

    #[test]
    fn test_parse_stream_fields() {
        let res = YtDlpResolver::parse_json(SAMPLE.as_bytes()).unwrap();

        let audio = &res.streams[0];
        assert_eq!(audio.kind, StreamKind::AudioOnly);
        assert_eq!(audio.mime_type, "audio/mp4");
        assert_eq!(audio.filesize, Some(1000));
        assert_eq!(audio.http_headers.get("Accept").map(String::as_str), Some("*/*"));

        assert_eq!(res.streams[1].mime_type, "audio/webm");

        let video = &res.streams[2];
        assert_eq!(video.kind, StreamKind::VideoOnly);
        assert_eq!(video.resolution().as_deref(), Some("720p"));
        assert_eq!(video.mime_type, "video/mp4");
        assert_eq!(video.filesize, Some(5000));

        assert_eq!(res.streams[3].kind, StreamKind::Progressive);
    }

    #[test]
    fn test_manifest_formats_are_skipped() {
        let json = br#"{
            "id": "x",
            "title": "t",
            "formats": [
                {"format_id": "270", "ext": "mp4", "vcodec": "avc1.640028", "acodec": "none",
                 "height": 1080, "protocol": "m3u8_native",
                 "url": "https://manifest.googlevideo.com/api/manifest/hls_playlist/x/index.m3u8"},
                {"format_id": "137-dash", "ext": "mp4", "vcodec": "avc1.640028", "acodec": "none",
                 "height": 1080, "protocol": "http_dash_segments",
                 "url": "https://manifest.googlevideo.com/api/manifest/dash/x"},
                {"format_id": "137", "ext": "mp4", "vcodec": "avc1.640028", "acodec": "none",
                 "height": 1080, "protocol": "https", "url": "https://rr.googlevideo.com/137"}
            ]
        }"#;

        let res = YtDlpResolver::parse_json(json).unwrap();
        let ids: Vec<&str> = res.streams.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["137"]);

        let video = StreamSelector::select_video(&res, Some("1080p")).unwrap();
        assert_eq!(video.url, "https://rr.googlevideo.com/137");
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = YtDlpResolver::parse_json(b"not json").unwrap_err();
        assert!(matches!(err, ResolveError::ParseError(_)));
    }

    #[test]
    fn test_parse_missing_formats() {
        let err = YtDlpResolver::parse_json(br#"{"id": "x", "title": "t"}"#).unwrap_err();
        assert!(matches!(err, ResolveError::ParseError(_)));
    }

    #[test]
    fn test_build_args() {
        let resolver = YtDlpResolver {
            ytdlp_path: "yt-dlp".to_string(),
            network: NetworkConfig {
                proxy: Some("socks5://127.0.0.1:1080".to_string()),
                timeout: Some(20),
            },
        };
        assert_eq!(
            resolver.build_args("https://youtu.be/x"),
            vec![
                "--dump-json",
                "--no-playlist",
                "--no-warnings",
                "--socket-timeout",
                "20",
                "--proxy",
                "socks5://127.0.0.1:1080",
                "https://youtu.be/x",
            ]
        );
        assert_eq!(resolver.process_timeout(), 80);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_binary_is_tool_not_found() {
        let resolver = YtDlpResolver::default().with_path("/nonexistent/yt-dlp");
        let err = resolver.resolve("https://youtu.be/x").await.unwrap_err();
        assert!(matches!(err, ResolveError::ToolNotFound(_)));
    }
}
