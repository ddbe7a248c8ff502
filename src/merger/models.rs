// Common data models for the merger

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Mime type an audio stream must have to be picked
pub const TARGET_AUDIO_MIME: &str = "audio/mp4";
/// Fixed temporary file for the video stream (not unique per run)
pub const VIDEO_TEMP_FILE: &str = "video_temp.mp4";
/// Fixed temporary file for the audio stream (not unique per run)
pub const AUDIO_TEMP_FILE: &str = "audio_temp.mp4";

/// What an encoded variant carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamKind {
    /// Adaptive stream with video only
    VideoOnly,
    /// Adaptive stream with audio only
    AudioOnly,
    /// Muxed stream with both video and audio
    Progressive,
}

impl StreamKind {
    pub fn is_adaptive(&self) -> bool {
        !matches!(self, Self::Progressive)
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VideoOnly => write!(f, "video"),
            Self::AudioOnly => write!(f, "audio"),
            Self::Progressive => write!(f, "progressive"),
        }
    }
}

/// One retrievable encoded variant of a remote resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    /// Format ID (e.g., "137", "140")
    pub id: String,
    pub kind: StreamKind,
    /// Video height in pixels
    pub height: Option<u32>,
    /// Audio bitrate in kbps
    pub abr: Option<f32>,
    /// Container mime type (e.g., "video/mp4", "audio/webm")
    pub mime_type: String,
    /// Direct media URL
    pub url: String,
    /// Headers the platform expects when fetching `url`
    #[serde(default)]
    pub http_headers: BTreeMap<String, String>,
    /// Size in bytes, exact or estimated
    pub filesize: Option<u64>,
}

impl StreamDescriptor {
    /// Resolution label such as "720p"
    pub fn resolution(&self) -> Option<String> {
        self.height.map(|h| format!("{}p", h))
    }

    pub fn is_adaptive(&self) -> bool {
        self.kind.is_adaptive()
    }
}

impl fmt::Display for StreamDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            StreamKind::AudioOnly => write!(
                f,
                "{}kbps {}",
                self.abr.map_or_else(|| "?".to_string(), |a| format!("{:.0}", a)),
                self.mime_type
            )?,
            _ => write!(
                f,
                "{} {}",
                self.resolution().unwrap_or_else(|| "?".to_string()),
                self.mime_type
            )?,
        }
        if let Some(size) = self.filesize {
            write!(f, " ({:.1} MiB)", size as f64 / (1024.0 * 1024.0))?;
        }
        Ok(())
    }
}

/// A resolved remote resource and its stream variants, in enumeration order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub title: String,
    pub webpage_url: String,
    pub streams: Vec<StreamDescriptor>,
}

/// Streams picked for one run; either side may be absent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub video: Option<StreamDescriptor>,
    pub audio: Option<StreamDescriptor>,
}

/// Optional (start, end) offsets in seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrimWindow {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl TrimWindow {
    pub fn new(start: Option<f64>, end: Option<f64>) -> Self {
        Self { start, end }
    }

    /// Start offset with an absent start read as zero
    pub fn start_seconds(&self) -> f64 {
        self.start.unwrap_or(0.0)
    }

    /// Duration of the window when the end lies after the start
    pub fn duration(&self) -> Option<f64> {
        let start = self.start_seconds();
        self.end.filter(|end| *end > start).map(|end| end - start)
    }

    /// End given but not after the start
    pub fn is_inverted(&self) -> bool {
        self.end.map_or(false, |end| end <= self.start_seconds())
    }
}

/// Network configuration for the resolver and the transfer client
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// SOCKS5/HTTP proxy URL (e.g., "socks5://127.0.0.1:1080")
    pub proxy: Option<String>,

    /// Timeout in seconds for metadata resolution
    pub timeout: Option<u32>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            timeout: Some(30),
        }
    }
}

/// Options for one merge run
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Target resolution label (e.g., "720p"); `None` picks the highest
    pub quality: Option<String>,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    /// Directory holding the temporary inputs and the output
    pub work_dir: PathBuf,
    pub network: NetworkConfig,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            quality: Some("720p".to_string()),
            start_time: None,
            end_time: None,
            work_dir: PathBuf::from("."),
            network: NetworkConfig::default(),
        }
    }
}

impl MergeOptions {
    pub fn with_quality(mut self, quality: Option<String>) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_start_time(mut self, seconds: Option<f64>) -> Self {
        self.start_time = seconds;
        self
    }

    pub fn with_end_time(mut self, seconds: Option<f64>) -> Self {
        self.end_time = seconds;
        self
    }

    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.network.proxy = proxy;
        self
    }

    pub fn with_timeout(mut self, seconds: Option<u32>) -> Self {
        self.network.timeout = seconds;
        self
    }

    pub fn trim(&self) -> TrimWindow {
        TrimWindow::new(self.start_time, self.end_time)
    }

    pub fn video_temp_path(&self) -> PathBuf {
        self.work_dir.join(VIDEO_TEMP_FILE)
    }

    pub fn audio_temp_path(&self) -> PathBuf {
        self.work_dir.join(AUDIO_TEMP_FILE)
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        Path::new(&self.work_dir).join(file_name)
    }
}

/// Outcome of a successful merge run
#[derive(Debug, Clone)]
pub struct MergeReport {
    pub title: String,
    pub output: PathBuf,
    pub video: StreamDescriptor,
    pub audio: StreamDescriptor,
    pub trim: TrimWindow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_only_when_end_after_start() {
        assert_eq!(TrimWindow::new(Some(10.0), Some(40.0)).duration(), Some(30.0));
        assert_eq!(TrimWindow::new(None, Some(40.0)).duration(), Some(40.0));
        assert_eq!(TrimWindow::new(Some(20.0), Some(15.0)).duration(), None);
        assert_eq!(TrimWindow::new(Some(10.0), None).duration(), None);
    }

    #[test]
    fn test_inverted_window() {
        assert!(TrimWindow::new(Some(20.0), Some(15.0)).is_inverted());
        assert!(TrimWindow::new(Some(20.0), Some(20.0)).is_inverted());
        assert!(!TrimWindow::new(Some(10.0), Some(40.0)).is_inverted());
        assert!(!TrimWindow::default().is_inverted());
    }

    #[test]
    fn test_temp_paths_live_in_work_dir() {
        let options = MergeOptions::default().with_work_dir("/tmp/run");
        assert_eq!(options.video_temp_path(), PathBuf::from("/tmp/run/video_temp.mp4"));
        assert_eq!(options.audio_temp_path(), PathBuf::from("/tmp/run/audio_temp.mp4"));
    }

    #[test]
    fn test_resolution_label() {
        let stream = StreamDescriptor {
            id: "136".to_string(),
            kind: StreamKind::VideoOnly,
            height: Some(720),
            abr: None,
            mime_type: "video/mp4".to_string(),
            url: String::new(),
            http_headers: BTreeMap::new(),
            filesize: None,
        };
        assert_eq!(stream.resolution().as_deref(), Some("720p"));
        assert_eq!(stream.to_string(), "720p video/mp4");

        let sized = StreamDescriptor {
            filesize: Some(5 * 1024 * 1024 + 512 * 1024),
            ..stream
        };
        assert_eq!(sized.to_string(), "720p video/mp4 (5.5 MiB)");
    }
}
