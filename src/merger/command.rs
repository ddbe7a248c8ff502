// ffmpeg argument construction for the merge step

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::models::TrimWindow;

/// Codec the audio stream is re-encoded to
pub const AUDIO_CODEC: &str = "aac";

/// Arguments for one muxing invocation (program name excluded)
#[derive(Debug, Clone, PartialEq)]
pub struct MuxCommand {
    pub video: PathBuf,
    pub audio: PathBuf,
    pub output: PathBuf,
    pub trim: TrimWindow,
}

impl MuxCommand {
    pub fn new(video: &Path, audio: &Path, output: &Path, trim: TrimWindow) -> Self {
        Self {
            video: video.to_path_buf(),
            audio: audio.to_path_buf(),
            output: output.to_path_buf(),
            trim,
        }
    }

    /// Full argument list: overwrite, trim, inputs, codecs, output
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-y".into()];
        args.extend(trim_args(&self.trim).into_iter().map(OsString::from));
        args.extend([
            "-i".into(),
            self.video.clone().into_os_string(),
            "-i".into(),
            self.audio.clone().into_os_string(),
            "-c:v".into(),
            "copy".into(),
            "-c:a".into(),
            AUDIO_CODEC.into(),
            "-strict".into(),
            "experimental".into(),
            self.output.clone().into_os_string(),
        ]);
        args
    }

    /// Printable command line for logs
    pub fn display(&self, program: &str) -> String {
        let rendered: Vec<String> = self
            .args()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        format!("{} {}", program, rendered.join(" "))
    }
}

/// Seek/duration arguments for a trim window.
///
/// An end that is not after the start is ignored and only the seek is kept.
pub fn trim_args(trim: &TrimWindow) -> Vec<String> {
    let start = trim.start_seconds();

    if trim.is_inverted() {
        warn!(
            "Trim end {} is not after start {}, ignoring end time",
            format_seconds(trim.end.unwrap_or_default()),
            format_seconds(start)
        );
    }

    match trim.duration() {
        Some(duration) => vec![
            "-ss".to_string(),
            format_seconds(start),
            "-t".to_string(),
            format_seconds(duration),
        ],
        None if start > 0.0 => vec!["-ss".to_string(), format_seconds(start)],
        None => Vec::new(),
    }
}

/// Seconds with at most millisecond precision and no trailing zeros
pub fn format_seconds(seconds: f64) -> String {
    let fixed = format!("{:.3}", seconds);
    fixed
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(start: Option<f64>, end: Option<f64>) -> Vec<String> {
        trim_args(&TrimWindow::new(start, end))
    }

    #[test]
    fn test_no_trim() {
        assert!(args(Some(0.0), None).is_empty());
        assert!(args(None, None).is_empty());
    }

    #[test]
    fn test_start_only() {
        assert_eq!(args(Some(10.0), None), vec!["-ss", "10"]);
    }

    #[test]
    fn test_start_and_end() {
        assert_eq!(args(Some(10.0), Some(40.0)), vec!["-ss", "10", "-t", "30"]);
    }

    #[test]
    fn test_end_without_start_trims_from_zero() {
        assert_eq!(args(None, Some(40.0)), vec!["-ss", "0", "-t", "40"]);
    }

    #[test]
    fn test_inverted_window_keeps_only_seek() {
        assert_eq!(args(Some(20.0), Some(15.0)), vec!["-ss", "20"]);
        assert_eq!(args(Some(20.0), Some(20.0)), vec!["-ss", "20"]);
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(10.0), "10");
        assert_eq!(format_seconds(100.0), "100");
        assert_eq!(format_seconds(0.0), "0");
        assert_eq!(format_seconds(10.5), "10.5");
        assert_eq!(format_seconds(40.3 - 10.1), "30.2");
    }

    #[test]
    fn test_full_command_layout() {
        let cmd = MuxCommand::new(
            Path::new("video_temp.mp4"),
            Path::new("audio_temp.mp4"),
            Path::new("Talk_merged.mp4"),
            TrimWindow::new(Some(10.0), Some(40.0)),
        );

        assert_eq!(
            cmd.display("ffmpeg"),
            "ffmpeg -y -ss 10 -t 30 -i video_temp.mp4 -i audio_temp.mp4 \
             -c:v copy -c:a aac -strict experimental Talk_merged.mp4"
        );
    }
}
