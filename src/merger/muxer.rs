// ffmpeg muxer - runs the merge command and waits for it to exit

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command as TokioCommand;
use tracing::debug;

use super::command::MuxCommand;
use super::errors::MuxError;
use super::tools::{ToolManager, ToolType};
use super::traits::Muxer;
use super::utils::tail_lines;

/// Lines of ffmpeg stderr kept in a failure
const STDERR_TAIL_LINES: usize = 5;

pub struct FfmpegMuxer {
    ffmpeg_path: String,
}

impl FfmpegMuxer {
    pub fn new() -> Self {
        Self {
            ffmpeg_path: ToolManager::new().locate(ToolType::Ffmpeg),
        }
    }

    /// Use an explicit binary instead of the discovered one
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.ffmpeg_path = path.into();
        self
    }
}

impl Default for FfmpegMuxer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Muxer for FfmpegMuxer {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    async fn mux(&self, command: &MuxCommand) -> Result<(), MuxError> {
        debug!("Running {}", command.display(&self.ffmpeg_path));

        let output = TokioCommand::new(&self.ffmpeg_path)
            .args(command.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| MuxError::Spawn {
                program: self.ffmpeg_path.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(MuxError::Failed {
                program: self.ffmpeg_path.clone(),
                code: output.status.code(),
                stderr: tail_lines(&output.stderr, STDERR_TAIL_LINES),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merger::models::TrimWindow;
    use std::path::Path;

    fn command() -> MuxCommand {
        MuxCommand::new(
            Path::new("video_temp.mp4"),
            Path::new("audio_temp.mp4"),
            Path::new("out_merged.mp4"),
            TrimWindow::default(),
        )
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let muxer = FfmpegMuxer::new().with_path("/nonexistent/ffmpeg");
        let err = muxer.mux(&command()).await.unwrap_err();
        assert!(matches!(err, MuxError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_failure() {
        // `false` ignores its arguments and exits with 1
        let muxer = FfmpegMuxer::new().with_path("false");
        let err = muxer.mux(&command()).await.unwrap_err();
        match err {
            MuxError::Failed { code, .. } => assert_eq!(code, Some(1)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_zero_exit_is_success() {
        let muxer = FfmpegMuxer::new().with_path("true");
        assert!(muxer.mux(&command()).await.is_ok());
    }
}
