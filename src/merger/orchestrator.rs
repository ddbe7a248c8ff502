// Orchestrator - resolve, select, transfer, merge, clean up

use std::path::Path;

use tracing::{error, info};

use super::command::MuxCommand;
use super::errors::MergeError;
use super::models::{MergeOptions, MergeReport, StreamDescriptor, StreamKind};
use super::stream_selector::StreamSelector;
use super::traits::{Muxer, ResourceResolver, StreamTransfer};
use super::utils::output_file_name;

/// Runs one fetch-and-merge job through its collaborators
pub struct Merger {
    resolver: Box<dyn ResourceResolver>,
    transfer: Box<dyn StreamTransfer>,
    muxer: Box<dyn Muxer>,
}

impl Merger {
    pub fn new(
        resolver: Box<dyn ResourceResolver>,
        transfer: Box<dyn StreamTransfer>,
        muxer: Box<dyn Muxer>,
    ) -> Self {
        Self {
            resolver,
            transfer,
            muxer,
        }
    }

    /// Fetch the streams behind `url` and merge them into one file.
    ///
    /// Steps run strictly in order. Temporary inputs are removed only after
    /// a successful merge; any earlier failure leaves them in place.
    pub async fn run(&self, url: &str, options: &MergeOptions) -> Result<MergeReport, MergeError> {
        info!("Resolving {} with {}", url, self.resolver.name());
        let resource = self.resolver.resolve(url).await?;
        info!("Downloading from: {}", resource.title);

        let selection = StreamSelector::select(&resource, options.quality.as_deref());
        let video = selection
            .video
            .ok_or(MergeError::MissingStream(StreamKind::VideoOnly))?;
        let audio = selection
            .audio
            .ok_or(MergeError::MissingStream(StreamKind::AudioOnly))?;

        let video_path = options.video_temp_path();
        let audio_path = options.audio_temp_path();

        info!("Downloading video stream: {}", video);
        self.fetch(&video, &video_path).await?;

        info!("Downloading audio stream: {}", audio);
        self.fetch(&audio, &audio_path).await?;

        let output = options.output_path(&output_file_name(&resource.title));
        let trim = options.trim();
        let command = MuxCommand::new(&video_path, &audio_path, &output, trim);

        info!("Merging video and audio with {}...", self.muxer.name());
        if let Err(e) = self.muxer.mux(&command).await {
            error!(
                "Merge failed, leaving {} and {} in place",
                video_path.display(),
                audio_path.display()
            );
            return Err(e.into());
        }
        info!("Saved merged output as: {}", output.display());

        remove_temp(&video_path).await?;
        remove_temp(&audio_path).await?;

        Ok(MergeReport {
            title: resource.title,
            output,
            video,
            audio,
            trim,
        })
    }

    async fn fetch(&self, stream: &StreamDescriptor, dest: &Path) -> Result<u64, MergeError> {
        self.transfer
            .transfer(stream, dest)
            .await
            .map_err(|source| MergeError::Transfer {
                kind: stream.kind,
                source,
            })
    }
}

async fn remove_temp(path: &Path) -> Result<(), MergeError> {
    tokio::fs::remove_file(path)
        .await
        .map_err(|source| MergeError::Cleanup {
            path: path.to_path_buf(),
            source,
        })
}
