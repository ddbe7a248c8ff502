// StreamSelector - picks the adaptive video and audio streams to merge
//
// Video: first adaptive video-only stream at the requested resolution,
// otherwise the highest resolution available.
// Audio: highest bitrate adaptive audio-only stream in an mp4 container.

use tracing::{info, warn};

use super::models::{Selection, StreamDescriptor, StreamKind, TARGET_AUDIO_MIME};
use super::traits::{SortKey, StreamCatalog, StreamFilter, StreamQuery};

pub struct StreamSelector;

impl StreamSelector {
    /// Select both sides at once. Never fails; missing sides are `None`.
    pub fn select<C: StreamCatalog + ?Sized>(catalog: &C, quality: Option<&str>) -> Selection {
        let video = Self::select_video(catalog, quality);
        let audio = Self::select_audio(catalog);

        if audio.is_none() {
            warn!("No {} audio stream found, merging will not be possible", TARGET_AUDIO_MIME);
        }

        Selection { video, audio }
    }

    /// Video-only stream matching `quality`, with highest-resolution fallback
    pub fn select_video<C: StreamCatalog + ?Sized>(
        catalog: &C,
        quality: Option<&str>,
    ) -> Option<StreamDescriptor> {
        if let Some(label) = quality.map(normalize_quality) {
            let query = StreamQuery::new(StreamFilter {
                resolution: Some(label.clone()),
                ..video_filter()
            });

            if let Some(stream) = catalog.query(&query).first() {
                return Some((*stream).clone());
            }

            warn!(
                "No video stream found for {}, falling back to highest video quality available",
                label
            );
        }

        let best = catalog
            .query(&StreamQuery::new(video_filter()).order_by(SortKey::Resolution).desc())
            .first()
            .map(|s| (*s).clone());

        if let Some(stream) = &best {
            info!("Selected fallback video stream: {}", stream);
        }
        best
    }

    /// Highest bitrate audio-only stream with the target mime type
    pub fn select_audio<C: StreamCatalog + ?Sized>(catalog: &C) -> Option<StreamDescriptor> {
        let query = StreamQuery::new(StreamFilter {
            adaptive: Some(true),
            kind: Some(StreamKind::AudioOnly),
            resolution: None,
            mime_type: Some(TARGET_AUDIO_MIME.to_string()),
        })
        .order_by(SortKey::Bitrate)
        .desc();

        catalog.query(&query).first().map(|s| (*s).clone())
    }
}

fn video_filter() -> StreamFilter {
    StreamFilter {
        adaptive: Some(true),
        kind: Some(StreamKind::VideoOnly),
        resolution: None,
        mime_type: None,
    }
}

/// Read "720", "720P" and "720p" as the same label
pub fn normalize_quality(quality: &str) -> String {
    let trimmed = quality.trim().to_lowercase();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        format!("{}p", trimmed)
    } else {
        trimmed
    }
}
