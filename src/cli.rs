// Command-line arguments

use std::path::PathBuf;

use clap::Parser;
use time::macros::format_description;
use time::Time;

#[derive(Debug, Parser)]
#[command(
    name = "youtube-merger",
    version,
    about = "Download adaptive video and audio streams and merge them with ffmpeg"
)]
pub struct Args {
    /// Video URL
    #[arg(required_unless_present = "check_tools")]
    pub url: Option<String>,

    /// Target resolution (e.g. 720p); falls back to the highest available
    #[arg(short = 'Q', long)]
    pub quality: Option<String>,

    /// Trim start, in seconds or [HH:]MM:SS
    #[arg(long, value_parser = parse_timestamp)]
    pub start: Option<f64>,

    /// Trim end, in seconds or [HH:]MM:SS
    #[arg(long, value_parser = parse_timestamp)]
    pub end: Option<f64>,

    /// Directory for temporary inputs and the merged output
    #[arg(short = 'C', long, default_value = ".")]
    pub work_dir: PathBuf,

    /// Proxy URL used by yt-dlp and the stream transfer
    #[arg(long)]
    pub proxy: Option<String>,

    /// Socket timeout in seconds for metadata resolution
    #[arg(long, default_value_t = 30)]
    pub timeout: u32,

    /// Path to the yt-dlp binary
    #[arg(long = "yt-dlp")]
    pub ytdlp_path: Option<String>,

    /// Path to the ffmpeg binary
    #[arg(long = "ffmpeg")]
    pub ffmpeg_path: Option<String>,

    /// Show yt-dlp and ffmpeg availability and exit
    #[arg(long)]
    pub check_tools: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Parse "90", "90.5", "1:30", "01:30" or "1:02:03" into seconds
pub fn parse_timestamp(value: &str) -> Result<f64, String> {
    let value = value.trim();

    if let Ok(seconds) = value.parse::<f64>() {
        if seconds.is_finite() && seconds >= 0.0 {
            return Ok(seconds);
        }
        return Err(format!("invalid time offset: {}", value));
    }

    let normalized = match value.matches(':').count() {
        1 => format!("00:{}", value),
        _ => value.to_string(),
    };

    let time = Time::parse(
        &normalized,
        format_description!("[hour padding:none]:[minute padding:none]:[second]"),
    )
    .map_err(|e| format!("invalid time offset {}: {}", value, e))?;
    let (h, m, s) = time.as_hms();
    Ok(f64::from(h) * 3600.0 + f64::from(m) * 60.0 + f64::from(s))
}
