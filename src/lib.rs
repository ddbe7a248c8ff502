pub mod cli;
pub mod merger;

use cli::Args;
use merger::tools::ToolManager;
use merger::{
    FfmpegMuxer, HttpTransfer, MergeError, MergeOptions, MergeReport, Merger, NetworkConfig,
    YtDlpResolver,
};

/// Options for a run, taken from the command line
pub fn merge_options(args: &Args) -> MergeOptions {
    MergeOptions::default()
        .with_quality(args.quality.clone())
        .with_start_time(args.start)
        .with_end_time(args.end)
        .with_work_dir(args.work_dir.clone())
        .with_proxy(args.proxy.clone())
        .with_timeout(Some(args.timeout))
}

/// Wire the yt-dlp resolver, HTTP transfer and ffmpeg muxer together
pub fn build_merger(args: &Args, network: &NetworkConfig) -> Result<Merger, MergeError> {
    let mut resolver = YtDlpResolver::new(network.clone());
    if let Some(path) = &args.ytdlp_path {
        resolver = resolver.with_path(path.clone());
    }

    let mut muxer = FfmpegMuxer::new();
    if let Some(path) = &args.ffmpeg_path {
        muxer = muxer.with_path(path.clone());
    }

    let transfer = HttpTransfer::new(network)
        .map_err(|e| MergeError::Config(format!("transfer client: {}", e)))?;

    Ok(Merger::new(Box::new(resolver), Box::new(transfer), Box::new(muxer)))
}

/// Run one merge as described by `args`
pub async fn run(args: &Args) -> Result<MergeReport, MergeError> {
    let options = merge_options(args);
    let merger = build_merger(args, &options.network)?;
    let url = args.url.as_deref().unwrap_or_default();
    merger.run(url, &options).await
}

/// Print tool availability for `--check-tools`
pub fn print_tools_status() {
    for tool in ToolManager::new().get_all_tools() {
        match (&tool.path, &tool.version) {
            (Some(path), version) => println!(
                "{:<8} {:<12} {}",
                tool.name,
                version.as_deref().unwrap_or("unknown"),
                path
            ),
            (None, _) => println!("{:<8} not found", tool.name),
        }
    }
}
