// Resource resolution through yt-dlp
//
// The resolver runs the native `yt-dlp` binary in metadata-only mode and
// maps its JSON format list onto stream descriptors. Failures are run
// through `diagnose_error` so the log says why the platform refused.

mod cli;
mod diagnostics;

pub use cli::YtDlpResolver;
pub use diagnostics::{diagnose_error, BlockingReason};
