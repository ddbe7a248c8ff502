use std::process;

use clap::Parser;
use tracing::{error, Level};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use youtube_merger::cli::Args;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    if args.check_tools {
        youtube_merger::print_tools_status();
        return;
    }

    match youtube_merger::run(&args).await {
        Ok(report) => println!("{}", report.output.display()),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}
