use crate::libs::daemon;
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Run in this process instead of detaching
    #[arg(long)]
    foreground: bool,
    /// Stop the background watcher
    #[arg(long)]
    stop: bool,
}

/// Starts, stops or runs the inactivity watcher.
pub async fn cmd(args: WatchArgs) -> Result<()> {
    if args.stop {
        daemon::stop()
    } else if args.foreground {
        daemon::run_with_signal_handling().await
    } else {
        daemon::spawn()
    }
}
