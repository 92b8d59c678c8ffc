use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "subscout", version)]
#[command(about = "Find and download subtitles from the SubsCenter catalogue")]
pub struct Cli {
    /// Configuration file (default: $SUBSCOUT_CONFIG, then ./subscout.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Print Prometheus metrics to stderr before exiting
    #[arg(long, global = true)]
    pub metrics: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List subtitles for a video, best matches first
    List(VideoArgs),

    /// Download a subtitle for a video
    Download {
        #[command(flatten)]
        video: VideoArgs,

        /// Subtitle id to download (default: best match)
        #[arg(long)]
        id: Option<u64>,

        /// Output file (default: <id>.<language>.srt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the effective configuration with secrets redacted
    Config,
}

#[derive(Args, Debug, Clone)]
pub struct VideoArgs {
    /// Series name (requires --season and --episode)
    #[arg(long)]
    pub series: Option<String>,

    #[arg(long)]
    pub season: Option<u32>,

    #[arg(long)]
    pub episode: Option<u32>,

    /// Movie title, or episode title when --series is given
    #[arg(long)]
    pub title: Option<String>,

    /// Release name of the video file, used to match release attributes
    #[arg(long)]
    pub release: Option<String>,

    /// Alpha-2 language code, repeatable (default: configured languages)
    #[arg(short, long = "language")]
    pub languages: Vec<String>,
}
