mod cli;

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use subscout_core::{
    guess::{guess_release, GuessKind},
    load_config, load_config_from_env, metrics, validate_config, Config, Language, MatchTag,
    ReleaseAttributes, SanitizedConfig, SubsCenterProvider, SubtitleRecord, Video,
};

use cli::{Cli, Command, VideoArgs};

const DEFAULT_CONFIG_FILE: &str = "subscout.toml";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.json);

    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    // stdout carries command output
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = load(cli.config.as_deref())?;
    validate_config(&config).context("Configuration validation failed")?;

    if let Command::Config = cli.command {
        let sanitized = SanitizedConfig::from(&config);
        println!("{}", serde_json::to_string_pretty(&sanitized)?);
        return Ok(());
    }

    let provider = SubsCenterProvider::connect(&config)
        .await
        .context("Failed to open provider session")?;

    let result = match &cli.command {
        Command::List(args) => list(&provider, &config, args).await,
        Command::Download { video, id, output } => {
            download(&provider, &config, video, *id, output.as_deref()).await
        }
        Command::Config => Ok(()),
    };

    // The session is closed whatever the command outcome
    let terminated = provider.terminate().await;

    if cli.metrics {
        print_metrics()?;
    }
    result?;
    terminated.context("Failed to close provider session")
}

/// Load the configuration file, or defaults plus environment when there is none.
fn load(explicit: Option<&Path>) -> Result<Config> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var("SUBSCOUT_CONFIG").ok().map(PathBuf::from))
        .or_else(|| {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some(default)
        });

    match path {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))
        }
        None => load_config_from_env().context("Failed to load config from environment"),
    }
}

fn video_from_args(args: &VideoArgs) -> Result<Video> {
    let kind = if args.series.is_some() {
        GuessKind::Episode
    } else {
        GuessKind::Movie
    };
    let attributes = args
        .release
        .as_deref()
        .map(|release| {
            let guess = guess_release(release, kind);
            ReleaseAttributes {
                year: guess.year,
                release_group: guess.release_group,
                resolution: guess.resolution,
                source: guess.source,
                video_codec: guess.video_codec,
                audio_codec: guess.audio_codec,
            }
        })
        .unwrap_or_default();

    let video = match (&args.series, args.season, args.episode, &args.title) {
        (Some(series), Some(season), Some(episode), title) => {
            let mut video = Video::episode(series.clone(), season, episode);
            if let Video::Episode(e) = &mut video {
                e.title = title.clone();
            }
            video
        }
        (Some(_), _, _, _) => bail!("--series requires both --season and --episode"),
        (None, None, None, Some(title)) => Video::movie(title.clone()),
        (None, _, _, Some(_)) => bail!("--season and --episode require --series"),
        (None, _, _, None) => bail!("either --series/--season/--episode or --title is required"),
    };

    Ok(video.with_attributes(attributes))
}

fn languages_from(args: &VideoArgs, config: &Config) -> Result<BTreeSet<Language>> {
    let codes = if args.languages.is_empty() {
        &config.languages
    } else {
        &args.languages
    };
    codes
        .iter()
        .map(|code| Language::from_alpha2(code).with_context(|| format!("Invalid language {:?}", code)))
        .collect()
}

/// Records with their tags, most tags first, then most downloaded.
fn rank(records: Vec<SubtitleRecord>, video: &Video) -> Vec<(SubtitleRecord, BTreeSet<MatchTag>)> {
    let mut ranked: Vec<_> = records
        .into_iter()
        .map(|r| {
            let tags = r.matches(video);
            (r, tags)
        })
        .collect();
    ranked.sort_by(|(a, a_tags), (b, b_tags)| {
        b_tags
            .len()
            .cmp(&a_tags.len())
            .then(b.download_count.cmp(&a.download_count))
            .then(a.id.cmp(&b.id))
    });
    ranked
}

async fn find(
    provider: &SubsCenterProvider,
    config: &Config,
    args: &VideoArgs,
) -> Result<Vec<(SubtitleRecord, BTreeSet<MatchTag>)>> {
    let video = video_from_args(args)?;
    let languages = languages_from(args, config)?;

    let unsupported: HashSet<&str> = languages
        .iter()
        .filter(|l| !SubsCenterProvider::supports_language(l))
        .map(|l| l.alpha2())
        .collect();
    if !unsupported.is_empty() {
        tracing::warn!(languages = ?unsupported, "Languages not served by {}", SubsCenterProvider::NAME);
    }

    let records = provider
        .list_subtitles(&video, &languages)
        .await
        .context("Failed to list subtitles")?;
    Ok(rank(records, &video))
}

async fn list(provider: &SubsCenterProvider, config: &Config, args: &VideoArgs) -> Result<()> {
    let ranked = find(provider, config, args).await?;
    info!(count = ranked.len(), "Listing subtitles");

    for (record, tags) in &ranked {
        let tags: Vec<&str> = tags.iter().map(MatchTag::as_str).collect();
        println!(
            "{}\t{}{}\t{}\t{}\t{}",
            record.id,
            record.language.alpha2(),
            if record.hearing_impaired { " (HI)" } else { "" },
            record.download_count,
            tags.join(","),
            record.releases.join(" | ")
        );
    }
    Ok(())
}

async fn download(
    provider: &SubsCenterProvider,
    config: &Config,
    args: &VideoArgs,
    id: Option<u64>,
    output: Option<&Path>,
) -> Result<()> {
    let ranked = find(provider, config, args).await?;

    let record = match id {
        Some(id) => ranked
            .into_iter()
            .map(|(r, _)| r)
            .find(|r| r.id == id)
            .with_context(|| format!("No subtitle with id {}", id))?,
        None => ranked
            .into_iter()
            .map(|(r, _)| r)
            .next()
            .context("No subtitles found")?,
    };

    let content = provider
        .download_subtitle(&record)
        .await
        .with_context(|| format!("Failed to download subtitle {}", record.id))?;

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(format!("{}.{}.srt", record.id, record.language.alpha2())));
    tokio::fs::write(&path, &content)
        .await
        .with_context(|| format!("Failed to write {:?}", path))?;

    info!(id = record.id, path = ?path, bytes = content.len(), "Saved subtitle");
    println!("{}", path.display());
    Ok(())
}

fn print_metrics() -> Result<()> {
    let families = metrics::registry().gather();
    let text = prometheus::TextEncoder::new()
        .encode_to_string(&families)
        .context("Failed to encode metrics")?;
    eprint!("{}", text);
    Ok(())
}
