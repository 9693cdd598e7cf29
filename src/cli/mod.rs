use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::{self, Config};
use crate::cover::HttpCoverFetcher;
use crate::domain::audio::AudioPayload;
use crate::logging;
use crate::pipeline::{AudioMode, Pipeline};
use crate::resolver::DeezerResolver;
use crate::tagging::TagWriter;
use crate::transcode::FfmpegTranscoder;

#[derive(Parser)]
#[command(name = "tagdeck")]
#[command(version = "0.1")]
#[command(about = "Find track metadata by file name and embed it into an MP3")]
pub struct Cli {
    /// Path to the config TOML file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    Serve,
    /// Look up metadata for an "Artist - Title.mp3" file name
    Lookup {
        file_name: String,
    },
    /// Transcode and tag a local audio file
    Tag {
        /// Input file, named "Artist - Title.mp3"
        input: PathBuf,
        /// Where to write the tagged file (default: "<Artist> - <Title>.mp3" next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Keep the input MP3 stream as is, only replace its tag
        #[arg(long)]
        no_transcode: bool,
    },
}

pub fn build_pipeline(cfg: &Config) -> Pipeline {
    Pipeline::new(
        Box::new(DeezerResolver::new(&cfg.resolver)),
        Box::new(HttpCoverFetcher::new(&cfg.cover)),
        Box::new(FfmpegTranscoder::new(cfg.transcode.clone())),
        TagWriter::new(cfg.tagging.max_tag_size),
    )
}

/// Entrypoint for CLI
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init();

    let cfg = config::Config::load(&cli.config.to_string_lossy())?;

    match cli.command {
        Commands::Serve => {
            let pipeline = build_pipeline(&cfg);
            let http_server = crate::http::server::HttpServer::new(pipeline, cfg.http);

            println!(
                "HTTP server running at http://{}:{}",
                http_server.config.bind_addr, http_server.config.port
            );
            http_server.run();
        }

        Commands::Lookup { file_name } => {
            let metadata = build_pipeline(&cfg).lookup(&file_name)?;

            println!("Title:   {}", metadata.title);
            println!("Artist:  {}", metadata.artist);
            println!("Album:   {}", metadata.album);
            println!("Genres:  {}", metadata.genres);
            println!("Release: {}", metadata.release_date);
            match metadata.track_number {
                Some(n) => println!("Track:   {n}"),
                None => println!("Track:   (no exact match on the album)"),
            }
            if let Some(url) = metadata.cover_url() {
                println!("Cover:   {url}");
            }
        }

        Commands::Tag {
            input,
            output,
            no_transcode,
        } => {
            let output = tag_file(&cfg, &input, output, no_transcode)?;
            println!("Wrote {}", output.to_string_lossy());
        }
    }

    Ok(())
}

fn tag_file(
    cfg: &Config,
    input: &Path,
    output: Option<PathBuf>,
    no_transcode: bool,
) -> anyhow::Result<PathBuf> {
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", input.display()))?;
    let bytes =
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;

    let mode = if no_transcode {
        AudioMode::PassThrough
    } else {
        AudioMode::Transcode
    };
    let track = build_pipeline(cfg).run(&AudioPayload::new(file_name, bytes), mode)?;

    let output = output.unwrap_or_else(|| {
        input
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&track.file_name)
    });
    write_atomically(&output, &track.bytes)?;
    Ok(output)
}

/// Write through a temp file in the target directory so a failed write never leaves a
/// truncated MP3 behind.
fn write_atomically(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    use std::io::Write;

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    tmp.write_all(bytes)?;
    tmp.persist(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
