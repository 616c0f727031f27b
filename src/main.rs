//! Binary entrypoint for the carousel.
//!
//! Renders one carousel into an in-memory document, then either writes the
//! markup and exits or plays it, taking control clicks from stdin.

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use carousel_frame::Carousel;
use carousel_frame::config::CarouselInput;
use carousel_frame::dom::Document;
use carousel_frame::events::{Click, Control, DownloadRequest, ImageLoaded, Side};
use carousel_frame::tasks::controller::Autoplay;
use carousel_frame::tasks::loader::{self, SourceLoader};
use carousel_frame::tasks::{download, player};
use clap::{ArgAction, Parser};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "carousel-frame", version, about = "Image carousel widget")]
struct Args {
    /// Path to YAML carousel config
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Write the rendered document here (on exit when playing)
    #[arg(long, value_name = "FILE")]
    html: Option<PathBuf>,

    /// Wait for every image to load, write the markup and exit
    #[arg(long)]
    render_only: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive(format!("carousel_frame={level}").parse()?)
        .add_directive("reqwest=warn".parse()?);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

fn parse_command(line: &str) -> Option<Control> {
    match line.trim().to_ascii_lowercase().as_str() {
        "prev" | "left" | "p" => Some(Control::Chevron(Side::Left)),
        "next" | "right" | "n" => Some(Control::Chevron(Side::Right)),
        "download" | "d" => Some(Control::Download),
        "pause" | "space" => Some(Control::Pause),
        _ => None,
    }
}

fn write_html(doc: &Document, path: &Path) -> Result<()> {
    let page = format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"></head>{}</html>\n",
        doc.outer_html(doc.body())
    );
    std::fs::write(path, page).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "document written");
    Ok(())
}

/// Waits for the probe task, logging a panic or abort instead of dropping it.
async fn join_probes(probes: JoinHandle<()>) -> bool {
    match probes.await {
        Ok(()) => true,
        Err(err) => {
            warn!("image probe task failed: {err}");
            false
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    let cfg = CarouselInput::from_yaml_file(&args.config)
        .with_context(|| format!("failed to load configuration from {}", args.config.display()))?
        .validated()
        .context("invalid configuration values")?;
    info!(
        container = %cfg.container_id,
        source = %cfg.source,
        width = cfg.options.width,
        height = cfg.options.height,
        transition = %humantime::format_duration(cfg.options.transition),
        "configuration loaded"
    );

    let mut doc = Document::new();
    let container = doc.create_element("div");
    doc.set_id(container, &cfg.container_id);
    doc.append_child(doc.body(), container);

    let source_loader = SourceLoader::new(cfg.flickr_endpoint.clone())?;
    let mut carousel = Carousel::create(&mut doc, &cfg, &source_loader, Autoplay::new())
        .await
        .context("creating carousel")?;

    let cancel = CancellationToken::new();
    let base = loader::image_base(&cfg.source);
    let (loaded_tx, mut loaded_rx) = mpsc::channel::<ImageLoaded>(32);
    let probes = tokio::spawn(loader::run_probes(
        source_loader.client().clone(),
        base.clone(),
        carousel.images().to_vec(),
        loaded_tx,
        cancel.clone(),
    ));

    if args.render_only {
        while let Some(ImageLoaded { slide, size }) = loaded_rx.recv().await {
            carousel.on_image_load(&mut doc, slide, size);
        }
        join_probes(probes).await;
        match &args.html {
            Some(path) => write_html(&doc, path)?,
            None => println!("{}", doc.outer_html(carousel.root())),
        }
        return Ok(());
    }

    // Ctrl-C cancels everything
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received; shutting down");
                cancel.cancel();
            }
        });
    }

    // stdin lines -> clicks on the matching control; EOF or `quit` closes the channel
    let (click_tx, click_rx) = mpsc::channel::<Click>(16);
    let targets: Vec<(Control, _)> = [
        Control::Chevron(Side::Left),
        Control::Chevron(Side::Right),
        Control::Download,
        Control::Pause,
    ]
    .into_iter()
    .filter_map(|c| carousel.control_node(c).map(|node| (c, node)))
    .collect();
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if matches!(line.trim(), "quit" | "q" | "exit") {
                break;
            }
            let Some(control) = parse_command(&line) else {
                warn!(input = %line.trim(), "unknown command (prev, next, download, pause, quit)");
                continue;
            };
            if let Some((_, target)) = targets.iter().find(|(c, _)| *c == control) {
                if click_tx.blocking_send(Click { target: *target }).is_err() {
                    break;
                }
            }
        }
    });

    let downloads = match cfg.download_dir.clone() {
        Some(dir) => {
            let (tx, rx) = mpsc::channel::<DownloadRequest>(8);
            tokio::spawn(download::run(
                rx,
                source_loader.client().clone(),
                base,
                dir,
                cancel.clone(),
            ));
            Some(tx)
        }
        None => None,
    };

    player::run(&mut doc, &mut carousel, click_rx, loaded_rx, downloads, cancel.clone()).await?;
    cancel.cancel();
    join_probes(probes).await;

    if let Some(path) = &args.html {
        write_html(&doc, path)?;
    }
    Ok(())
}
