use std::fs::File;
use std::io::{BufWriter, Write};

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

pub use arguments::Arguments;
pub use errors::TilerError;
pub use grid::TileGrid;
pub use image_cache::ImageCache;
pub use result::{ResultShape, TileRecord, TileResult, TilerEvent, TilingRequest};
pub use tile::Tile;
pub use tiler::{tile_image, Tiler, TilerConfig, TILE_SIZE};
pub use vec2d::Vec2d;

mod arguments;
mod errors;
mod vec2d;

pub mod encoder;
pub mod grid;
pub mod image_cache;
pub mod network;
pub mod result;
pub mod tile;
pub mod tiler;

fn progress_bar(n: usize) -> ProgressBar {
    let progress = ProgressBar::new(n as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[ETA:{eta}] {bar:40.cyan/blue} {pos:>4}/{len:4} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    progress
}

fn output(args: &Arguments) -> Result<Box<dyn Write + Send>, TilerError> {
    Ok(match &args.outfile {
        Some(path) => {
            info!("Writing the results to {}", path.to_string_lossy());
            Box::new(BufWriter::new(File::create(path)?))
        }
        None => Box::new(std::io::stdout()),
    })
}

/// Send the locators given on the command line, or read from stdin, to the tiler
async fn send_requests(
    uris: Vec<String>,
    requests: mpsc::Sender<TilingRequest>,
    progress: ProgressBar,
) -> Result<(), TilerError> {
    if uris.is_empty() {
        debug!("Reading image locations from the standard input");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let uri = line.trim();
            if uri.is_empty() {
                continue;
            }
            progress.inc_length(1);
            if requests.send(TilingRequest::from(uri)).await.is_err() {
                break;
            }
        }
    } else {
        for uri in uris {
            if requests.send(TilingRequest::from(uri)).await.is_err() {
                break;
            }
        }
    }
    Ok(())
}

/// Tile every requested image, writing one JSON event per line as results come in.
pub async fn run(args: &Arguments) -> Result<(), TilerError> {
    let mut out = output(args)?;
    let (sink, mut events) = mpsc::channel(args.parallelism.max(1));
    let (requests_sender, requests) = mpsc::channel(args.parallelism.max(1));
    let tiler = Tiler::from_args(args, sink)?;

    let progress = progress_bar(args.input_uris.len());
    progress.set_message("Tiling images...");

    let server = tokio::spawn(tiler.serve(requests));
    let reader = tokio::spawn(send_requests(args.input_uris.clone(), requests_sender, progress.clone()));

    let mut total = 0u64;
    let mut failed = 0u64;
    while let Some(event) = events.recv().await {
        total += 1;
        if event.is_failure() {
            failed += 1;
        }
        progress.inc(1);
        progress.set_message(format!("Finished {}", event.source().chars().take(64).collect::<String>()));
        serde_json::to_writer(&mut out, &event)?;
        writeln!(out)?;
        out.flush()?;
    }
    server.await?;
    reader.await??;
    progress.finish_with_message("Finished tiling");

    if failed > 0 {
        Err(TilerError::FailedRequests { failed, total })
    } else {
        Ok(())
    }
}
