use std::path::{Path, PathBuf};

use reqwest::Client;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::events::DownloadRequest;
use crate::tasks::loader::{fetch_bytes, is_remote, resolve_local};

/// File name a download is saved under: the last path segment without any
/// query string, prefixed by the slide index so repeated names don't clash.
pub fn target_name(req: &DownloadRequest) -> String {
    let trimmed = req.image.path.split(['?', '#']).next().unwrap_or_default();
    let name = trimmed
        .rsplit(['/', '\\'])
        .find(|segment| !segment.is_empty())
        .unwrap_or("image");
    format!("{:03}-{}", req.index, name)
}

/// Saves the requested image into `dir`, fetching remote images over HTTP.
pub async fn save(
    client: &Client,
    base: Option<&Path>,
    dir: &Path,
    req: &DownloadRequest,
) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let dest = dir.join(target_name(req));
    if is_remote(&req.image.path) {
        let bytes = fetch_bytes(client, &req.image.path).await?;
        tokio::fs::write(&dest, bytes).await?;
    } else {
        let src = resolve_local(base, &req.image.path);
        tokio::fs::copy(&src, &dest)
            .await
            .map_err(|err| Error::fetch(src.display().to_string(), err))?;
    }
    Ok(dest)
}

pub async fn run(
    mut requests: Receiver<DownloadRequest>,
    client: Client,
    base: Option<PathBuf>,
    dir: PathBuf,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            maybe_req = requests.recv() => {
                let Some(req) = maybe_req else { break };
                match save(&client, base.as_deref(), &dir, &req).await {
                    Ok(dest) => info!(index = req.index, path = %dest.display(), "download saved"),
                    Err(err) => warn!(index = req.index, "download failed: {err}"),
                }
            }
        }
    }
}
