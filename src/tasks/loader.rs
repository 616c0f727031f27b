use std::future::Future;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::config::ImageSource;
use crate::error::{Error, Result};
use crate::events::{ImageDescriptor, ImageFeed, ImageLoaded, ImageSize};
use crate::tasks::flickr;

/// Produces a carousel's image list from its configured source.
pub trait ImageLoader {
    fn load(
        &self,
        source: &ImageSource,
    ) -> impl Future<Output = Result<Vec<ImageDescriptor>>> + Send;
}

/// Loader for JSON feeds (local file or http URL) and remote tag queries.
#[derive(Debug, Clone)]
pub struct SourceLoader {
    client: Client,
    flickr_endpoint: String,
}

impl SourceLoader {
    pub fn new(flickr_endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| Error::fetch("http client", err))?;
        Ok(Self::with_client(client, flickr_endpoint))
    }

    pub fn with_client(client: Client, flickr_endpoint: impl Into<String>) -> Self {
        Self {
            client,
            flickr_endpoint: flickr_endpoint.into(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    #[instrument(skip(self))]
    async fn load_json(&self, path: &str) -> Result<Vec<ImageDescriptor>> {
        let body = if is_remote(path) {
            fetch_bytes(&self.client, path).await?
        } else {
            tokio::fs::read(path)
                .await
                .map_err(|err| Error::fetch(path, err))?
        };
        let items = parse_json_feed(path, &body)?;
        debug!(count = items.len(), "json feed parsed");
        Ok(items)
    }
}

impl ImageLoader for SourceLoader {
    async fn load(&self, source: &ImageSource) -> Result<Vec<ImageDescriptor>> {
        match source {
            ImageSource::FlickrTag(tag) => {
                flickr::fetch_tag(&self.client, &self.flickr_endpoint, tag).await
            }
            ImageSource::Json(path) => self.load_json(path).await,
        }
    }
}

pub fn parse_json_feed(origin: &str, body: &[u8]) -> Result<Vec<ImageDescriptor>> {
    let feed: ImageFeed = serde_json::from_slice(body).map_err(|err| Error::malformed(origin, err))?;
    Ok(feed.items)
}

pub fn is_remote(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

/// Directory relative image paths are resolved against: the JSON file's
/// directory for local feeds, none otherwise.
pub fn image_base(source: &ImageSource) -> Option<PathBuf> {
    match source {
        ImageSource::Json(path) if !is_remote(path) => Path::new(path)
            .parent()
            .map(Path::to_path_buf),
        _ => None,
    }
}

pub fn resolve_local(base: Option<&Path>, path: &str) -> PathBuf {
    let path = Path::new(path.strip_prefix("file://").unwrap_or(path));
    match base {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    }
}

pub(crate) async fn fetch_bytes(client: &Client, url: &str) -> Result<Vec<u8>> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|err| Error::fetch(url, err))?;
    if !response.status().is_success() {
        return Err(Error::fetch(url, format!("HTTP {}", response.status())));
    }
    let bytes = response.bytes().await.map_err(|err| Error::fetch(url, err))?;
    Ok(bytes.to_vec())
}

/// Reads an image's natural dimensions without decoding its pixels.
pub async fn probe_size(client: &Client, base: Option<&Path>, path: &str) -> Result<ImageSize> {
    let (width, height) = if is_remote(path) {
        let bytes = fetch_bytes(client, path).await?;
        image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|err| Error::fetch(path, err))?
            .into_dimensions()
            .map_err(|err| Error::malformed(path, err))?
    } else {
        let local = resolve_local(base, path);
        tokio::task::spawn_blocking(move || image::image_dimensions(&local))
            .await
            .map_err(|err| Error::fetch(path, err))?
            .map_err(|err| Error::malformed(path, err))?
    };
    Ok(ImageSize { width, height })
}

/// Probes every image concurrently, reporting each as it finishes. Images that
/// fail to load are logged and skipped; their slides keep the default sizing.
pub async fn run_probes(
    client: Client,
    base: Option<PathBuf>,
    images: Vec<ImageDescriptor>,
    to_player: Sender<ImageLoaded>,
    cancel: CancellationToken,
) {
    let mut tasks: JoinSet<(usize, String, Result<ImageSize>)> = JoinSet::new();
    for (slide, image) in images.into_iter().enumerate() {
        let client = client.clone();
        let base = base.clone();
        tasks.spawn(async move {
            let res = probe_size(&client, base.as_deref(), &image.path).await;
            (slide, image.path, res)
        });
    }

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tasks.abort_all();
                break;
            }
            joined = tasks.join_next() => match joined {
                Some(Ok((slide, _, Ok(size)))) => {
                    debug!(slide, width = size.width, height = size.height, "image loaded");
                    if to_player.send(ImageLoaded { slide, size }).await.is_err() {
                        break;
                    }
                }
                Some(Ok((slide, path, Err(err)))) => {
                    warn!(slide, %path, "image failed to load: {err}");
                }
                Some(Err(err)) => warn!("probe task failed: {err}"),
                None => break,
            }
        }
    }
}
