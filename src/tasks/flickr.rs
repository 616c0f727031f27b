use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::events::ImageDescriptor;
use crate::tasks::loader::fetch_bytes;

#[derive(Debug, Deserialize)]
struct PublicFeed {
    #[serde(default)]
    items: Vec<FeedItem>,
}

#[derive(Debug, Deserialize)]
struct FeedItem {
    #[serde(default)]
    title: String,
    media: FeedMedia,
}

#[derive(Debug, Deserialize)]
struct FeedMedia {
    m: String,
}

/// Builds the public-feed query URL for `tag`.
pub fn feed_url(endpoint: &str, tag: &str) -> Result<Url> {
    Url::parse_with_params(
        endpoint,
        &[("tags", tag), ("format", "json"), ("nojsoncallback", "1")],
    )
    .map_err(|err| Error::InvalidConfig(format!("bad flickr endpoint {endpoint}: {err}")))
}

/// Queries the public photo feed for `tag`, in feed order.
#[instrument(skip(client))]
pub async fn fetch_tag(client: &Client, endpoint: &str, tag: &str) -> Result<Vec<ImageDescriptor>> {
    let url = feed_url(endpoint, tag)?;
    let origin = format!("flickr:{tag}");
    let body = fetch_bytes(client, url.as_str())
        .await
        .map_err(|err| match err {
            Error::SourceFetchFailed { reason, .. } => Error::fetch(&origin, reason),
            other => other,
        })?;
    let items = parse_feed(&origin, &body)?;
    debug!(count = items.len(), "flickr feed parsed");
    Ok(items)
}

/// Maps a public-feed payload to image descriptors (medium-size media URL + title).
pub fn parse_feed(origin: &str, body: &[u8]) -> Result<Vec<ImageDescriptor>> {
    let text = unescape_single_quotes(&String::from_utf8_lossy(body));
    let feed: PublicFeed =
        serde_json::from_str(&text).map_err(|err| Error::malformed(origin, err))?;
    Ok(feed
        .items
        .into_iter()
        .map(|item| ImageDescriptor::new(item.media.m, item.title))
        .collect())
}

/// The feed escapes single quotes as `\'`, which is not valid JSON. Drops
/// that backslash while leaving every other escape pair, `\\` included, intact.
fn unescape_single_quotes(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\'') => out.push('\''),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    out
}
