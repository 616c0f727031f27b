use serde::Deserialize;

use crate::dom::NodeId;

/// One image in the carousel, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageDescriptor {
    pub path: String,
    #[serde(default)]
    pub title: String,
}

impl ImageDescriptor {
    pub fn new(path: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
        }
    }
}

/// Schema of a local/remote JSON image list: `{ "items": [...] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageFeed {
    pub items: Vec<ImageDescriptor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

/// The navigation controls a carousel creates. Clicks are classified by
/// node identity, never by class name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Chevron(Side),
    Download,
    Pause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Playing,
    Paused,
}

/// Natural dimensions of a loaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct Click {
    pub target: NodeId,
}

#[derive(Debug, Clone, Copy)]
pub struct ImageLoaded {
    pub slide: usize,
    pub size: ImageSize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub index: usize,
    pub image: ImageDescriptor,
}

/// What a dispatched click did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Moved { index: usize },
    Download(DownloadRequest),
    PauseToggled(PlayState),
}
