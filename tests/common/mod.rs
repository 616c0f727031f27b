#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use carousel_frame::config::{CarouselConfig, CarouselInput, ImageSource};
use carousel_frame::dom::{Document, NodeId};
use carousel_frame::error::{Error, Result};
use carousel_frame::events::{ImageDescriptor, PlayState};
use carousel_frame::tasks::controller::{Autoplay, NavigationController, StripState};
use carousel_frame::tasks::loader::ImageLoader;
use tokio::time::Instant;

/// Loader that hands back a fixed list and counts how often it was asked.
#[derive(Debug, Default)]
pub struct StubLoader {
    pub items: Vec<ImageDescriptor>,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl StubLoader {
    pub fn with(items: &[(&str, &str)]) -> Self {
        Self {
            items: items
                .iter()
                .map(|(path, title)| ImageDescriptor::new(*path, *title))
                .collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageLoader for StubLoader {
    async fn load(&self, source: &ImageSource) -> Result<Vec<ImageDescriptor>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::SourceFetchFailed {
                origin: source.to_string(),
                reason: "offline".into(),
            });
        }
        Ok(self.items.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    AutoMove,
    Stop,
    Move(i64),
    Download,
    TogglePause,
    Tick,
}

/// Autoplay wrapper that records every controller call.
#[derive(Debug, Default)]
pub struct Recording {
    pub calls: Vec<Call>,
    inner: Autoplay,
}

impl NavigationController for Recording {
    fn auto_move(&mut self, strip: &StripState) {
        self.calls.push(Call::AutoMove);
        self.inner.auto_move(strip);
    }

    fn stop(&mut self) {
        self.calls.push(Call::Stop);
        self.inner.stop();
    }

    fn move_by_step(&mut self, strip: &mut StripState, step: i64) {
        self.calls.push(Call::Move(step));
        self.inner.move_by_step(strip, step);
    }

    fn download_visible(&mut self, strip: &StripState) -> Option<usize> {
        self.calls.push(Call::Download);
        self.inner.download_visible(strip)
    }

    fn toggle_pause(&mut self, strip: &StripState) -> PlayState {
        self.calls.push(Call::TogglePause);
        self.inner.toggle_pause(strip)
    }

    fn next_tick(&self) -> Option<Instant> {
        self.inner.next_tick()
    }

    fn tick(&mut self, strip: &mut StripState) {
        self.calls.push(Call::Tick);
        self.inner.tick(strip);
    }
}

pub fn config(yaml: &str) -> CarouselConfig {
    serde_yaml::from_str::<CarouselInput>(yaml)
        .unwrap()
        .validated()
        .unwrap()
}

/// A document whose body holds one empty `div` per id.
pub fn document_with(ids: &[&str]) -> (Document, Vec<NodeId>) {
    let mut doc = Document::new();
    let nodes = ids
        .iter()
        .map(|id| {
            let div = doc.create_element("div");
            doc.set_id(div, id);
            doc.append_child(doc.body(), div);
            div
        })
        .collect();
    (doc, nodes)
}
