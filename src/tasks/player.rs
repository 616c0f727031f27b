use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::carousel::Carousel;
use crate::dom::{Document, EventKind};
use crate::events::{Click, ClickOutcome, DownloadRequest, ImageLoaded};
use crate::tasks::controller::NavigationController;

/// Drives one carousel until cancelled or until the click source closes.
///
/// Rules:
/// - All document and carousel mutation happens on this task.
/// - Clicks reach the carousel only through the root's delegated listener.
/// - Image load reports resize their own slide and nothing else.
/// - Autoplay advances whenever the controller's deadline passes.
pub async fn run<C: NavigationController>(
    doc: &mut Document,
    carousel: &mut Carousel<C>,
    mut clicks: Receiver<Click>,
    mut loaded: Receiver<ImageLoaded>,
    downloads: Option<Sender<DownloadRequest>>,
    cancel: CancellationToken,
) -> Result<()> {
    loop {
        let deadline = carousel.next_tick();
        select! {
            _ = cancel.cancelled() => break,

            maybe_click = clicks.recv() => {
                let Some(Click { target }) = maybe_click else {
                    info!("click source closed; stopping player");
                    break;
                };
                if doc.listener_for(target, EventKind::Click) != Some(carousel.root()) {
                    trace!(?target, "click outside carousel");
                    continue;
                }
                match carousel.handle_click(doc, target) {
                    Some(ClickOutcome::Download(req)) => {
                        info!(index = req.index, path = %req.image.path, "download requested");
                        if let Some(tx) = &downloads {
                            if tx.send(req).await.is_err() {
                                warn!("download channel closed");
                            }
                        }
                    }
                    Some(outcome) => debug!(?outcome, "click handled"),
                    None => trace!(?target, "click ignored"),
                }
            }

            Some(ImageLoaded { slide, size }) = loaded.recv() => {
                if let Some(fit) = carousel.on_image_load(doc, slide, size) {
                    trace!(slide, ?fit, "slide fitted");
                }
            }

            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if let Some(index) = carousel.tick(doc) {
                    let title = carousel.visible_image().map(|img| img.title.as_str()).unwrap_or_default();
                    info!(index, title, "autoplay advanced");
                }
            }
        }
    }
    Ok(())
}
