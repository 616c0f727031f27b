//! A single carousel: owns one container element's subtree, its image list and
//! the navigation controller that moves the filmstrip.
//!
//! Building is a two-step affair once images arrive: [`Carousel::render_images`]
//! lays out `carousel > viewport > filmstrip > li > img`, then
//! [`Carousel::add_navigation`] injects the controls and starts autoplay.

use std::collections::HashMap;

use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::config::{CarouselConfig, CarouselOptions, ViewMode};
use crate::dom::{Document, EventKind, NodeId};
use crate::error::{Error, Result};
use crate::events::{
    ClickOutcome, Control, DownloadRequest, ImageDescriptor, ImageSize, PlayState, Side,
};
use crate::tasks::controller::{NavigationController, StripState};
use crate::tasks::loader::ImageLoader;

/// How a loaded image is sized inside its slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageFit {
    /// `height: 100%` on the image.
    pub fill_height: bool,
    /// `width: 100%` on the image.
    pub fill_width: bool,
    /// Line height (px) set on the slide to centre a short image vertically.
    pub line_height: Option<u32>,
}

/// Decides the fit for one image given its natural size.
///
/// Tall images fill the viewport height. Shorter ones are centred with a
/// line-height; in portrait mode they additionally fill the width when they
/// are wider than the viewport.
pub fn fit_image(options: &CarouselOptions, natural: ImageSize) -> ImageFit {
    if natural.height > options.height {
        return ImageFit {
            fill_height: true,
            ..ImageFit::default()
        };
    }
    ImageFit {
        fill_height: false,
        fill_width: options.view_mode == ViewMode::Portrait && natural.width > options.width,
        line_height: Some(options.height),
    }
}

#[derive(Debug, Clone, Copy)]
struct Slide {
    item: NodeId,
    image: NodeId,
}

#[derive(Debug)]
pub struct Carousel<C> {
    id: String,
    root: NodeId,
    options: CarouselOptions,
    images: Vec<ImageDescriptor>,
    controller: C,
    strip: StripState,
    filmstrip: Option<NodeId>,
    slides: Vec<Slide>,
    controls: HashMap<NodeId, Control>,
}

impl<C: NavigationController> Carousel<C> {
    /// Resolves the container, fetches the image list, then renders and wires
    /// navigation. Nothing is rendered unless every step succeeds.
    #[instrument(skip_all, fields(container = %config.container_id, source = %config.source))]
    pub async fn create<L: ImageLoader>(
        doc: &mut Document,
        config: &CarouselConfig,
        loader: &L,
        controller: C,
    ) -> Result<Self> {
        let root = doc
            .get_element_by_id(&config.container_id)
            .ok_or_else(|| Error::ContainerNotFound(config.container_id.clone()))?;

        let images = loader.load(&config.source).await?;
        if let Some(pos) = images.iter().position(|img| img.path.trim().is_empty()) {
            return Err(Error::malformed(
                config.source.to_string(),
                format!("item {pos} has an empty path"),
            ));
        }
        if images.is_empty() {
            warn!("image source returned no items");
        }

        let mut carousel = Self::new(
            &config.container_id,
            root,
            config.options.clone(),
            images,
            controller,
        );
        carousel.render_images(doc);
        carousel.add_navigation(doc);
        info!(images = carousel.images.len(), "carousel ready");
        Ok(carousel)
    }

    /// Builds an unrendered carousel around an existing root element.
    pub fn new(
        id: &str,
        root: NodeId,
        options: CarouselOptions,
        images: Vec<ImageDescriptor>,
        controller: C,
    ) -> Self {
        let strip = StripState::new(&options, images.len());
        Self {
            id: id.to_string(),
            root,
            options,
            images,
            controller,
            strip,
            filmstrip: None,
            slides: Vec::new(),
            controls: HashMap::new(),
        }
    }

    pub fn render_images(&mut self, doc: &mut Document) {
        let w = self.options.width;
        let h = self.options.height;
        let viewport = doc.create_element("div");
        let filmstrip = doc.create_element("ul");

        doc.set_class_name(self.root, "carousel");
        doc.set_class_name(viewport, "viewport");
        doc.set_class_name(filmstrip, "filmstrip");

        if let Some(bg) = &self.options.background {
            doc.set_style(viewport, "background-color", bg);
        }

        doc.set_style(self.root, "width", &px(w));
        doc.set_style(self.root, "height", &px(h));
        doc.set_style(filmstrip, "width", &format!("{}px", self.strip.total_width));

        self.slides.clear();
        for image in &self.images {
            let item = doc.create_element("li");
            let img = doc.create_element("img");
            doc.set_style(item, "width", &px(w));
            doc.set_attribute(img, "src", &image.path);
            doc.set_attribute(img, "alt", &image.title);
            doc.set_attribute(img, "title", &image.title);
            doc.append_child(item, img);
            doc.append_child(filmstrip, item);
            self.slides.push(Slide { item, image: img });
        }

        doc.append_child(viewport, filmstrip);
        doc.append_child(self.root, viewport);
        self.filmstrip = Some(filmstrip);
        self.apply_offset(doc);
        debug!(container = %self.id, slides = self.slides.len(), "filmstrip rendered");
    }

    pub fn add_navigation(&mut self, doc: &mut Document) {
        let navigation = doc.create_element("div");
        let left = doc.create_element("div");
        let right = doc.create_element("div");
        let download = doc.create_element("a");
        let pause = doc.create_element("a");

        doc.set_class_name(navigation, "navigation");
        doc.set_class_name(right, "chevron rightChev");
        doc.set_class_name(left, "chevron leftChev");
        doc.set_class_name(download, "download");
        doc.set_class_name(pause, "pause");
        doc.set_attribute(download, "download", "");

        for node in [left, right, download, pause] {
            doc.append_child(navigation, node);
        }
        doc.prepend_child(self.root, navigation);

        self.controls = HashMap::from([
            (left, Control::Chevron(Side::Left)),
            (right, Control::Chevron(Side::Right)),
            (download, Control::Download),
            (pause, Control::Pause),
        ]);

        doc.add_event_listener(self.root, EventKind::Click);
        self.controller.auto_move(&self.strip);
    }

    /// Routes a click on `target` to the controller. Clicks outside this
    /// carousel, on anything but a control, or on a carousel without slides
    /// are ignored.
    pub fn handle_click(&mut self, doc: &mut Document, target: NodeId) -> Option<ClickOutcome> {
        if self.strip.slide_count() == 0 || !doc.contains(self.root, target) {
            return None;
        }
        let control = *self.controls.get(&target)?;
        debug!(container = %self.id, ?control, "control clicked");
        match control {
            Control::Chevron(side) => {
                let step = self.step_for(side);
                self.controller.move_by_step(&mut self.strip, step);
                self.controller.stop();
                self.controller.auto_move(&self.strip);
                self.apply_offset(doc);
                Some(ClickOutcome::Moved {
                    index: self.strip.visible_index()?,
                })
            }
            Control::Download => {
                let index = self.controller.download_visible(&self.strip)?;
                let image = self.images.get(index)?.clone();
                doc.set_attribute(target, "href", &image.path);
                Some(ClickOutcome::Download(DownloadRequest { index, image }))
            }
            Control::Pause => {
                let state = self.controller.toggle_pause(&self.strip);
                let pressed = matches!(state, PlayState::Paused);
                doc.set_attribute(target, "aria-pressed", if pressed { "true" } else { "false" });
                Some(ClickOutcome::PauseToggled(state))
            }
        }
    }

    /// Performs a due autoplay advance; returns the newly visible slide.
    pub fn tick(&mut self, doc: &mut Document) -> Option<usize> {
        self.controller.tick(&mut self.strip);
        self.apply_offset(doc);
        self.strip.visible_index()
    }

    /// Applies the size fit once slide `slide`'s image has loaded.
    pub fn on_image_load(&self, doc: &mut Document, slide: usize, natural: ImageSize) -> Option<ImageFit> {
        let Slide { item, image } = *self.slides.get(slide)?;
        let fit = fit_image(&self.options, natural);
        if fit.fill_height {
            doc.set_style(image, "height", "100%");
        }
        if fit.fill_width {
            doc.set_style(image, "width", "100%");
        }
        if let Some(line_height) = fit.line_height {
            doc.set_style(item, "line-height", &px(line_height));
        }
        Some(fit)
    }

    fn step_for(&self, side: Side) -> i64 {
        match side {
            Side::Left => self.options.step(),
            Side::Right => -self.options.step(),
        }
    }

    fn apply_offset(&self, doc: &mut Document) {
        if let Some(filmstrip) = self.filmstrip {
            doc.set_style(filmstrip, "margin-left", &format!("{}px", self.strip.offset));
            doc.set_style(
                filmstrip,
                "transition",
                &format!("margin-left {}ms", self.strip.transition.as_millis()),
            );
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn options(&self) -> &CarouselOptions {
        &self.options
    }

    pub fn images(&self) -> &[ImageDescriptor] {
        &self.images
    }

    pub fn strip(&self) -> &StripState {
        &self.strip
    }

    pub fn filmstrip(&self) -> Option<NodeId> {
        self.filmstrip
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn control_node(&self, control: Control) -> Option<NodeId> {
        self.controls
            .iter()
            .find(|(_, c)| **c == control)
            .map(|(node, _)| *node)
    }

    pub fn slide_nodes(&self) -> Vec<NodeId> {
        self.slides.iter().map(|s| s.item).collect()
    }

    pub fn next_tick(&self) -> Option<Instant> {
        self.controller.next_tick()
    }

    pub fn visible_image(&self) -> Option<&ImageDescriptor> {
        self.images.get(self.strip.visible_index()?)
    }
}

fn px(value: u32) -> String {
    format!("{value}px")
}
