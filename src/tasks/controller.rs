use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, trace};

use crate::config::CarouselOptions;
use crate::events::PlayState;

/// Positional bookkeeping for one filmstrip.
///
/// `offset` is the strip's left shift in pixels: 0 shows the first slide,
/// `-width * n` shows slide `n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripState {
    pub offset: i64,
    pub auto_step: i64,
    pub transition: Duration,
    pub viewing_width: u32,
    pub total_width: u64,
}

impl StripState {
    pub fn new(options: &CarouselOptions, slides: usize) -> Self {
        Self {
            offset: 0,
            auto_step: -options.step(),
            transition: options.transition,
            viewing_width: options.width,
            total_width: u64::from(options.width) * slides as u64,
        }
    }

    pub fn slide_count(&self) -> usize {
        if self.viewing_width == 0 {
            return 0;
        }
        (self.total_width / u64::from(self.viewing_width)) as usize
    }

    pub fn visible_index(&self) -> Option<usize> {
        if self.slide_count() == 0 {
            return None;
        }
        Some((-self.offset / i64::from(self.viewing_width)) as usize)
    }

    /// Shifts the strip by `step` pixels, wrapping cyclically at either end.
    pub fn shift(&mut self, step: i64) {
        let total = self.total_width as i64;
        if total == 0 {
            return;
        }
        let last = -(total - i64::from(self.viewing_width));
        let next = self.offset + step;
        self.offset = if next > 0 {
            last
        } else if next < last {
            0
        } else {
            next
        };
    }
}

/// Moves a carousel's filmstrip, either on a timer or on request.
pub trait NavigationController {
    /// Schedules periodic advancement from now.
    fn auto_move(&mut self, strip: &StripState);
    /// Cancels any scheduled advancement.
    fn stop(&mut self);
    fn move_by_step(&mut self, strip: &mut StripState, step: i64);
    /// Index of the slide to download, if any is visible.
    fn download_visible(&mut self, strip: &StripState) -> Option<usize>;
    fn toggle_pause(&mut self, strip: &StripState) -> PlayState;
    /// When the next automatic advance is due.
    fn next_tick(&self) -> Option<Instant>;
    /// Performs the due automatic advance and schedules the following one.
    fn tick(&mut self, strip: &mut StripState);
}

/// Timer-driven controller used by the player loop.
#[derive(Debug, Default)]
pub struct Autoplay {
    deadline: Option<Instant>,
    paused: bool,
}

impl Autoplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn play_state(&self) -> PlayState {
        if self.paused {
            PlayState::Paused
        } else {
            PlayState::Playing
        }
    }
}

impl NavigationController for Autoplay {
    fn auto_move(&mut self, strip: &StripState) {
        if self.paused || strip.slide_count() < 2 {
            self.deadline = None;
            return;
        }
        self.deadline = Some(Instant::now() + strip.transition);
        trace!(after = ?strip.transition, "autoplay scheduled");
    }

    fn stop(&mut self) {
        self.deadline = None;
    }

    fn move_by_step(&mut self, strip: &mut StripState, step: i64) {
        strip.shift(step);
        debug!(offset = strip.offset, step, "strip moved");
    }

    fn download_visible(&mut self, strip: &StripState) -> Option<usize> {
        strip.visible_index()
    }

    fn toggle_pause(&mut self, strip: &StripState) -> PlayState {
        self.paused = !self.paused;
        if self.paused {
            self.stop();
        } else {
            self.auto_move(strip);
        }
        self.play_state()
    }

    fn next_tick(&self) -> Option<Instant> {
        self.deadline
    }

    fn tick(&mut self, strip: &mut StripState) {
        let step = strip.auto_step;
        self.move_by_step(strip, step);
        self.auto_move(strip);
    }
}
