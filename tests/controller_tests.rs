use std::time::Duration;

use carousel_frame::config::CarouselOptions;
use carousel_frame::events::PlayState;
use carousel_frame::tasks::controller::{Autoplay, NavigationController, StripState};
use tokio::time::Instant;

fn strip(slides: usize) -> StripState {
    StripState::new(&CarouselOptions::new(400, 300, 250), slides)
}

#[test]
fn strip_metadata_follows_options() {
    let s = strip(4);
    assert_eq!(s.offset, 0);
    assert_eq!(s.auto_step, -400);
    assert_eq!(s.viewing_width, 400);
    assert_eq!(s.total_width, 1600);
    assert_eq!(s.transition, Duration::from_millis(250));
    assert_eq!(s.slide_count(), 4);
}

#[test]
fn manual_steps_cover_every_slide() {
    let mut s = strip(4);
    let visited: Vec<usize> = (0..5)
        .map(|_| {
            s.shift(-400);
            s.visible_index().unwrap()
        })
        .collect();
    assert_eq!(visited, vec![1, 2, 3, 0, 1]);
}

#[tokio::test]
async fn auto_move_schedules_one_transition_ahead() {
    let s = strip(3);
    let mut ctl = Autoplay::new();
    assert!(ctl.next_tick().is_none());
    let before = Instant::now();
    ctl.auto_move(&s);
    let due = ctl.next_tick().unwrap();
    assert!(due >= before + Duration::from_millis(250));
    ctl.stop();
    assert!(ctl.next_tick().is_none());
}

#[tokio::test]
async fn tick_moves_and_reschedules() {
    let mut s = strip(3);
    let mut ctl = Autoplay::new();
    ctl.auto_move(&s);
    ctl.tick(&mut s);
    assert_eq!(s.offset, -400);
    assert!(ctl.next_tick().is_some());
    assert_eq!(ctl.download_visible(&s), Some(1));
}

#[tokio::test]
async fn single_slide_never_autoplays() {
    let s = strip(1);
    let mut ctl = Autoplay::new();
    ctl.auto_move(&s);
    assert!(ctl.next_tick().is_none());
    assert_eq!(ctl.toggle_pause(&s), PlayState::Paused);
    assert_eq!(ctl.toggle_pause(&s), PlayState::Playing);
    assert!(ctl.next_tick().is_none());
}
