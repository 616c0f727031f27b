mod common;

use std::time::Duration;

use carousel_frame::Carousel;
use carousel_frame::events::{Click, Control, DownloadRequest, ImageLoaded, ImageSize, Side};
use carousel_frame::tasks::controller::Autoplay;
use carousel_frame::tasks::player;
use common::{StubLoader, config, document_with};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const TEN: &[(&str, &str)] = &[
    ("0.jpg", "0"),
    ("1.jpg", "1"),
    ("2.jpg", "2"),
    ("3.jpg", "3"),
    ("4.jpg", "4"),
    ("5.jpg", "5"),
    ("6.jpg", "6"),
    ("7.jpg", "7"),
    ("8.jpg", "8"),
    ("9.jpg", "9"),
];

fn cancel_after(ms: u64) -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        token.cancel();
    });
    cancel
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn autoplay_advances_until_cancelled() {
    let (mut doc, _) = document_with(&["c1"]);
    let cfg = config("div-id: c1\njson-path: x.json\ntran-time: 20\n");
    let mut carousel = Carousel::create(&mut doc, &cfg, &StubLoader::with(TEN), Autoplay::new())
        .await
        .unwrap();

    let (_click_tx, click_rx) = mpsc::channel::<Click>(4);
    let (_loaded_tx, loaded_rx) = mpsc::channel::<ImageLoaded>(4);
    player::run(&mut doc, &mut carousel, click_rx, loaded_rx, None, cancel_after(90))
        .await
        .unwrap();

    assert!(carousel.strip().offset < 0, "autoplay never advanced");
    let margin = doc.style(carousel.filmstrip().unwrap(), "margin-left").unwrap();
    assert_eq!(margin, format!("{}px", carousel.strip().offset));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn paused_carousel_stays_put() {
    let (mut doc, _) = document_with(&["c1"]);
    let cfg = config("div-id: c1\njson-path: x.json\ntran-time: 20\n");
    let mut carousel = Carousel::create(&mut doc, &cfg, &StubLoader::with(TEN), Autoplay::new())
        .await
        .unwrap();
    let pause = carousel.control_node(Control::Pause).unwrap();

    let (click_tx, click_rx) = mpsc::channel::<Click>(4);
    click_tx.send(Click { target: pause }).await.unwrap();
    let (_loaded_tx, loaded_rx) = mpsc::channel::<ImageLoaded>(4);
    player::run(&mut doc, &mut carousel, click_rx, loaded_rx, None, cancel_after(80))
        .await
        .unwrap();

    assert_eq!(carousel.strip().offset, 0);
    assert!(carousel.next_tick().is_none());
}

#[tokio::test]
async fn closing_click_source_stops_player() {
    let (mut doc, _) = document_with(&["c1"]);
    let cfg = config("div-id: c1\njson-path: x.json\nwidth: 500\nheight: 250\n");
    let mut carousel = Carousel::create(&mut doc, &cfg, &StubLoader::with(TEN), Autoplay::new())
        .await
        .unwrap();
    let right = carousel.control_node(Control::Chevron(Side::Right)).unwrap();
    let download = carousel.control_node(Control::Download).unwrap();

    let (click_tx, click_rx) = mpsc::channel::<Click>(4);
    let (loaded_tx, loaded_rx) = mpsc::channel::<ImageLoaded>(4);
    let (dl_tx, mut dl_rx) = mpsc::channel::<DownloadRequest>(4);

    loaded_tx
        .send(ImageLoaded { slide: 3, size: ImageSize { width: 10, height: 600 } })
        .await
        .unwrap();
    click_tx.send(Click { target: right }).await.unwrap();
    click_tx.send(Click { target: download }).await.unwrap();
    drop(click_tx);

    let cancel = CancellationToken::new();
    tokio::time::timeout(
        Duration::from_secs(5),
        player::run(&mut doc, &mut carousel, click_rx, loaded_rx, Some(dl_tx), cancel),
    )
    .await
    .expect("player did not stop when clicks closed")
    .unwrap();

    let req = dl_rx.recv().await.unwrap();
    assert_eq!(req.index, 1);
    assert_eq!(req.image.path, "1.jpg");
}

#[tokio::test]
async fn clicks_outside_the_carousel_do_nothing() {
    let (mut doc, nodes) = document_with(&["c1", "elsewhere"]);
    let cfg = config("div-id: c1\njson-path: x.json\n");
    let mut carousel = Carousel::create(&mut doc, &cfg, &StubLoader::with(TEN), Autoplay::new())
        .await
        .unwrap();

    let (click_tx, click_rx) = mpsc::channel::<Click>(4);
    click_tx.send(Click { target: nodes[1] }).await.unwrap();
    drop(click_tx);
    let (_loaded_tx, loaded_rx) = mpsc::channel::<ImageLoaded>(4);
    player::run(&mut doc, &mut carousel, click_rx, loaded_rx, None, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(carousel.strip().offset, 0);
}
