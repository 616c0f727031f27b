pub mod carousel;
pub mod config;
pub mod dom;
pub mod error;
pub mod events;
pub mod tasks {
    pub mod controller;
    pub mod download;
    pub mod flickr;
    pub mod loader;
    pub mod player;
}

pub use carousel::Carousel;
pub use error::{Error, Result};
