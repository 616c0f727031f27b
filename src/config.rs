use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_WIDTH: u32 = 400;
pub const DEFAULT_HEIGHT: u32 = 300;
pub const DEFAULT_TRANSITION_MS: u64 = 1800;
pub const DEFAULT_FLICKR_ENDPOINT: &str =
    "https://www.flickr.com/services/feeds/photos_public.gne";

/// Construction input for one carousel, as written in YAML.
///
/// Zero values fall back to the defaults the same way absent ones do.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CarouselInput {
    #[serde(alias = "divId")]
    pub div_id: String,
    #[serde(default, alias = "jsonPath")]
    pub json_path: Option<String>,
    #[serde(default, alias = "flickrTag")]
    pub flickr_tag: Option<String>,
    #[serde(default, alias = "tranTime")]
    pub tran_time: Option<i64>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default, alias = "backgroundColor", alias = "bg")]
    pub background_color: Option<String>,
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    #[serde(default)]
    pub flickr_endpoint: Option<String>,
}

/// Where a carousel gets its images from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// JSON file (local path or http(s) URL) shaped `{ "items": [...] }`.
    Json(String),
    /// Remote photo-tag query.
    FlickrTag(String),
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(path) => write!(f, "json:{path}"),
            Self::FlickrTag(tag) => write!(f, "flickr:{tag}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Landscape,
    Portrait,
}

impl ViewMode {
    pub fn for_dimensions(width: u32, height: u32) -> Self {
        if width >= height {
            Self::Landscape
        } else {
            Self::Portrait
        }
    }
}

/// Display parameters, fixed once the carousel is built.
#[derive(Debug, Clone, PartialEq)]
pub struct CarouselOptions {
    pub width: u32,
    pub height: u32,
    pub transition: Duration,
    pub resolution: f64,
    pub view_mode: ViewMode,
    pub background: Option<String>,
}

impl CarouselOptions {
    pub fn new(width: u32, height: u32, tran_time_ms: i64) -> Self {
        let width = if width == 0 { DEFAULT_WIDTH } else { width };
        let height = if height == 0 { DEFAULT_HEIGHT } else { height };
        let transition = match tran_time_ms.unsigned_abs() {
            0 => DEFAULT_TRANSITION_MS,
            ms => ms,
        };
        Self {
            width,
            height,
            transition: Duration::from_millis(transition),
            resolution: f64::from(width) / f64::from(height),
            view_mode: ViewMode::for_dimensions(width, height),
            background: None,
        }
    }

    pub fn with_background(mut self, background: Option<String>) -> Self {
        self.background = background.filter(|bg| !bg.trim().is_empty());
        self
    }

    /// One navigation step, in pixels.
    pub fn step(&self) -> i64 {
        i64::from(self.width)
    }
}

impl Default for CarouselOptions {
    fn default() -> Self {
        Self::new(0, 0, 0)
    }
}

/// Validated configuration for one carousel.
#[derive(Debug, Clone)]
pub struct CarouselConfig {
    pub container_id: String,
    pub source: ImageSource,
    pub options: CarouselOptions,
    pub download_dir: Option<PathBuf>,
    pub flickr_endpoint: String,
}

impl CarouselInput {
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let data = fs::read(path)?;
        let input: CarouselInput = serde_yaml::from_slice(&data)?;
        Ok(input)
    }

    /// Resolves the image source (tag wins over path) and computes options.
    pub fn validated(self) -> Result<CarouselConfig> {
        let container_id = self.div_id.trim().to_string();
        if container_id.is_empty() {
            return Err(Error::InvalidConfig("div-id must not be empty".into()));
        }

        let source = match (non_empty(self.flickr_tag), non_empty(self.json_path)) {
            (Some(tag), _) => ImageSource::FlickrTag(tag),
            (None, Some(path)) => ImageSource::Json(path),
            (None, None) => {
                return Err(Error::InvalidConfig(
                    "json-path is required when flickr-tag is not set".into(),
                ));
            }
        };

        let options = CarouselOptions::new(
            self.width.unwrap_or(0),
            self.height.unwrap_or(0),
            self.tran_time.unwrap_or(0),
        )
        .with_background(self.background_color);

        let flickr_endpoint = non_empty(self.flickr_endpoint)
            .unwrap_or_else(|| DEFAULT_FLICKR_ENDPOINT.to_string());
        Url::parse(&flickr_endpoint).map_err(|err| {
            Error::InvalidConfig(format!("bad flickr-endpoint {flickr_endpoint}: {err}"))
        })?;

        Ok(CarouselConfig {
            container_id,
            source,
            options,
            download_dir: self.download_dir,
            flickr_endpoint,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
