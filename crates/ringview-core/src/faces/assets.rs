// src/faces/assets.rs
//! Face asset sources.
//!
//! An asset source maps a face name to zero or more raster frames at their
//! native size. Resizing and memoization happen in the cache, so sources stay
//! simple and side-effect free.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use image::codecs::png::PngDecoder;
use image::{AnimationDecoder, DynamicImage, RgbaImage};

use crate::error::AssetError;

/// Asset collaborator consumed by [`FaceFrameCache`](super::FaceFrameCache).
pub trait FaceAssets: Send + Sync {
    /// Load every frame of the face named `name` (already lowercased).
    ///
    /// `Ok(None)` means the asset does not exist.
    fn load(&self, name: &str) -> Result<Option<Vec<RgbaImage>>, AssetError>;
}

/// Faces stored as `<dir>/<name>.png`; animated PNGs yield all their frames.
#[derive(Debug, Clone)]
pub struct DirectoryAssets {
    dir: PathBuf,
}

impl DirectoryAssets {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.png"))
    }
}

impl FaceAssets for DirectoryAssets {
    fn load(&self, name: &str) -> Result<Option<Vec<RgbaImage>>, AssetError> {
        let path = self.path_for(name);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(AssetError::Io { path, source }),
        };

        decode_png(BufReader::new(file)).map(Some)
    }
}

/// Decode a still or animated PNG into RGBA frames.
pub fn decode_png<R: io::BufRead + io::Seek>(reader: R) -> Result<Vec<RgbaImage>, AssetError> {
    let decoder = PngDecoder::new(reader)?;

    if decoder.is_apng()? {
        let frames = decoder
            .apng()?
            .into_frames()
            .collect_frames()?
            .into_iter()
            .map(|frame| frame.into_buffer())
            .collect();
        return Ok(frames);
    }

    Ok(vec![DynamicImage::from_decoder(decoder)?.to_rgba8()])
}

/// In-memory asset source; counts how often it is asked to load.
#[derive(Debug, Default)]
pub struct MemoryAssets {
    faces: HashMap<String, Vec<RgbaImage>>,
    loads: AtomicUsize,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register frames under `name` (stored lowercased).
    pub fn with_face(mut self, name: &str, frames: Vec<RgbaImage>) -> Self {
        self.insert(name, frames);
        self
    }

    pub fn insert(&mut self, name: &str, frames: Vec<RgbaImage>) {
        self.faces.insert(name.to_lowercase(), frames);
    }

    /// Number of `load` calls so far.
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }
}

impl FaceAssets for MemoryAssets {
    fn load(&self, name: &str) -> Result<Option<Vec<RgbaImage>>, AssetError> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        Ok(self.faces.get(name).cloned())
    }
}
