// src/faces/cache.rs
//! Memoized, pre-scaled face frames.

use std::collections::HashMap;
use std::sync::Arc;

use image::RgbaImage;
use image::imageops::{self, FilterType};
use log::{debug, warn};
use parking_lot::RwLock;

use super::{FaceAssets, Frames, no_frames};

type CacheKey = (String, (u32, u32));

/// Lazy loader mapping `(face name, target size)` to resized frames.
///
/// Lookups take a shared lock; loading and resizing run with no lock held, so
/// two threads missing the same key may both load it. The first insert wins
/// and every later caller gets that same sequence.
///
/// Missing assets are not memoized: the source is asked again on the next
/// lookup, which lets a face dropped into the asset directory show up without
/// calling [`FaceFrameCache::clear`].
pub struct FaceFrameCache {
    assets: Arc<dyn FaceAssets>,
    frames: RwLock<HashMap<CacheKey, Frames>>,
}

impl FaceFrameCache {
    pub fn new(assets: Arc<dyn FaceAssets>) -> Self {
        Self {
            assets,
            frames: RwLock::new(HashMap::new()),
        }
    }

    /// Frames for `name` at `size`, or an empty sequence if there is no image.
    pub fn get_frames(&self, name: &str, size: (u32, u32)) -> Frames {
        let key = (name.to_lowercase(), size);
        if let Some(frames) = self.frames.read().get(&key) {
            return Arc::clone(frames);
        }

        let loaded = match self.assets.load(&key.0) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return no_frames(),
            Err(e) => {
                warn!("Face image '{}' failed to load: {}", key.0, e);
                return no_frames();
            }
        };

        let frames: Frames = loaded
            .into_iter()
            .map(|frame| Arc::new(fit(frame, size)))
            .collect::<Vec<_>>()
            .into();
        debug!(
            "Loaded {} frame(s) for face '{}' at {}x{}",
            frames.len(),
            key.0,
            size.0,
            size.1
        );

        Arc::clone(self.frames.write().entry(key).or_insert(frames))
    }

    /// Drop every memoized sequence.
    pub fn clear(&self) {
        self.frames.write().clear();
    }

    pub fn len(&self) -> usize {
        self.frames.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn fit(frame: RgbaImage, (width, height): (u32, u32)) -> RgbaImage {
    if frame.dimensions() == (width, height) || width == 0 || height == 0 {
        return frame;
    }
    imageops::resize(&frame, width, height, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faces::MemoryAssets;
    use image::Rgba;

    fn cache_with(assets: MemoryAssets) -> (FaceFrameCache, Arc<MemoryAssets>) {
        let assets = Arc::new(assets);
        (FaceFrameCache::new(assets.clone()), assets)
    }

    #[test]
    fn test_missing_face_is_always_empty() {
        let (cache, assets) = cache_with(MemoryAssets::new());
        assert!(cache.get_frames("nonexistent", (80, 80)).is_empty());
        assert!(cache.get_frames("nonexistent", (80, 80)).is_empty());
        assert_eq!(assets.loads(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_memoized_until_cleared() {
        let (cache, assets) =
            cache_with(MemoryAssets::new().with_face("x", vec![RgbaImage::new(4, 4)]));

        let first = cache.get_frames("x", (8, 8));
        let second = cache.get_frames("X", (8, 8));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(assets.loads(), 1);

        cache.clear();
        let third = cache.get_frames("x", (8, 8));
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(assets.loads(), 2);
    }

    #[test]
    fn test_sizes_are_cached_separately() {
        let (cache, _) = cache_with(MemoryAssets::new().with_face("x", vec![RgbaImage::new(4, 4)]));
        let small = cache.get_frames("x", (2, 2));
        let large = cache.get_frames("x", (16, 16));
        assert_eq!(small[0].dimensions(), (2, 2));
        assert_eq!(large[0].dimensions(), (16, 16));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_all_frames_resized_in_order() {
        let frames = (0..3)
            .map(|i| RgbaImage::from_pixel(10, 10, Rgba([i * 50, 0, 0, 255])))
            .collect();
        let (cache, _) = cache_with(MemoryAssets::new().with_face("upload", frames));

        let out = cache.get_frames("upload", (5, 5));
        assert_eq!(out.len(), 3);
        for (i, frame) in out.iter().enumerate() {
            assert_eq!(frame.dimensions(), (5, 5));
            let red = frame.get_pixel(2, 2)[0] as i32;
            assert!((red - i as i32 * 50).abs() <= 1, "frame {i} out of order");
        }
    }
}
