// src/faces/mod.rs
//! Mood faces: textual kaomoji plus optional image assets.
//!
//! Every [`Face`] has a textual form (shown by sinks that cannot draw images)
//! and an asset stem used to look up a PNG/APNG image through
//! [`FaceAssets`]. Decoded and resized frames are memoized by
//! [`FaceFrameCache`].

pub mod assets;
pub mod cache;

use std::collections::HashMap;
use std::sync::Arc;

use image::RgbaImage;

pub use assets::{DirectoryAssets, FaceAssets, MemoryAssets};
pub use cache::FaceFrameCache;

/// Ordered, decoded animation frames; a still image is a single frame.
pub type Frames = Arc<[Arc<RgbaImage>]>;

/// An empty frame sequence ("no image available").
pub fn no_frames() -> Frames {
    Arc::from(Vec::new())
}

/// Every mood the device can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    LookR,
    LookL,
    LookRHappy,
    LookLHappy,
    Sleep,
    Sleep2,
    Awake,
    Bored,
    Intense,
    Cool,
    Happy,
    Grateful,
    Excited,
    Motivated,
    Demotivated,
    Smart,
    Lonely,
    Sad,
    Angry,
    Friend,
    Broken,
    Debug,
    Upload,
    Upload1,
    Upload2,
}

impl Face {
    pub const ALL: [Face; 25] = [
        Face::LookR,
        Face::LookL,
        Face::LookRHappy,
        Face::LookLHappy,
        Face::Sleep,
        Face::Sleep2,
        Face::Awake,
        Face::Bored,
        Face::Intense,
        Face::Cool,
        Face::Happy,
        Face::Grateful,
        Face::Excited,
        Face::Motivated,
        Face::Demotivated,
        Face::Smart,
        Face::Lonely,
        Face::Sad,
        Face::Angry,
        Face::Friend,
        Face::Broken,
        Face::Debug,
        Face::Upload,
        Face::Upload1,
        Face::Upload2,
    ];

    /// Asset stem, also the key used in configuration overrides.
    pub const fn name(self) -> &'static str {
        match self {
            Face::LookR => "look_r",
            Face::LookL => "look_l",
            Face::LookRHappy => "look_r_happy",
            Face::LookLHappy => "look_l_happy",
            Face::Sleep => "sleep",
            Face::Sleep2 => "sleep2",
            Face::Awake => "awake",
            Face::Bored => "bored",
            Face::Intense => "intense",
            Face::Cool => "cool",
            Face::Happy => "happy",
            Face::Grateful => "grateful",
            Face::Excited => "excited",
            Face::Motivated => "motivated",
            Face::Demotivated => "demotivated",
            Face::Smart => "smart",
            Face::Lonely => "lonely",
            Face::Sad => "sad",
            Face::Angry => "angry",
            Face::Friend => "friend",
            Face::Broken => "broken",
            Face::Debug => "debug",
            Face::Upload => "upload",
            Face::Upload1 => "upload1",
            Face::Upload2 => "upload2",
        }
    }

    /// Built-in textual form.
    pub const fn default_text(self) -> &'static str {
        match self {
            Face::LookR => "( ⚆_⚆)",
            Face::LookL => "(☉_☉ )",
            Face::LookRHappy => "( ◕‿◕)",
            Face::LookLHappy => "(◕‿◕ )",
            Face::Sleep => "(⇀‿‿↼)",
            Face::Sleep2 => "(≖‿‿≖)",
            Face::Awake => "(◕‿‿◕)",
            Face::Bored => "(-__-)",
            Face::Intense => "(°▃▃°)",
            Face::Cool => "(⌐■_■)",
            Face::Happy => "(•‿‿•)",
            Face::Grateful => "(^‿‿^)",
            Face::Excited => "(ᵔ◡◡ᵔ)",
            Face::Motivated => "(☼‿‿☼)",
            Face::Demotivated => "(≖__≖)",
            Face::Smart => "(✜‿‿✜)",
            Face::Lonely => "(ب__ب)",
            Face::Sad => "(╥☁╥ )",
            Face::Angry => "(-_-')",
            Face::Friend => "(♥‿‿♥)",
            Face::Broken => "(☓‿‿☓)",
            Face::Debug => "(#__#)",
            Face::Upload => "(1__0)",
            Face::Upload1 => "(1__1)",
            Face::Upload2 => "(0__1)",
        }
    }

    pub fn from_name(name: &str) -> Option<Face> {
        Face::ALL.into_iter().find(|f| f.name().eq_ignore_ascii_case(name))
    }
}

/// Textual faces in use, with user overrides applied.
#[derive(Debug, Clone)]
pub struct FaceSet {
    texts: HashMap<Face, String>,
}

impl Default for FaceSet {
    fn default() -> Self {
        Self {
            texts: Face::ALL
                .into_iter()
                .map(|f| (f, f.default_text().to_owned()))
                .collect(),
        }
    }
}

impl FaceSet {
    /// Apply overrides keyed by face name; unknown names are ignored.
    pub fn with_overrides<'a>(overrides: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut set = Self::default();
        for (name, text) in overrides {
            match Face::from_name(name) {
                Some(face) => {
                    set.texts.insert(face, text.to_owned());
                }
                None => log::warn!("Ignoring override for unknown face '{}'", name),
            }
        }
        set
    }

    pub fn text(&self, face: Face) -> &str {
        self.texts
            .get(&face)
            .map_or(face.default_text(), String::as_str)
    }

    /// Reverse lookup from a displayed string to its face.
    ///
    /// Overridden texts are matched first, then the built-in ones, so a value
    /// written before an override still resolves.
    pub fn lookup(&self, text: &str) -> Option<Face> {
        Face::ALL
            .into_iter()
            .find(|f| self.text(*f) == text)
            .or_else(|| Face::ALL.into_iter().find(|f| f.default_text() == text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for face in Face::ALL {
            assert_eq!(Face::from_name(face.name()), Some(face));
        }
        assert_eq!(Face::from_name("SLEEP"), Some(Face::Sleep));
        assert_eq!(Face::from_name("nope"), None);
    }

    #[test]
    fn test_texts_are_unique() {
        let set = FaceSet::default();
        for face in Face::ALL {
            assert_eq!(set.lookup(face.default_text()), Some(face));
        }
    }

    #[test]
    fn test_overrides() {
        let set = FaceSet::with_overrides([("happy", "(^_^)"), ("bogus", "x")]);
        assert_eq!(set.text(Face::Happy), "(^_^)");
        assert_eq!(set.lookup("(^_^)"), Some(Face::Happy));
        assert_eq!(set.lookup("(•‿‿•)"), Some(Face::Happy));
        assert_eq!(set.text(Face::Sad), "(╥☁╥ )");
        assert_eq!(set.lookup("unknown"), None);
    }
}
