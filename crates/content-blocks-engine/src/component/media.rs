use std::fmt;

/// Media kinds a picker may offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Image,
    Video,
    Audio,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Audio => "audio",
        })
    }
}

/// What the host's media library hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSelection {
    pub id: i64,
    pub url: String,
    pub alt: String,
}

/// Opaque media service provided by the host. `None` means the user
/// cancelled.
pub trait MediaPicker {
    fn pick(&mut self, allowed: &[MediaType]) -> Option<MediaSelection>;
}

/// Picker that always returns the same selection. Useful for scripted
/// editing and tests.
#[derive(Debug, Clone, Default)]
pub struct FixedPicker(pub Option<MediaSelection>);

impl MediaPicker for FixedPicker {
    fn pick(&mut self, _allowed: &[MediaType]) -> Option<MediaSelection> {
        self.0.clone()
    }
}
