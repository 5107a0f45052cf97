use crate::media::{FormatDescription, MediaKind};

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::error;

#[derive(Debug, Default)]
struct Formats {
    video: Option<FormatDescription>,
    audio: Option<FormatDescription>,
}

/// Latest format description seen per media kind.
///
/// Written by the sample queues, read when a recording starts to decide
/// which tracks the writer gets. Cleared whenever connections are rebuilt.
#[derive(Debug, Clone, Default)]
pub struct FormatRegistry {
    formats: Arc<Mutex<Formats>>,
}

impl FormatRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Formats> {
        self.formats.lock().unwrap_or_else(|e| {
            error!("Format registry lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }

    /// Last known format for `kind`.
    pub fn get(&self, kind: MediaKind) -> Option<FormatDescription> {
        let formats = self.lock();
        match kind {
            MediaKind::Video => formats.video,
            MediaKind::Audio => formats.audio,
        }
    }

    /// Stores `format` and returns the format it replaced.
    pub fn update(&self, format: FormatDescription) -> Option<FormatDescription> {
        let mut formats = self.lock();
        let slot = match format.kind() {
            MediaKind::Video => &mut formats.video,
            MediaKind::Audio => &mut formats.audio,
        };
        slot.replace(format)
    }

    /// Forgets both formats.
    pub fn invalidate(&self) {
        let mut formats = self.lock();
        formats.video = None;
        formats.audio = None;
    }

    /// Video and audio formats, read under one lock.
    pub fn snapshot(&self) -> (Option<FormatDescription>, Option<FormatDescription>) {
        let formats = self.lock();
        (formats.video, formats.audio)
    }
}
