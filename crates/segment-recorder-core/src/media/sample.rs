use crate::media::{FormatDescription, MediaKind};

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a capture connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

/// Binding between a capture output and the stream tap.
///
/// Opaque to the recorder; only compared for identity. Backends mint a new
/// connection whenever their inputs change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    id: ConnectionId,
    kind: MediaKind,
}

impl Connection {
    /// Mints a connection with a fresh identifier.
    pub fn new(kind: MediaKind) -> Self {
        Self {
            id: ConnectionId(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed)),
            kind,
        }
    }

    /// Identifier compared against incoming samples.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Media kind carried by this connection.
    pub fn kind(&self) -> MediaKind {
        self.kind
    }
}

/// One timestamped buffer delivered by the capture pipeline.
#[derive(Debug, Clone)]
pub struct MediaSample {
    /// Connection the sample arrived on.
    pub connection: ConnectionId,
    /// Presentation timestamp relative to the capture clock.
    pub timestamp: Duration,
    /// Format of the payload.
    pub format: FormatDescription,
    /// Encoded or raw payload bytes.
    pub data: Vec<u8>,
}

impl MediaSample {
    /// Media kind of the payload.
    pub fn kind(&self) -> MediaKind {
        self.format.kind()
    }
}
