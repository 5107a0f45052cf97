mod formats;
mod stream_tap;

pub use {
    formats::FormatRegistry,
    stream_tap::{Connections, SampleSink, StreamTap},
};
