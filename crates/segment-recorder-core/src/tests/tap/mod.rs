mod formats;
mod stream_tap;
