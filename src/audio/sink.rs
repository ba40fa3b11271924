//! Fetching remote media and building `rodio` sinks over it.
//!
//! A track is downloaded once into memory; every seek builds a fresh sink
//! over the same bytes and skips into it.

use std::io::Cursor;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use rodio::{Decoder, OutputStream, Sink, Source};

use crate::error::PlaybackError;

/// Download the whole body of `url`.
pub(super) fn fetch_media(http: &Client, url: &str) -> Result<Arc<[u8]>, PlaybackError> {
    let resp = http
        .get(url)
        .send()
        .map_err(|e| PlaybackError::Fetch(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(PlaybackError::Fetch(format!("HTTP {}", status.as_u16())));
    }

    let bytes = resp
        .bytes()
        .map_err(|e| PlaybackError::Fetch(e.to_string()))?;
    Ok(Arc::from(bytes.as_ref()))
}

/// Create a paused `Sink` over `bytes` that starts playback at `start_at`.
///
/// Also returns the total length when the decoder knows it.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    bytes: &Arc<[u8]>,
    start_at: Duration,
    volume: f32,
) -> Result<(Sink, Option<Duration>), PlaybackError> {
    let decoder = open_decoder(bytes)?;
    let total = decoder.total_duration();
    // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
    let source = decoder.skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.set_volume(volume);
    sink.append(source);
    sink.pause();
    Ok((sink, total))
}

/// Decode `bytes` with the full length known up front, so streams without a
/// length header still report a duration and can seek.
pub(super) fn open_decoder(bytes: &Arc<[u8]>) -> Result<Decoder<Cursor<Arc<[u8]>>>, PlaybackError> {
    Decoder::builder()
        .with_data(Cursor::new(bytes.clone()))
        .with_byte_len(bytes.len() as u64)
        .with_seekable(true)
        .build()
        .map_err(|e| PlaybackError::Decode(e.to_string()))
}

pub(super) fn fade_out_sink(sink: &Sink, fade_out_ms: u64) {
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    let start = sink.volume();
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(start * (1.0 - t));
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}
