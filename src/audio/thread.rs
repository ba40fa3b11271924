use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, error, warn};

use crate::config::AudioSettings;
use crate::error::PlaybackError;
use crate::player::{MediaId, ResourceEvent};

use super::sink::{create_sink_at, fade_out_sink, fetch_media};
use super::types::{AudioCmd, PlayheadClock};

/// The media the thread is currently holding.
struct Loaded {
    media: MediaId,
    bytes: Arc<[u8]>,
    sink: Sink,
    clock: PlayheadClock,
    /// `Ended` was already reported for the drained sink.
    ended: bool,
}

pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    events: Sender<ResourceEvent>,
    http: Client,
    audio_settings: AudioSettings,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(mut stream) => {
                // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
                // but noisy for a TUI app.
                stream.log_on_drop(false);
                Some(stream)
            }
            Err(e) => {
                let err = PlaybackError::NoOutput(e.to_string());
                error!(error = %err, "audio output unavailable");
                None
            }
        };

        let tick = Duration::from_millis(audio_settings.progress_interval_ms.max(1));
        let mut volume: f32 = 1.0;
        let mut current: Option<Loaded> = None;

        let emit = |event: ResourceEvent| {
            // The receiver only goes away while we are shutting down.
            let _ = events.send(event);
        };

        loop {
            match rx.recv_timeout(tick) {
                Ok(cmd) => match cmd {
                    AudioCmd::Load { media, url } => {
                        if let Some(old) = current.take() {
                            old.sink.stop();
                        }
                        let Some(stream) = stream.as_ref() else {
                            emit(ResourceEvent::Error {
                                media,
                                reason: "no audio output device".to_string(),
                            });
                            continue;
                        };

                        debug!(media, url = %url, "fetching media");
                        match load_media(stream, &http, &url, volume) {
                            Ok((bytes, sink, total)) => {
                                let duration = total.map_or(0.0, |d| d.as_secs_f64());
                                current = Some(Loaded {
                                    media,
                                    bytes,
                                    sink,
                                    clock: PlayheadClock::default(),
                                    ended: false,
                                });
                                emit(ResourceEvent::DurationChange { media, duration });
                                emit(ResourceEvent::CanPlay { media });
                            }
                            Err(e) => {
                                warn!(media, error = %e, "failed to load media");
                                emit(ResourceEvent::Error {
                                    media,
                                    reason: e.to_string(),
                                });
                            }
                        }
                    }

                    AudioCmd::Unload => {
                        if let Some(old) = current.take() {
                            old.sink.stop();
                        }
                    }

                    AudioCmd::Start { token } => {
                        let (Some(stream), Some(cur)) = (stream.as_ref(), current.as_mut()) else {
                            emit(ResourceEvent::StartFailed {
                                token,
                                reason: "nothing loaded".to_string(),
                            });
                            continue;
                        };

                        // A drained sink has nothing left to play; start over.
                        if cur.sink.empty() {
                            if let Err(e) = rebuild(stream, cur, Duration::ZERO, volume) {
                                emit(ResourceEvent::StartFailed {
                                    token,
                                    reason: e.to_string(),
                                });
                                continue;
                            }
                        }

                        cur.sink.play();
                        cur.clock.resume(Instant::now());
                        cur.ended = false;
                        emit(ResourceEvent::Started { token });
                    }

                    AudioCmd::Pause => {
                        if let Some(cur) = current.as_mut() {
                            cur.sink.pause();
                            cur.clock.pause(Instant::now());
                        }
                    }

                    AudioCmd::Seek(secs) => {
                        // Scrubbing: rebuild the current sink and skip into the media.
                        let (Some(stream), Some(cur)) = (stream.as_ref(), current.as_mut()) else {
                            continue;
                        };
                        let target = Duration::from_secs_f64(secs.max(0.0));
                        let running = cur.clock.is_running();
                        match rebuild(stream, cur, target, volume) {
                            Ok(()) => {
                                if running {
                                    cur.sink.play();
                                }
                                cur.ended = false;
                                emit(ResourceEvent::TimeUpdate {
                                    media: cur.media,
                                    position: target.as_secs_f64(),
                                });
                            }
                            Err(e) => warn!(media = cur.media, error = %e, "seek failed"),
                        }
                    }

                    AudioCmd::SetVolume(v) => {
                        volume = v;
                        if let Some(cur) = current.as_ref() {
                            cur.sink.set_volume(v);
                        }
                    }

                    AudioCmd::Quit { fade_out_ms } => {
                        if let Some(cur) = current.take() {
                            if cur.clock.is_running() {
                                // Fade out gently before stopping.
                                fade_out_sink(&cur.sink, fade_out_ms);
                            }
                            cur.sink.stop();
                        }
                        break;
                    }
                },
                Err(RecvTimeoutError::Timeout) => {
                    let Some(cur) = current.as_mut() else {
                        continue;
                    };
                    if !cur.clock.is_running() {
                        continue;
                    }
                    let now = Instant::now();
                    if cur.sink.empty() {
                        if !cur.ended {
                            cur.ended = true;
                            cur.clock.pause(now);
                            emit(ResourceEvent::Ended { media: cur.media });
                        }
                    } else {
                        emit(ResourceEvent::TimeUpdate {
                            media: cur.media,
                            position: cur.clock.position(now).as_secs_f64(),
                        });
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}

fn load_media(
    stream: &OutputStream,
    http: &Client,
    url: &str,
    volume: f32,
) -> Result<(Arc<[u8]>, Sink, Option<Duration>), PlaybackError> {
    let bytes = fetch_media(http, url)?;
    let (sink, total) = create_sink_at(stream, &bytes, Duration::ZERO, volume)?;
    Ok((bytes, sink, total))
}

/// Replace the sink of `cur` with a paused one positioned at `at`.
fn rebuild(
    stream: &OutputStream,
    cur: &mut Loaded,
    at: Duration,
    volume: f32,
) -> Result<(), PlaybackError> {
    let (sink, _) = create_sink_at(stream, &cur.bytes, at, volume)?;
    cur.sink.stop();
    cur.sink = sink;
    cur.clock.reset(at, Instant::now());
    Ok(())
}
