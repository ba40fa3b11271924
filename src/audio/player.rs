use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::warn;

use crate::config::AudioSettings;
use crate::player::{MediaId, PlaybackResource, ResourceEvent};

use super::thread::spawn_audio_thread;
use super::types::AudioCmd;

/// `PlaybackResource` backed by a `rodio` sink on a dedicated audio thread.
pub struct RodioResource {
    tx: Sender<AudioCmd>,
    events: Receiver<ResourceEvent>,
    join: Option<JoinHandle<()>>,
    fade_out: Duration,
}

impl RodioResource {
    pub fn new(audio_settings: AudioSettings) -> Self {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let (events_tx, events) = mpsc::channel::<ResourceEvent>();

        let http = Client::builder()
            .timeout(Duration::from_secs(audio_settings.fetch_timeout_secs))
            .user_agent(concat!("clickwheel/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "failed to configure media client, using defaults");
                Client::new()
            });

        let fade_out = Duration::from_millis(audio_settings.quit_fade_out_ms);
        let join = spawn_audio_thread(rx, events_tx, http, audio_settings);

        Self {
            tx,
            events,
            join: Some(join),
            fade_out,
        }
    }

    fn send(&self, cmd: AudioCmd) {
        if self.tx.send(cmd).is_err() {
            warn!("audio thread is gone");
        }
    }

    /// Fade out, stop the audio thread and wait for it.
    pub fn quit_softly(&mut self) {
        let Some(handle) = self.join.take() else {
            return;
        };
        let _ = self.tx.send(AudioCmd::Quit {
            fade_out_ms: self.fade_out.as_millis() as u64,
        });
        let _ = handle.join();
    }
}

impl PlaybackResource for RodioResource {
    fn load(&mut self, media: MediaId, url: &str) {
        self.send(AudioCmd::Load {
            media,
            url: url.to_string(),
        });
    }

    fn unload(&mut self) {
        self.send(AudioCmd::Unload);
    }

    fn start(&mut self, token: u64) {
        self.send(AudioCmd::Start { token });
    }

    fn pause(&mut self) {
        self.send(AudioCmd::Pause);
    }

    fn seek(&mut self, position: f64) {
        self.send(AudioCmd::Seek(position));
    }

    fn set_volume(&mut self, volume: f32) {
        self.send(AudioCmd::SetVolume(volume));
    }

    fn poll_events(&mut self) -> Vec<ResourceEvent> {
        self.events.try_iter().collect()
    }
}

impl Drop for RodioResource {
    fn drop(&mut self) {
        self.quit_softly();
    }
}
