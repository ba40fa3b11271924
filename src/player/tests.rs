use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::catalog::Track;
use crate::config::PlaybackSettings;
use crate::storage::{MemoryStorage, SESSION_KEY, SharedStorage, Storage};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Load(MediaId, String),
    Unload,
    Start(u64),
    Pause,
    Seek(f64),
    Volume(f32),
}

#[derive(Default)]
struct FakeResource {
    calls: Vec<Call>,
    queued: Vec<ResourceEvent>,
}

impl FakeResource {
    fn last_media(&self) -> Option<MediaId> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::Load(id, _) => Some(*id),
            _ => None,
        })
    }

    fn last_start(&self) -> Option<u64> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::Start(token) => Some(*token),
            _ => None,
        })
    }

    fn seeks(&self) -> Vec<f64> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Seek(p) => Some(*p),
                _ => None,
            })
            .collect()
    }
}

impl PlaybackResource for FakeResource {
    fn load(&mut self, media: MediaId, url: &str) {
        self.calls.push(Call::Load(media, url.to_string()));
    }
    fn unload(&mut self) {
        self.calls.push(Call::Unload);
    }
    fn start(&mut self, token: u64) {
        self.calls.push(Call::Start(token));
    }
    fn pause(&mut self) {
        self.calls.push(Call::Pause);
    }
    fn seek(&mut self, position: f64) {
        self.calls.push(Call::Seek(position));
    }
    fn set_volume(&mut self, volume: f32) {
        self.calls.push(Call::Volume(volume));
    }
    fn poll_events(&mut self) -> Vec<ResourceEvent> {
        std::mem::take(&mut self.queued)
    }
}

fn track(n: usize) -> Track {
    Track {
        name: format!("Artist - Song {n}.mp3"),
        artist: "Artist".to_string(),
        title: format!("Song {n}"),
        url: format!("https://raw.example/music/{n}.mp3"),
        path: format!("music/Artist - Song {n}.mp3"),
        album_art: None,
    }
}

fn tracks(len: usize) -> Vec<Track> {
    (0..len).map(track).collect()
}

fn controller_with(storage: SharedStorage, len: usize) -> PlaybackController<FakeResource> {
    let mut c = PlaybackController::new(
        FakeResource::default(),
        storage,
        &PlaybackSettings::default(),
        Instant::now(),
    )
    .with_rng(StdRng::seed_from_u64(42));
    c.set_tracks(tracks(len));
    c
}

fn controller(len: usize) -> PlaybackController<FakeResource> {
    controller_with(Arc::new(MemoryStorage::new()), len)
}

/// Confirm the outstanding start request, as the resource would.
fn confirm_start(c: &mut PlaybackController<FakeResource>) {
    let token = c.resource().last_start().unwrap();
    c.handle_event(ResourceEvent::Started { token });
}

fn set_time(c: &mut PlaybackController<FakeResource>, position: f64) {
    let media = c.resource().last_media().unwrap();
    c.handle_event(ResourceEvent::DurationChange {
        media,
        duration: 200.0,
    });
    c.handle_event(ResourceEvent::TimeUpdate { media, position });
}

#[test]
fn fresh_controller_is_idle_with_default_volume() {
    let c = controller(3);
    assert_eq!(c.session().current_index, None);
    assert!(!c.session().is_playing);
    assert_eq!(c.session().volume, 0.8);
    assert!(c.current_track().is_none());
    assert_eq!(c.resource().calls, vec![Call::Volume(0.8)]);
}

#[test]
fn toggle_play_starts_first_track_when_nothing_assigned() {
    let mut c = controller(3);
    c.toggle_play();
    assert_eq!(c.session().current_index, Some(0));
    assert!(!c.session().is_playing, "playing only once the resource confirms");

    confirm_start(&mut c);
    assert!(c.session().is_playing);
    assert_eq!(c.current_track().unwrap().title, "Song 0");
}

#[test]
fn toggle_play_on_empty_list_is_a_no_op() {
    let mut c = controller(0);
    c.toggle_play();
    assert_eq!(c.session().current_index, None);
    assert_eq!(c.resource().calls.len(), 1);
}

#[test]
fn toggle_play_pauses_and_resumes_the_same_track() {
    let mut c = controller(3);
    c.play_track(1);
    confirm_start(&mut c);
    set_time(&mut c, 12.0);

    c.toggle_play();
    assert!(!c.session().is_playing);
    assert_eq!(c.session().current_index, Some(1));
    assert_eq!(c.session().current_time, 12.0);

    let loads_before = c.resource().calls.iter().filter(|x| matches!(x, Call::Load(..))).count();
    c.toggle_play();
    confirm_start(&mut c);
    assert!(c.session().is_playing);
    let loads_after = c.resource().calls.iter().filter(|x| matches!(x, Call::Load(..))).count();
    assert_eq!(loads_before, loads_after, "resume must not reload");
}

#[test]
fn stale_start_after_pause_is_ignored() {
    let mut c = controller(3);
    c.play_track(0);
    let token = c.resource().last_start().unwrap();
    c.pause();

    c.handle_event(ResourceEvent::Started { token });
    assert!(!c.session().is_playing);
}

#[test]
fn start_from_previous_track_is_ignored_after_track_change() {
    let mut c = controller(3);
    c.play_track(0);
    let old = c.resource().last_start().unwrap();
    c.play_track(1);

    c.handle_event(ResourceEvent::Started { token: old });
    assert!(!c.session().is_playing);
    confirm_start(&mut c);
    assert!(c.session().is_playing);
}

#[test]
fn failed_start_stays_out_of_playing() {
    let mut c = controller(2);
    c.play_track(0);
    let token = c.resource().last_start().unwrap();
    c.handle_event(ResourceEvent::StartFailed {
        token,
        reason: "no output device".into(),
    });
    assert!(!c.session().is_playing);
    assert_eq!(c.session().current_index, Some(0));

    // A second toggle retries rather than pausing.
    c.toggle_play();
    assert_ne!(c.resource().last_start(), Some(token));
}

#[test]
fn toggle_while_start_pending_pauses() {
    let mut c = controller(2);
    c.play_track(0);
    c.toggle_play();
    assert_eq!(c.resource().calls.last(), Some(&Call::Pause));
    confirm_start(&mut c);
    assert!(!c.session().is_playing);
}

#[test]
fn next_and_prev_wrap_for_several_lengths() {
    for len in [1usize, 2, 5] {
        let mut c = controller(len);
        for start in 0..len {
            c.play_track(start);
            c.next_track();
            assert_eq!(c.session().current_index, Some((start + 1) % len));
            c.prev_track();
            assert_eq!(c.session().current_index, Some(start), "len={len}");
        }
    }
}

#[test]
fn next_with_nothing_assigned_starts_at_zero() {
    let mut c = controller(4);
    c.next_track();
    assert_eq!(c.session().current_index, Some(0));
}

#[test]
fn prev_near_the_start_goes_to_previous_track() {
    let mut c = controller(4);
    c.play_track(2);
    confirm_start(&mut c);
    set_time(&mut c, 2.0);

    c.prev_track();
    assert_eq!(c.session().current_index, Some(1));
    assert_eq!(c.session().current_time, 0.0);
}

#[test]
fn prev_past_the_threshold_restarts_current_track() {
    let mut c = controller(4);
    c.play_track(2);
    confirm_start(&mut c);
    set_time(&mut c, 5.0);

    c.prev_track();
    assert_eq!(c.session().current_index, Some(2));
    assert_eq!(c.session().current_time, 0.0);
    assert_eq!(c.resource().seeks(), vec![0.0]);
    assert!(c.session().is_playing);
}

#[test]
fn shuffle_next_never_repeats_current() {
    let mut c = controller(3);
    c.toggle_shuffle();
    c.play_track(0);
    for _ in 0..100 {
        let before = c.session().current_index;
        c.next_track();
        assert_ne!(c.session().current_index, before);
    }
}

#[test]
fn shuffle_with_single_track_repeats() {
    let mut c = controller(1);
    c.toggle_shuffle();
    c.play_track(0);
    c.next_track();
    assert_eq!(c.session().current_index, Some(0));
}

#[test]
fn seek_is_clamped_to_duration() {
    let mut c = controller(1);
    c.play_track(0);
    set_time(&mut c, 10.0);

    c.seek(500.0);
    assert_eq!(c.session().current_time, 200.0);
    c.seek(-3.0);
    assert_eq!(c.session().current_time, 0.0);
    c.seek(f64::NAN);
    assert_eq!(c.resource().seeks(), vec![200.0, 0.0]);
}

#[test]
fn volume_is_clamped() {
    let mut c = controller(1);
    c.set_volume(1.7);
    assert_eq!(c.session().volume, 1.0);
    c.set_volume(-0.2);
    assert_eq!(c.session().volume, 0.0);
    assert_eq!(c.resource().calls.last(), Some(&Call::Volume(0.0)));
}

#[test]
fn flag_toggles_do_not_touch_the_resource() {
    let mut c = controller(2);
    c.play_track(0);
    let calls = c.resource().calls.len();
    c.toggle_shuffle();
    c.toggle_loop();
    assert!(c.session().shuffle);
    assert!(c.session().loop_track);
    assert_eq!(c.resource().calls.len(), calls);
}

#[test]
fn select_track_out_of_range_is_ignored() {
    let mut c = controller(2);
    c.select_track(1);
    assert_eq!(c.session().current_index, Some(1));
    let calls = c.resource().calls.clone();

    c.select_track(9);
    assert_eq!(c.session().current_index, Some(1));
    assert_eq!(c.resource().calls, calls);
}

#[test]
fn ended_with_loop_restarts_same_track() {
    let mut c = controller(3);
    c.toggle_loop();
    c.play_track(1);
    confirm_start(&mut c);
    set_time(&mut c, 199.0);

    let media = c.resource().last_media().unwrap();
    c.handle_event(ResourceEvent::Ended { media });
    assert_eq!(c.session().current_index, Some(1));
    assert_eq!(c.session().current_time, 0.0);
    assert_eq!(c.resource().last_media(), Some(media));
    assert_eq!(c.resource().seeks(), vec![0.0]);

    confirm_start(&mut c);
    assert!(c.session().is_playing);
}

#[test]
fn ended_without_loop_advances() {
    let mut c = controller(3);
    c.play_track(2);
    confirm_start(&mut c);

    let media = c.resource().last_media().unwrap();
    c.handle_event(ResourceEvent::Ended { media });
    assert_eq!(c.session().current_index, Some(0));
    assert_ne!(c.resource().last_media(), Some(media));
}

#[test]
fn events_for_an_older_media_are_ignored() {
    let mut c = controller(3);
    c.play_track(0);
    let old = c.resource().last_media().unwrap();
    c.play_track(1);

    c.handle_event(ResourceEvent::TimeUpdate {
        media: old,
        position: 42.0,
    });
    c.handle_event(ResourceEvent::Ended { media: old });
    assert_eq!(c.session().current_time, 0.0);
    assert_eq!(c.session().current_index, Some(1));
}

#[test]
fn media_error_leaves_playing_state() {
    let mut c = controller(2);
    c.play_track(0);
    confirm_start(&mut c);
    let media = c.resource().last_media().unwrap();
    c.handle_event(ResourceEvent::Error {
        media,
        reason: "decode failed".into(),
    });
    assert!(!c.session().is_playing);
    assert_eq!(c.session().current_index, Some(0));
}

#[test]
fn pump_drains_queued_events_in_order() {
    let mut c = controller(2);
    c.play_track(0);
    let media = c.resource().last_media().unwrap();
    let token = c.resource().last_start().unwrap();
    c.resource_mut().queued = vec![
        ResourceEvent::DurationChange {
            media,
            duration: 90.0,
        },
        ResourceEvent::Started { token },
        ResourceEvent::TimeUpdate {
            media,
            position: 1.5,
        },
    ];

    assert_eq!(c.pump(), 3);
    assert_eq!(c.session().duration, 90.0);
    assert_eq!(c.session().current_time, 1.5);
    assert!(c.session().is_playing);
    assert_eq!(c.pump(), 0);
}

#[test]
fn persistence_round_trip() {
    let storage: SharedStorage = Arc::new(MemoryStorage::new());
    let start = Instant::now();
    let mut c = PlaybackController::new(
        FakeResource::default(),
        storage.clone(),
        &PlaybackSettings::default(),
        start,
    );
    c.set_tracks(tracks(4));
    c.play_track(2);
    confirm_start(&mut c);
    set_time(&mut c, 37.5);
    c.set_volume(0.6);
    c.toggle_shuffle();

    c.tick(start + Duration::from_secs(5));

    let saved = load_session(storage.as_ref()).unwrap();
    assert_eq!(
        saved,
        PersistedSession {
            current_index: Some(2),
            current_time: 37.5,
            volume: 0.6,
            shuffle: true,
            loop_track: false,
        }
    );

    let raw = storage.get(SESSION_KEY).unwrap().unwrap();
    assert!(!raw.contains("isPlaying"));
    assert!(!raw.contains("duration"));

    let restored = PlaybackController::new(
        FakeResource::default(),
        storage.clone(),
        &PlaybackSettings::default(),
        start,
    );
    assert_eq!(restored.session().persisted(), saved);
    assert!(!restored.session().is_playing);
}

#[test]
fn tick_saves_at_most_once_per_interval() {
    let storage = Arc::new(MemoryStorage::new());
    let start = Instant::now();
    let mut c = PlaybackController::new(
        FakeResource::default(),
        storage.clone(),
        &PlaybackSettings::default(),
        start,
    );
    c.tick(start + Duration::from_secs(4));
    assert_eq!(storage.get(SESSION_KEY).unwrap(), None);
    c.tick(start + Duration::from_secs(5));
    assert!(storage.get(SESSION_KEY).unwrap().is_some());
}

#[test]
fn first_track_list_restores_saved_track_without_playing() {
    let storage: SharedStorage = Arc::new(MemoryStorage::new());
    save_session(
        storage.as_ref(),
        &PersistedSession {
            current_index: Some(1),
            current_time: 80.0,
            volume: 0.5,
            shuffle: false,
            loop_track: true,
        },
    );

    let mut c = PlaybackController::new(
        FakeResource::default(),
        storage,
        &PlaybackSettings::default(),
        Instant::now(),
    );
    c.set_tracks(Vec::new());
    assert!(c.resource().last_media().is_none());

    c.set_tracks(tracks(3));
    assert_eq!(c.session().current_index, Some(1));
    assert_eq!(c.session().current_time, 80.0);
    assert!(c.session().loop_track);
    assert!(!c.session().is_playing);
    assert!(c.resource().last_start().is_none());

    let media = c.resource().last_media().unwrap();
    c.handle_event(ResourceEvent::DurationChange {
        media,
        duration: 60.0,
    });
    c.handle_event(ResourceEvent::CanPlay { media });
    assert_eq!(c.resource().seeks(), vec![60.0]);
    assert_eq!(c.session().current_time, 60.0);

    // Only the first CanPlay positions the track.
    c.handle_event(ResourceEvent::CanPlay { media });
    assert_eq!(c.resource().seeks().len(), 1);
}

fn restored_controller(storage: SharedStorage, index: usize, time: f64) -> PlaybackController<FakeResource> {
    save_session(
        storage.as_ref(),
        &PersistedSession {
            current_index: Some(index),
            current_time: time,
            ..PersistedSession::default()
        },
    );
    PlaybackController::new(
        FakeResource::default(),
        storage,
        &PlaybackSettings::default(),
        Instant::now(),
    )
}

#[test]
fn restart_before_can_play_wins_over_saved_position() {
    let mut c = restored_controller(Arc::new(MemoryStorage::new()), 1, 80.0);
    c.set_tracks(tracks(3));

    c.prev_track();
    assert_eq!(c.session().current_index, Some(1));
    assert_eq!(c.session().current_time, 0.0);

    let media = c.resource().last_media().unwrap();
    c.handle_event(ResourceEvent::DurationChange {
        media,
        duration: 200.0,
    });
    c.handle_event(ResourceEvent::CanPlay { media });
    assert_eq!(c.resource().seeks(), vec![0.0]);
    assert_eq!(c.session().current_time, 0.0);
}

#[test]
fn scrub_before_can_play_wins_over_saved_position() {
    let mut c = restored_controller(Arc::new(MemoryStorage::new()), 0, 80.0);
    c.set_tracks(tracks(2));

    let media = c.resource().last_media().unwrap();
    c.handle_event(ResourceEvent::DurationChange {
        media,
        duration: 200.0,
    });
    c.seek_by(5.0);
    c.handle_event(ResourceEvent::CanPlay { media });
    assert_eq!(c.resource().seeks(), vec![85.0]);
    assert_eq!(c.session().current_time, 85.0);
}

#[test]
fn saved_track_is_not_exposed_before_a_track_list_arrives() {
    let storage: SharedStorage = Arc::new(MemoryStorage::new());
    let start = Instant::now();
    save_session(
        storage.as_ref(),
        &PersistedSession {
            current_index: Some(9),
            current_time: 42.0,
            volume: 0.3,
            ..PersistedSession::default()
        },
    );
    let mut c = PlaybackController::new(
        FakeResource::default(),
        storage.clone(),
        &PlaybackSettings::default(),
        start,
    );
    c.set_tracks(Vec::new());
    assert_eq!(c.session().current_index, None);
    assert_eq!(c.session().current_time, 0.0);
    assert_eq!(c.session().volume, 0.3);
    assert!(c.current_track().is_none());

    // A save before the list arrives keeps the saved position.
    c.tick(start + Duration::from_secs(5));
    let saved = load_session(storage.as_ref()).unwrap();
    assert_eq!(saved.current_index, Some(9));
    assert_eq!(saved.current_time, 42.0);
    assert_eq!(saved.volume, 0.3);
}

#[test]
fn saved_index_is_clamped_to_shorter_list() {
    let storage: SharedStorage = Arc::new(MemoryStorage::new());
    save_session(
        storage.as_ref(),
        &PersistedSession {
            current_index: Some(9),
            ..PersistedSession::default()
        },
    );
    let c = controller_with(storage, 3);
    assert_eq!(c.session().current_index, Some(2));
    assert_eq!(c.current_track().unwrap().title, "Song 2");
}

#[test]
fn new_list_relocates_current_track_by_path() {
    let mut c = controller(3);
    c.play_track(1);
    confirm_start(&mut c);

    let mut reordered = vec![track(7), track(1), track(0)];
    reordered.rotate_left(1);
    c.set_tracks(reordered);
    assert_eq!(c.session().current_index, Some(0));
    assert_eq!(c.current_track().unwrap().title, "Song 1");
    assert!(c.session().is_playing);
}

#[test]
fn track_leaving_the_list_returns_to_idle() {
    let mut c = controller(3);
    c.play_track(1);
    confirm_start(&mut c);

    c.set_tracks(vec![track(0), track(2)]);
    assert_eq!(c.session().current_index, None);
    assert!(!c.session().is_playing);
    assert_eq!(c.resource().calls.last(), Some(&Call::Unload));
}

#[test]
fn empty_list_returns_to_idle() {
    let mut c = controller(3);
    c.play_track(0);
    c.set_tracks(Vec::new());
    assert_eq!(c.session().current_index, None);
    assert!(c.current_track().is_none());
}

#[test]
fn read_only_storage_does_not_interrupt_playback() {
    let start = Instant::now();
    let mut c = PlaybackController::new(
        FakeResource::default(),
        Arc::new(MemoryStorage::read_only()),
        &PlaybackSettings::default(),
        start,
    );
    c.set_tracks(tracks(2));
    c.play_track(0);
    confirm_start(&mut c);
    c.tick(start + Duration::from_secs(10));
    c.next_track();
    assert_eq!(c.session().current_index, Some(1));
}

#[test]
fn events_after_shutdown_are_no_ops() {
    let storage = Arc::new(MemoryStorage::new());
    let mut c = controller_with(storage.clone(), 2);
    c.play_track(0);
    let token = c.resource().last_start().unwrap();
    let media = c.resource().last_media().unwrap();

    c.shutdown(Instant::now());
    assert!(c.is_closed());
    assert!(storage.get(SESSION_KEY).unwrap().is_some());
    let calls = c.resource().calls.len();

    c.handle_event(ResourceEvent::Started { token });
    c.handle_event(ResourceEvent::Ended { media });
    c.toggle_play();
    c.next_track();
    c.set_tracks(tracks(5));
    assert!(!c.session().is_playing);
    assert_eq!(c.session().current_index, Some(0));
    assert_eq!(c.resource().calls.len(), calls);
}
