//! Built-in catalog used when no content source can be resolved.

use super::model::Track;
use super::parse::sort_tracks;

const DEMO: &[(&str, &str, &str, &str)] = &[
    (
        "Chill Vibes",
        "Sunset Dreams",
        "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-1.mp3",
        "https://images.unsplash.com/photo-1470252649378-9c29740c9fa8?w=200&h=200&fit=crop",
    ),
    (
        "Electronic Beats",
        "Night Drive",
        "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-2.mp3",
        "https://images.unsplash.com/photo-1511671782779-c97d3d27a1d4?w=200&h=200&fit=crop",
    ),
    (
        "Acoustic Sessions",
        "Morning Coffee",
        "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-3.mp3",
        "https://images.unsplash.com/photo-1514525253161-7a46d19cd819?w=200&h=200&fit=crop",
    ),
    (
        "Jazz Quartet",
        "Blue Notes",
        "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-4.mp3",
        "https://images.unsplash.com/photo-1415201364774-f6f0bb35f28f?w=200&h=200&fit=crop",
    ),
    (
        "Synth Wave",
        "Retro Future",
        "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-5.mp3",
        "https://images.unsplash.com/photo-1493225457124-a3eb161ffa5f?w=200&h=200&fit=crop",
    ),
];

/// Five royalty-free sample tracks, sorted like any other catalog.
pub fn demo_tracks() -> Vec<Track> {
    let mut tracks: Vec<Track> = DEMO
        .iter()
        .map(|(artist, title, url, art)| {
            let name = format!("{artist} - {title}.mp3");
            Track {
                path: format!("music/{name}"),
                name,
                artist: artist.to_string(),
                title: title.to_string(),
                url: url.to_string(),
                album_art: Some(art.to_string()),
            }
        })
        .collect();
    sort_tracks(&mut tracks);
    tracks
}
