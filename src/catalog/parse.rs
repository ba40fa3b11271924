//! Turning a folder listing into sorted `Track`s.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::model::{ContentEntry, Track};

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

const ARTIST_TITLE_SEPARATOR: &str = " - ";
const AUDIO_EXTENSIONS: &[&str] = &["mp3"];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
const SHARED_ART_STEMS: &[&str] = &["cover", "album", "folder"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    pub artist: String,
    pub title: String,
}

/// Derive artist and title from an `Artist - Title.mp3` style file name.
pub fn parse_track_info(filename: &str) -> TrackInfo {
    let name = strip_extension(filename, AUDIO_EXTENSIONS).unwrap_or(filename);
    let parts: Vec<&str> = name.split(ARTIST_TITLE_SEPARATOR).collect();

    if parts.len() >= 2 {
        TrackInfo {
            artist: parts[0].trim().to_string(),
            title: parts[1..].join(ARTIST_TITLE_SEPARATOR).trim().to_string(),
        }
    } else {
        TrackInfo {
            artist: UNKNOWN_ARTIST.to_string(),
            title: name.trim().to_string(),
        }
    }
}

/// Return `name` without its extension when the extension (case-insensitive)
/// is one of `extensions`.
fn strip_extension<'a>(name: &'a str, extensions: &[&str]) -> Option<&'a str> {
    let (stem, ext) = name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    extensions.iter().any(|e| *e == ext).then_some(stem)
}

fn is_audio_entry(entry: &ContentEntry) -> bool {
    entry.is_file() && strip_extension(&entry.name, AUDIO_EXTENSIONS).is_some()
}

/// Map of lower-cased image stem -> download URL.
fn art_map(entries: &[ContentEntry]) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for entry in entries.iter().filter(|e| e.is_file()) {
        let (Some(stem), Some(url)) = (
            strip_extension(&entry.name, IMAGE_EXTENSIONS),
            entry.download_url.as_ref(),
        ) else {
            continue;
        };
        map.insert(stem.to_lowercase(), url.clone());
    }
    map
}

/// Own stem first, then the artist name, then folder-wide cover names.
fn resolve_album_art(art: &HashMap<String, String>, stem: &str, artist: &str) -> Option<String> {
    let own = stem.to_lowercase();
    let by_artist = artist.to_lowercase();

    std::iter::once(own.as_str())
        .chain(std::iter::once(by_artist.as_str()))
        .chain(SHARED_ART_STEMS.iter().copied())
        .find_map(|key| art.get(key).cloned())
}

/// Case-insensitive artist-then-title order. Ties fall back to the raw
/// strings so equal-looking names still sort deterministically.
pub fn compare_tracks(a: &Track, b: &Track) -> Ordering {
    a.artist
        .to_lowercase()
        .cmp(&b.artist.to_lowercase())
        .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
        .then_with(|| a.artist.cmp(&b.artist))
        .then_with(|| a.title.cmp(&b.title))
        .then_with(|| a.path.cmp(&b.path))
}

pub fn sort_tracks(tracks: &mut [Track]) {
    tracks.sort_by(compare_tracks);
}

/// Build the sorted track list from a folder listing.
///
/// Entries without a download URL cannot be played and are skipped, as are
/// duplicate paths.
pub fn tracks_from_listing(entries: &[ContentEntry]) -> Vec<Track> {
    let art = art_map(entries);
    let mut seen = std::collections::HashSet::new();

    let mut tracks: Vec<Track> = entries
        .iter()
        .filter(|e| is_audio_entry(e))
        .filter_map(|entry| {
            let url = entry.download_url.clone()?;
            if !seen.insert(entry.path.clone()) {
                return None;
            }
            let info = parse_track_info(&entry.name);
            let stem = strip_extension(&entry.name, AUDIO_EXTENSIONS).unwrap_or(&entry.name);
            let album_art = resolve_album_art(&art, stem, &info.artist);

            Some(Track {
                name: entry.name.clone(),
                artist: info.artist,
                title: info.title,
                url,
                path: entry.path.clone(),
                album_art,
            })
        })
        .collect();

    sort_tracks(&mut tracks);
    tracks
}
