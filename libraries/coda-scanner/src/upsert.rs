//! Row population for changed tracks
//!
//! Runs inside the enclosing folder's unit of work. The folder's first
//! changed track also refreshes the album extension and the folder's
//! genre links; genre and artist associations are replaced wholesale, so
//! retired tag values are actually retired.

use crate::policy::{resolve_multi, UNKNOWN_ARTIST};
use crate::stack::FolderFrame;
use crate::tags::{TagKey, TagReader};
use crate::Result;
use coda_core::config::MultiValueConfig;
use coda_core::types::{Track, TrackId};
use coda_storage::tracks::TrackFields;
use coda_storage::{albums, artists, genres, tracks};
use sqlx::SqliteConnection;
use std::path::Path;

/// What `process_track` did to the track row.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TrackOutcome {
    pub id: TrackId,
    pub created: bool,
}

/// Read one changed file and upsert its track, artist, genre, and album
/// rows.
pub(crate) async fn process_track(
    conn: &mut SqliteConnection,
    tag_reader: &dyn TagReader,
    multi_value: &MultiValueConfig,
    frame: &mut FolderFrame,
    existing: Option<&Track>,
    abs_path: &Path,
    filename: &str,
    size: i64,
    now: i64,
) -> Result<TrackOutcome> {
    let file = tag_reader.read(abs_path)?;
    let tags = &file.tags;

    let genre_names = resolve_multi(
        &multi_value.genre,
        tags.all(TagKey::Genre),
        tags.first(TagKey::Genre),
    );
    let mut genre_ids = Vec::with_capacity(genre_names.len());
    for name in &genre_names {
        genre_ids.push(genres::find_or_create(&mut *conn, name, now).await?.id);
    }

    // Album-derived fields come from the folder's first changed track.
    // This is also the moment an organizational folder turns album-bearing.
    if !frame.album_stamped {
        let mut album_artist_names = resolve_multi(
            &multi_value.album_artist,
            tags.all(TagKey::AlbumArtist),
            tags.first(TagKey::AlbumArtist),
        );
        if album_artist_names.is_empty() {
            album_artist_names = resolve_multi(
                &multi_value.album_artist,
                tags.all(TagKey::Artist),
                tags.first(TagKey::Artist),
            );
        }
        let album_artist_name = album_artist_names
            .first()
            .map_or(UNKNOWN_ARTIST, String::as_str);
        let album_artist = artists::find_or_create(&mut *conn, album_artist_name, now).await?;

        albums::upsert(
            &mut *conn,
            frame.folder.id,
            tags.first(TagKey::Album).unwrap_or(""),
            parse_int(tags.first(TagKey::Year)),
            Some(album_artist.id),
            now,
        )
        .await?;
        genres::set_folder_genres(&mut *conn, frame.folder.id, &genre_ids).await?;

        frame.album_stamped = true;
    }

    let artist_names = resolve_multi(
        &multi_value.artist,
        tags.all(TagKey::Artist),
        tags.first(TagKey::Artist),
    );
    let artist_name = artist_names.first().map_or(UNKNOWN_ARTIST, String::as_str);
    let artist = artists::find_or_create(&mut *conn, artist_name, now).await?;

    let fields = TrackFields {
        filename,
        artist_id: Some(artist.id),
        title: tags.first(TagKey::Title).unwrap_or(""),
        track_number: parse_int(tags.first(TagKey::TrackNumber)),
        disc_number: parse_int(tags.first(TagKey::DiscNumber)),
        year: parse_int(tags.first(TagKey::Year)),
        musicbrainz_id: tags.first(TagKey::MusicBrainzRecordingId),
        replay_gain_db: parse_gain(tags.first(TagKey::ReplayGainTrackGain)),
        replay_gain_peak: parse_float(tags.first(TagKey::ReplayGainTrackPeak)),
        length_seconds: file.properties.length_seconds as i64,
        bitrate: i64::from(file.properties.bitrate),
        size,
    };

    let (id, created) = match existing {
        Some(track) => {
            tracks::update(&mut *conn, track.id, &fields, now).await?;
            (track.id, false)
        }
        None => (
            tracks::create(&mut *conn, frame.folder.id, &fields, now).await?,
            true,
        ),
    };

    genres::set_track_genres(&mut *conn, id, &genre_ids).await?;
    // Retire genres the replacement left referenced by nothing
    genres::delete_orphaned(&mut *conn).await?;

    Ok(TrackOutcome { id, created })
}

/// Lenient integer parse: leading integer of the value, so "3/12" reads
/// as 3.
fn parse_int(value: Option<&str>) -> Option<i64> {
    let value = value?.trim();
    let end = value
        .char_indices()
        .take_while(|(i, c)| c.is_ascii_digit() || (*i == 0 && *c == '-'))
        .map(|(i, c)| i + c.len_utf8())
        .last()?;
    value[..end].parse().ok()
}

fn parse_float(value: Option<&str>) -> Option<f64> {
    value?.trim().parse().ok()
}

/// Replay-gain values usually carry a "dB" suffix.
fn parse_gain(value: Option<&str>) -> Option<f64> {
    let value = value?.trim();
    let value = value
        .strip_suffix("dB")
        .or_else(|| value.strip_suffix("db"))
        .unwrap_or(value);
    value.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int(Some("7")), Some(7));
        assert_eq!(parse_int(Some(" 3/12 ")), Some(3));
        assert_eq!(parse_int(Some("1984")), Some(1984));
        assert_eq!(parse_int(Some("abc")), None);
        assert_eq!(parse_int(Some("")), None);
        assert_eq!(parse_int(None), None);
    }

    #[test]
    fn test_parse_gain() {
        assert_eq!(parse_gain(Some("-6.5 dB")), Some(-6.5));
        assert_eq!(parse_gain(Some("2.1dB")), Some(2.1));
        assert_eq!(parse_gain(Some("0.8")), Some(0.8));
        assert_eq!(parse_gain(Some("loud")), None);
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float(Some("0.988")), Some(0.988));
        assert_eq!(parse_float(Some("x")), None);
    }
}
