//! Track snapshot loading from the library database.

use anyhow::{Context, Result};
use rusqlite::{Connection, Row};

use crate::models::TrackRecord;
use crate::progress::{create_progress_bar, log_progress};

const COUNT_SQL: &str = "SELECT COUNT(*) FROM tracks";

const SELECT_SQL: &str = "SELECT id, filename, directory,
        album, matched_album, artist, matched_artist,
        genre, matched_genre, album_artist, matched_album_artist,
        series_tagged, matched_cover_url, duration
     FROM tracks
     ORDER BY id";

/// Log every N rows in log-only mode
const LOG_INTERVAL: u64 = 10_000;

fn track_from_row(row: &Row<'_>) -> rusqlite::Result<TrackRecord> {
    let filename: Option<String> = row.get(1)?;
    let directory: Option<String> = row.get(2)?;
    let series_tagged: Option<bool> = row.get(11)?;

    Ok(TrackRecord {
        id: row.get(0)?,
        filename: filename.unwrap_or_default(),
        directory: directory.unwrap_or_default(),
        album: row.get(3)?,
        matched_album: row.get(4)?,
        artist: row.get(5)?,
        matched_artist: row.get(6)?,
        genre: row.get(7)?,
        matched_genre: row.get(8)?,
        album_artist: row.get(9)?,
        matched_album_artist: row.get(10)?,
        series_tagged: series_tagged.unwrap_or(false),
        matched_cover_url: row.get(12)?,
        duration_sec: row.get(13)?,
    })
}

/// Read every track, ordered by id.
pub fn load_snapshot(conn: &Connection) -> Result<Vec<TrackRecord>> {
    let count: i64 = conn
        .query_row(COUNT_SQL, [], |row| row.get(0))
        .context("Failed to count tracks")?;
    let total = count.max(0) as u64;

    let pb = create_progress_bar(total, "Reading tracks");
    let mut stmt = conn.prepare(SELECT_SQL).context("Failed to prepare track query")?;
    let mut rows = stmt.query([])?;

    let mut tracks = Vec::with_capacity(total as usize);
    while let Some(row) = rows.next()? {
        tracks.push(track_from_row(row).context("Failed to decode track row")?);
        pb.inc(1);
        log_progress("read", tracks.len() as u64, total, LOG_INTERVAL);
    }

    pb.finish_with_message(format!("Read {} tracks", tracks.len()));
    Ok(tracks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE tracks (
                id INTEGER PRIMARY KEY,
                filename TEXT,
                directory TEXT,
                album TEXT,
                matched_album TEXT,
                artist TEXT,
                matched_artist TEXT,
                genre TEXT,
                matched_genre TEXT,
                album_artist TEXT,
                matched_album_artist TEXT,
                series_tagged BOOLEAN,
                matched_cover_url TEXT,
                duration REAL
            );",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_load_snapshot_reads_rows_in_id_order() {
        crate::progress::set_log_only(true);
        let conn = library();
        conn.execute_batch(
            "INSERT INTO tracks (id, filename, directory, matched_album, artist, series_tagged, matched_cover_url, duration)
             VALUES (7, 'Technotopia 01.mp3', '/radio', 'Technotopia', 'Host', 1, 'http://c/1.jpg', 3600.5);
             INSERT INTO tracks (id, filename, directory, series_tagged)
             VALUES (3, 'Late Night Sessions 045.mp3', '/radio', NULL);
             INSERT INTO tracks (id, filename, directory, series_tagged)
             VALUES (5, NULL, '/radio', 0);",
        )
        .unwrap();

        let tracks = load_snapshot(&conn).unwrap();
        let ids: Vec<i64> = tracks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 5, 7]);

        assert!(!tracks[0].series_tagged);
        assert_eq!(tracks[0].duration_sec, None);
        assert_eq!(tracks[1].filename, "");

        let tagged = &tracks[2];
        assert!(tagged.series_tagged);
        assert_eq!(tagged.effective_album(), Some("Technotopia"));
        assert_eq!(tagged.artist.as_deref(), Some("Host"));
        assert_eq!(tagged.cover_url(), Some("http://c/1.jpg"));
        assert_eq!(tagged.duration_sec, Some(3600.5));
    }

    #[test]
    fn test_load_snapshot_empty_table() {
        crate::progress::set_log_only(true);
        let conn = library();
        assert!(load_snapshot(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_load_snapshot_missing_table() {
        let conn = Connection::open_in_memory().unwrap();
        let err = load_snapshot(&conn).unwrap_err();
        assert!(err.to_string().contains("Failed to count tracks"));
    }
}
