//! Append-only JSON-lines log backing the cache store.
//!
//! One record per line, each a flat object holding the key fields and the cached value. The
//! file is only ever appended to; replay applies lines in order so a later record for the
//! same key wins. A line that does not parse (typically a tail cut short by a crash) is
//! skipped without affecting the lines before it.

use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

use super::key::{CacheKey, CacheValue};
use crate::Result;

#[derive(Debug, Serialize, Deserialize)]
struct CacheRecord {
    #[serde(flatten)]
    key: CacheKey,
    #[serde(flatten)]
    value: CacheValue,
}

#[derive(Debug)]
pub(crate) struct CacheLog {
    path: PathBuf,
    // Set when the file ends mid-line; the next append starts on a fresh line.
    needs_newline: bool,
}

impl CacheLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            needs_newline: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replay every readable record in file order. A missing file is an empty log.
    pub fn replay(&mut self) -> Result<Vec<(CacheKey, CacheValue)>> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        self.needs_newline = bytes.last().map_or(false, |b| *b != b'\n');

        let mut records = Vec::new();
        for (lineno, line) in bytes.split(|b| *b == b'\n').enumerate() {
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            match serde_json::from_slice::<CacheRecord>(line) {
                Ok(r) => records.push((r.key, r.value)),
                Err(e) => warn!(
                    path = %self.path.display(),
                    line = lineno + 1,
                    error = %e,
                    "skipping unreadable cache record"
                ),
            }
        }
        Ok(records)
    }

    /// Append records, one line each, and sync them to disk.
    ///
    /// A failed append may leave a partial line behind, so the next append starts on a new
    /// line until one has been synced in full.
    pub fn append(&mut self, records: &[(CacheKey, CacheValue)]) -> Result<()> {
        let needs_newline = std::mem::replace(&mut self.needs_newline, true);
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);
        if needs_newline {
            writer.write_all(b"\n")?;
        }
        for (key, value) in records {
            let record = CacheRecord {
                key: key.clone(),
                value: value.clone(),
            };
            serde_json::to_writer(&mut writer, &record)?;
            writer.write_all(b"\n")?;
        }
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_data()?;
        self.needs_newline = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Prompt;

    fn record(prompt: &str, response: &str) -> (CacheKey, CacheValue) {
        (
            CacheKey::new("gpt-4", &Prompt::text(prompt), "###", 0.0, 300),
            CacheValue::new(response),
        )
    }

    #[test]
    fn missing_file_replays_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = CacheLog::new(dir.path().join("absent.jsonl"));
        assert!(log.replay().unwrap().is_empty());
    }

    #[test]
    fn append_then_replay_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.jsonl");
        let mut log = CacheLog::new(&path);
        log.append(&[record("a", "1"), record("b", "2")]).unwrap();
        log.append(&[record("a", "3")]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().next().unwrap().contains("\"first_response\":\"1\""));

        let replayed = CacheLog::new(&path).replay().unwrap();
        let responses: Vec<_> = replayed.iter().map(|(_, v)| v.first_response.as_str()).collect();
        assert_eq!(responses, vec!["1", "2", "3"]);
    }

    #[test]
    fn truncated_tail_is_skipped_and_next_append_starts_fresh_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.jsonl");
        let mut log = CacheLog::new(&path);
        log.append(&[record("a", "1")]).unwrap();
        {
            let mut f = OpenOptions::new().append(true).open(&path).unwrap();
            f.write_all(b"{\"engine\":\"gpt-4\",\"prom").unwrap();
        }

        let mut reopened = CacheLog::new(&path);
        assert_eq!(reopened.replay().unwrap().len(), 1);
        reopened.append(&[record("b", "2")]).unwrap();

        let replayed = CacheLog::new(&path).replay().unwrap();
        assert_eq!(replayed.len(), 2);
        assert_eq!(replayed[1].1.first_response, "2");
    }

    #[test]
    fn failed_append_leaves_next_record_on_its_own_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.jsonl");
        let aside = dir.path().join("aside.jsonl");
        let mut log = CacheLog::new(&path);
        log.append(&[record("a", "1")]).unwrap();

        // an interrupted write: torn bytes on disk and an error from append
        {
            let mut f = OpenOptions::new().append(true).open(&path).unwrap();
            f.write_all(b"{\"engine\":\"gpt-4\",\"pro").unwrap();
        }
        fs::rename(&path, &aside).unwrap();
        fs::create_dir(&path).unwrap();
        assert!(log.append(&[record("b", "2")]).is_err());
        fs::remove_dir(&path).unwrap();
        fs::rename(&aside, &path).unwrap();

        log.append(&[record("b", "2")]).unwrap();

        let replayed = CacheLog::new(&path).replay().unwrap();
        let responses: Vec<_> = replayed.iter().map(|(_, v)| v.first_response.as_str()).collect();
        assert_eq!(responses, vec!["1", "2"]);
    }
}
