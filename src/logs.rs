//! Append-only JSONL logs — the only resource the gateway and the
//! streaming transform share.
//!
//! Single writer per log: the gateway appends queries, the transform
//! appends answers and update events. Each record is written as one whole
//! line in a single write call so concurrent readers never observe a
//! record split across reads; readers in turn only consume complete,
//! newline-terminated lines and leave a torn tail for the next poll.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("Log I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to encode log record: {0}")]
    Encode(#[from] serde_json::Error),
}

fn io_err(path: &Path, source: std::io::Error) -> LogError {
    LogError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Append one record as a JSON line, creating the log (and its parent
/// directory) if absent. The line is flushed before returning so it is
/// visible to an independent reader — no internal buffering.
pub fn append_record<T: Serialize>(path: &Path, record: &T) -> Result<(), LogError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_err(path, e))?;
    }

    let mut line = serde_json::to_string(record)?;
    line.push('\n');

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| io_err(path, e))?;
    file.write_all(line.as_bytes()).map_err(|e| io_err(path, e))?;
    file.flush().map_err(|e| io_err(path, e))?;
    Ok(())
}

/// Current end-of-log offset, used as the gateway's high-water mark.
/// A missing log reads as offset 0 (the log is created on first append).
pub fn end_offset(path: &Path) -> Result<u64, LogError> {
    match fs::metadata(path) {
        Ok(meta) => Ok(meta.len()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(io_err(path, e)),
    }
}

/// Read every complete line appended at or after `from`.
///
/// Returns the lines (without trailing newline) and the offset just past
/// the last complete line, to be used as `from` on the next call. A
/// partially written final line is not consumed. A missing log yields no
/// lines and leaves the offset unchanged.
pub fn read_new_lines(path: &Path, from: u64) -> Result<(Vec<String>, u64), LogError> {
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok((Vec::new(), from)),
        Err(e) => return Err(io_err(path, e)),
    };

    file.seek(SeekFrom::Start(from)).map_err(|e| io_err(path, e))?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf).map_err(|e| io_err(path, e))?;

    // Only consume up to the last newline; a torn tail stays unread.
    let consumed = match buf.iter().rposition(|&b| b == b'\n') {
        Some(idx) => idx + 1,
        None => return Ok((Vec::new(), from)),
    };

    let lines = String::from_utf8_lossy(&buf[..consumed])
        .lines()
        .map(|l| l.to_string())
        .collect();

    Ok((lines, from + consumed as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Row {
        n: u32,
    }

    #[test]
    fn append_then_read_from_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");

        append_record(&path, &Row { n: 1 }).unwrap();
        append_record(&path, &Row { n: 2 }).unwrap();

        let (lines, offset) = read_new_lines(&path, 0).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(serde_json::from_str::<Row>(&lines[0]).unwrap(), Row { n: 1 });
        assert_eq!(offset, end_offset(&path).unwrap());
    }

    #[test]
    fn read_resumes_from_offset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");

        append_record(&path, &Row { n: 1 }).unwrap();
        let (_, mark) = read_new_lines(&path, 0).unwrap();

        append_record(&path, &Row { n: 2 }).unwrap();
        let (lines, _) = read_new_lines(&path, mark).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(serde_json::from_str::<Row>(&lines[0]).unwrap(), Row { n: 2 });
    }

    #[test]
    fn missing_log_reads_empty_at_offset_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.jsonl");

        assert_eq!(end_offset(&path).unwrap(), 0);
        let (lines, offset) = read_new_lines(&path, 0).unwrap();
        assert!(lines.is_empty());
        assert_eq!(offset, 0);
    }

    #[test]
    fn torn_tail_is_not_consumed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");

        append_record(&path, &Row { n: 1 }).unwrap();
        // Simulate a writer mid-line: bytes present, no trailing newline.
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"{\"n\":2").unwrap();

        let (lines, offset) = read_new_lines(&path, 0).unwrap();
        assert_eq!(lines.len(), 1);

        // Once the line completes, the same offset picks it up.
        file.write_all(b"}\n").unwrap();
        let (lines, _) = read_new_lines(&path, offset).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(serde_json::from_str::<Row>(&lines[0]).unwrap(), Row { n: 2 });
    }

    #[test]
    fn append_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/log.jsonl");
        append_record(&path, &Row { n: 7 }).unwrap();
        assert!(path.exists());
    }
}
