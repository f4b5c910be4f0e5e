//! The correlation protocol: poll an output log forward from a recorded
//! high-water mark until a row matching the request's correlation id
//! appears, or a deadline passes.
//!
//! Matching is by `queryId` only — never by field equality — so a
//! leftover answer to an earlier, structurally identical question can
//! never satisfy a new request, and two concurrent identical requests
//! stay distinguishable. The high-water mark merely keeps each poll from
//! rescanning an unbounded log history.

use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::time::Instant;
use uuid::Uuid;

use crate::logs::{self, LogError};
use crate::models::{AgeUpdateEvent, Answer};

/// Poll `path` from `mark`, returning the first row for which `matches`
/// holds, or `None` once `timeout` has elapsed.
///
/// Each newly visible complete line is parsed as `T`; parse failures are
/// skipped silently (a forged, legacy, or torn row is never fatal). The
/// poll yields between read attempts so many blocked requests coexist on
/// the runtime.
pub async fn wait_for_row<T, F>(
    path: &Path,
    mark: u64,
    timeout: Duration,
    poll_interval: Duration,
    matches: F,
) -> Result<Option<T>, LogError>
where
    T: DeserializeOwned,
    F: Fn(&T) -> bool,
{
    let deadline = Instant::now() + timeout;
    let mut cursor = mark;

    loop {
        let (lines, next) = logs::read_new_lines(path, cursor)?;
        cursor = next;

        for line in &lines {
            match serde_json::from_str::<T>(line) {
                Ok(row) if matches(&row) => return Ok(Some(row)),
                Ok(_) => {}
                Err(_) => continue, // skip malformed line
            }
        }

        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        tokio::time::sleep(poll_interval.min(deadline - now)).await;
    }
}

/// Wait for the Answer row correlated to `query_id`.
pub async fn wait_for_answer(
    path: &Path,
    mark: u64,
    query_id: Uuid,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<Option<Answer>, LogError> {
    wait_for_row(path, mark, timeout, poll_interval, |a: &Answer| {
        a.query_id == query_id
    })
    .await
}

/// Wait for the AgeUpdateEvent row correlated to `query_id`.
///
/// Rows without a `newAge` field fail deserialization and are skipped,
/// so a match implies the field is present.
pub async fn wait_for_update(
    path: &Path,
    mark: u64,
    query_id: Uuid,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<Option<AgeUpdateEvent>, LogError> {
    wait_for_row(path, mark, timeout, poll_interval, |e: &AgeUpdateEvent| {
        e.query_id == query_id
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Query;
    use std::time::Instant as StdInstant;

    fn answer_for(query: &Query, text: &str) -> Answer {
        Answer {
            query_id: query.query_id,
            requester_id: query.requester_id.clone(),
            patient_id: query.patient_id.clone(),
            question_text: query.question_text.clone(),
            answer_text: text.into(),
            answered_at: String::new(),
            error: None,
        }
    }

    #[tokio::test]
    async fn finds_row_appended_after_the_mark() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.jsonl");
        let query = Query::new("U1001", "P001", "meds?");

        let mark = logs::end_offset(&path).unwrap();

        // Independent writer appends the match after a short delay.
        let writer_path = path.clone();
        let row = answer_for(&query, "A1");
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(30));
            logs::append_record(&writer_path, &row).unwrap();
        });

        let found = wait_for_answer(
            &path,
            mark,
            query.query_id,
            Duration::from_secs(2),
            Duration::from_millis(10),
        )
        .await
        .unwrap()
        .expect("answer should arrive");
        assert_eq!(found.answer_text, "A1");
    }

    #[tokio::test]
    async fn identical_triple_with_other_id_never_matches() {
        // Regression for value-equality matching: an identical question
        // answered earlier must not satisfy a fresh request.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.jsonl");

        let first = Query::new("U1001", "P001", "meds?");
        logs::append_record(&path, &answer_for(&first, "A1")).unwrap();

        // Second, identical question; mark taken after A1 exists.
        let second = Query::new("U1001", "P001", "meds?");
        let mark = logs::end_offset(&path).unwrap();

        let writer_path = path.clone();
        let fresh = answer_for(&second, "A2");
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(30));
            logs::append_record(&writer_path, &fresh).unwrap();
        });

        let found = wait_for_answer(
            &path,
            mark,
            second.query_id,
            Duration::from_secs(2),
            Duration::from_millis(10),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(found.query_id, second.query_id);
        assert_eq!(found.answer_text, "A2");
    }

    #[tokio::test]
    async fn even_without_a_mark_id_matching_skips_stale_rows() {
        // Belt and braces: with the mark at zero the stale row is read
        // but still rejected by id.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.jsonl");

        let stale = Query::new("U1001", "P001", "meds?");
        logs::append_record(&path, &answer_for(&stale, "A1")).unwrap();

        let fresh = Query::new("U1001", "P001", "meds?");
        logs::append_record(&path, &answer_for(&fresh, "A2")).unwrap();

        let found = wait_for_answer(
            &path,
            0,
            fresh.query_id,
            Duration::from_millis(200),
            Duration::from_millis(10),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(found.answer_text, "A2");
    }

    #[tokio::test]
    async fn times_out_within_bound() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.jsonl");

        let timeout = Duration::from_millis(100);
        let poll = Duration::from_millis(20);

        let start = StdInstant::now();
        let found = wait_for_answer(&path, 0, Uuid::new_v4(), timeout, poll)
            .await
            .unwrap();
        let elapsed = start.elapsed();

        assert!(found.is_none());
        assert!(elapsed >= timeout);
        assert!(
            elapsed < timeout + poll + Duration::from_millis(100),
            "poll should stop within timeout plus one interval, took {elapsed:?}"
        );
    }

    #[tokio::test]
    async fn malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.jsonl");

        std::fs::write(&path, "not json at all\n{\"queryId\":42}\n").unwrap();
        let query = Query::new("U1001", "P001", "meds?");
        logs::append_record(&path, &answer_for(&query, "ok")).unwrap();

        let found = wait_for_answer(
            &path,
            0,
            query.query_id,
            Duration::from_millis(500),
            Duration::from_millis(10),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(found.answer_text, "ok");
    }

    #[tokio::test]
    async fn update_rows_require_new_age() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patient_updates.jsonl");
        let query = Query::new("U1001", "P001", "set age to 45");

        // A row with the right id but no newAge must not match.
        let bogus = format!(
            "{{\"queryId\":\"{}\",\"requesterId\":\"U1001\",\"patientId\":\"P001\",\"questionText\":\"set age to 45\"}}\n",
            query.query_id
        );
        std::fs::write(&path, bogus).unwrap();

        let found = wait_for_update(
            &path,
            0,
            query.query_id,
            Duration::from_millis(100),
            Duration::from_millis(10),
        )
        .await
        .unwrap();
        assert!(found.is_none());
    }
}
