//! Maps a homework record to the notification text.

use crate::error::{PollerError, Result};
use crate::response::HomeworkRecord;
use crate::verdict::{status_changed_message, verdict_for};

/// Formats the notification for a homework record.
///
/// The verdict table is expected to cover every status the API sends, but
/// the lookup is checked on every call.
///
/// # Errors
///
/// Returns `PollerError::UnknownStatus` carrying the status value when it has
/// no verdict.
pub fn format_status(record: &HomeworkRecord) -> Result<String> {
    let verdict =
        verdict_for(&record.status).ok_or_else(|| PollerError::unknown_status(&record.status))?;
    Ok(status_changed_message(&record.homework_name, verdict))
}
