//! Validation of homework API responses.
//!
//! The API answers with `{"homeworks": [...], "current_date": ...}`, newest
//! homework first. Only the first record matters to the poller.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PollerError, Result};

/// Key of the homework list in the API response.
pub const HOMEWORKS_KEY: &str = "homeworks";

/// Key of the homework name in a record.
pub const HOMEWORK_NAME_KEY: &str = "homework_name";

/// Key of the review status in a record.
pub const STATUS_KEY: &str = "status";

/// One submission's name and review status.
///
/// The status is kept as received; mapping it to a verdict is the
/// formatter's job and may fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeworkRecord {
    /// Name of the submission.
    pub homework_name: String,
    /// Review status code as sent by the API.
    pub status: String,
}

impl HomeworkRecord {
    /// Creates a new `HomeworkRecord`.
    #[must_use]
    pub fn new(homework_name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            homework_name: homework_name.into(),
            status: status.into(),
        }
    }

    /// Reads a record out of one element of the homework list.
    ///
    /// # Errors
    ///
    /// Returns `InvalidShape` if the element or one of its fields has the
    /// wrong type, and `MissingField` if a key is absent.
    pub fn from_json(value: &Value) -> Result<Self> {
        let Value::Object(fields) = value else {
            return Err(PollerError::invalid_shape("homeworks[0]", "object", value));
        };

        let read = |key: &str| -> Result<String> {
            match fields.get(key) {
                Some(Value::String(s)) => Ok(s.clone()),
                Some(other) => Err(PollerError::invalid_shape(key, "string", other)),
                None => Err(PollerError::missing_field(key)),
            }
        };

        Ok(Self {
            status: read(STATUS_KEY)?,
            homework_name: read(HOMEWORK_NAME_KEY)?,
        })
    }
}

/// What a valid response says about the tracked submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Latest {
    /// The newest homework in the window.
    Homework(HomeworkRecord),
    /// The window holds no homework at all.
    NoHomework,
}

/// Validates a response and extracts its newest homework.
///
/// An empty list is a valid answer and yields [`Latest::NoHomework`]. The
/// newest-first ordering of the list is trusted, not checked.
///
/// # Errors
///
/// - `InvalidShape` if the response is not an object or `homeworks` is not a list.
/// - `MissingField` if `homeworks` is absent.
/// - Any error of [`HomeworkRecord::from_json`] for the first element.
///
/// # Examples
///
/// ```
/// use hwbot_core::response::{extract, Latest};
/// use serde_json::json;
///
/// assert_eq!(extract(&json!({"homeworks": []})).unwrap(), Latest::NoHomework);
/// ```
pub fn extract(response: &Value) -> Result<Latest> {
    let Value::Object(fields) = response else {
        return Err(PollerError::invalid_shape("response", "object", response));
    };

    let homeworks = match fields.get(HOMEWORKS_KEY) {
        Some(Value::Array(list)) => list,
        Some(other) => return Err(PollerError::invalid_shape(HOMEWORKS_KEY, "list", other)),
        None => return Err(PollerError::missing_field(HOMEWORKS_KEY)),
    };

    match homeworks.first() {
        Some(newest) => HomeworkRecord::from_json(newest).map(Latest::Homework),
        None => Ok(Latest::NoHomework),
    }
}
