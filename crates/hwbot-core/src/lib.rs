//! Homework Bot core
//!
//! Polls the homework review API, detects status changes of the tracked
//! submission, and forwards them to a chat.

pub mod api;
pub mod config;
pub mod error;
pub mod notifier;
pub mod poller;
pub mod response;
pub mod status;
pub mod verdict;

pub use api::{HomeworkApi, PracticumClient};
pub use config::{CredentialSource, Credentials, EnvCredentials, Settings};
pub use error::{PollerError, Result};
pub use notifier::{Notifier, TelegramNotifier};
pub use poller::{CycleOutcome, PollState, Poller};
pub use response::{extract, HomeworkRecord, Latest};
pub use status::format_status;
