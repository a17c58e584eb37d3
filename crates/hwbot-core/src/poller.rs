//! The poll loop.
//!
//! Each cycle walks the same chain:
//!
//! ```text
//! credentials -> fetch -> extract -> format -> dedup -> send
//! ```
//!
//! and then sleeps for the retry period. Only the credentials check can stop
//! the loop. Every other failure is logged, optionally reported to the chat,
//! and the next cycle starts after the usual sleep.

use std::time::Duration;

use tracing::{debug, error, info};

use crate::api::HomeworkApi;
use crate::config::CredentialSource;
use crate::error::{PollerError, Result};
use crate::notifier::Notifier;
use crate::response::{extract, Latest};
use crate::status::format_status;
use crate::verdict::{failure_message, NO_HOMEWORK_MESSAGE};

/// State carried from one cycle to the next.
///
/// Not persisted: a restart begins with nothing sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollState {
    last_sent: Option<String>,
}

impl PollState {
    /// Creates an empty state.
    #[must_use]
    pub const fn new() -> Self {
        Self { last_sent: None }
    }

    /// The last notification text considered current, if any.
    #[must_use]
    pub fn last_sent(&self) -> Option<&str> {
        self.last_sent.as_deref()
    }

    /// Returns `true` if `text` differs from the last notification.
    #[must_use]
    pub fn is_new(&self, text: &str) -> bool {
        self.last_sent.as_deref() != Some(text)
    }

    /// Records `text` as the current notification.
    pub fn record(&mut self, text: impl Into<String>) {
        self.last_sent = Some(text.into());
    }
}

/// What a single cycle decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A new status or no-homework notification was sent (or attempted).
    Sent(String),
    /// The notification equals the last one; nothing was sent.
    Unchanged,
    /// The API could not be reached; nothing was sent and state is untouched.
    TransportFailed,
    /// The payload was unusable and a new failure notification was sent.
    FailureReported(String),
    /// The payload was unusable but the same failure was already reported.
    FailureSuppressed,
}

/// Drives the fetch, validate, format and notify chain on a fixed interval.
pub struct Poller<C, A, N> {
    credentials: C,
    api: A,
    notifier: N,
    since: i64,
    retry_period: Duration,
    state: PollState,
}

impl<C, A, N> Poller<C, A, N>
where
    C: CredentialSource,
    A: HomeworkApi,
    N: Notifier,
{
    /// Creates a poller querying the window starting at `since`.
    ///
    /// The window is fixed for the poller's lifetime.
    pub const fn new(
        credentials: C,
        api: A,
        notifier: N,
        since: i64,
        retry_period: Duration,
    ) -> Self {
        Self {
            credentials,
            api,
            notifier,
            since,
            retry_period,
            state: PollState::new(),
        }
    }

    /// Current cycle-to-cycle state.
    #[must_use]
    pub const fn state(&self) -> &PollState {
        &self.state
    }

    /// Runs cycles until the credentials disappear.
    ///
    /// Sleeps for the retry period after every cycle, whatever its outcome.
    ///
    /// # Errors
    ///
    /// Returns `PollerError::MissingCredentials`, the only error that can end
    /// the loop.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            self.run_cycle().await?;
            tokio::time::sleep(self.retry_period).await;
        }
    }

    /// Runs one cycle without sleeping.
    ///
    /// # Errors
    ///
    /// Returns `PollerError::MissingCredentials` before any request is made if
    /// a credential is missing. All other failures are absorbed into the
    /// returned [`CycleOutcome`].
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome> {
        if let Err(e) = self.credentials.credentials() {
            error!(severity = "CRITICAL", error = %e, "Required credentials missing, stopping");
            return Err(e);
        }

        let response = match self.api.fetch(self.since).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, since = self.since, "Homework API request failed");
                return Ok(CycleOutcome::TransportFailed);
            }
        };

        match Self::render(&response) {
            Ok(text) => Ok(self.notify_status(text).await),
            Err(e) => Ok(self.report_failure(&e).await),
        }
    }

    /// Turns a raw response into the notification it calls for.
    fn render(response: &serde_json::Value) -> Result<String> {
        match extract(response)? {
            Latest::NoHomework => Ok(NO_HOMEWORK_MESSAGE.to_string()),
            Latest::Homework(record) => format_status(&record),
        }
    }

    async fn notify_status(&mut self, text: String) -> CycleOutcome {
        if !self.state.is_new(&text) {
            info!("Homework status unchanged");
            return CycleOutcome::Unchanged;
        }

        debug!(message = %text, "Homework status changed");
        self.state.record(text.clone());
        self.deliver(&text).await;
        CycleOutcome::Sent(text)
    }

    async fn report_failure(&mut self, e: &PollerError) -> CycleOutcome {
        error!(error = %e, "Unusable homework API response");

        let text = failure_message(e);
        if !self.state.is_new(&text) {
            return CycleOutcome::FailureSuppressed;
        }

        self.state.record(text.clone());
        self.deliver(&text).await;
        CycleOutcome::FailureReported(text)
    }

    /// Sends a message. Failures are logged and go no further.
    async fn deliver(&self, text: &str) {
        if let Err(e) = self.notifier.send(text).await {
            error!(error = %e, "Failed to send notification");
        }
    }
}
