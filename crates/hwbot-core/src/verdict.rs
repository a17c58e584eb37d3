//! Review verdicts and the notification texts built from them.

/// Message sent when the API reports no homework in the time window.
pub const NO_HOMEWORK_MESSAGE: &str = "Нет заданий для проверки.";

/// Prefix of the message sent when a cycle fails on a bad payload.
pub const FAILURE_PREFIX: &str = "Сбой в работе программы";

/// Status code to verdict text. Closed set, never mutated.
pub const HOMEWORK_VERDICTS: [(&str, &str); 3] = [
    (
        "approved",
        "Работа проверена: ревьюеру всё понравилось. Ура!",
    ),
    ("reviewing", "Работа взята на проверку ревьюером."),
    ("rejected", "Работа проверена: у ревьюера есть замечания."),
];

/// Looks up the verdict text for a status code.
///
/// # Examples
///
/// ```
/// use hwbot_core::verdict::verdict_for;
///
/// assert_eq!(verdict_for("reviewing"), Some("Работа взята на проверку ревьюером."));
/// assert_eq!(verdict_for("lost"), None);
/// ```
#[must_use]
pub fn verdict_for(status: &str) -> Option<&'static str> {
    HOMEWORK_VERDICTS
        .iter()
        .find(|(code, _)| *code == status)
        .map(|(_, verdict)| *verdict)
}

/// Builds the notification for a homework whose status changed.
#[must_use]
pub fn status_changed_message(homework_name: &str, verdict: &str) -> String {
    format!("Изменился статус проверки работы \"{homework_name}\". {verdict}")
}

/// Builds the notification for a failed cycle.
#[must_use]
pub fn failure_message(error: &impl std::fmt::Display) -> String {
    format!("{FAILURE_PREFIX}: {error}")
}
