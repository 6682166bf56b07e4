//! [`Notification`] definitions.

/// Message to be shown to the user after an operation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notification {
    /// [`Level`] of this [`Notification`].
    pub level: Level,

    /// Human-readable message.
    pub message: String,
}

impl Notification {
    /// Creates a new [`Level::Success`] [`Notification`].
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    /// Creates a new [`Level::Error`] [`Notification`].
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }
}

/// Level of a [`Notification`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Level {
    /// Operation succeeded.
    Success,

    /// Operation failed.
    Error,
}
