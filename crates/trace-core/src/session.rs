//! Login state and the weekly questionnaire gate.
//!
//! Everything lives in a [`KeyValueStore`] as JSON under two keys:
//! [`USER_KEY`] holds `{ "id": ... }` and [`QUESTIONNAIRE_KEY`] holds
//! `{ "lastCompleted": ms, "answers": [{ "at": ms, <field>: <answer>, ... }] }`.

use crate::storage::{KeyValueStore, StorageError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

pub const USER_KEY: &str = "trace_user";
pub const QUESTIONNAIRE_KEY: &str = "trace_questionnaire";

/// Questionnaire interval in milliseconds.
pub const WEEK_MS: u64 = 7 * 24 * 60 * 60 * 1000;

/// One questionnaire prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuestionnaireField {
    pub id: &'static str,
    pub label: &'static str,
    pub required: bool,
}

pub const QUESTIONNAIRE_FIELDS: [QuestionnaireField; 5] = [
    QuestionnaireField {
        id: "school_name",
        label: "What is your school name?",
        required: true,
    },
    QuestionnaireField {
        id: "childhood_best_friend",
        label: "What is your childhood best friend's name?",
        required: true,
    },
    QuestionnaireField {
        id: "mother_maiden_name",
        label: "What is your mother's maiden name?",
        required: true,
    },
    QuestionnaireField {
        id: "favourite_movie",
        label: "What is your favourite movie?",
        required: true,
    },
    QuestionnaireField {
        id: "nickname",
        label: "What is your nickname?",
        required: true,
    },
];

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Not logged in")]
    NotLoggedIn,
    #[error("Missing answer: {0}")]
    MissingAnswer(String),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// A locally known player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// A user with a fresh random identifier.
    pub fn anonymous() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }
}

/// One completed questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionnaireEntry {
    /// Completion time, ms since the Unix epoch.
    pub at: u64,
    #[serde(flatten)]
    pub answers: BTreeMap<String, String>,
}

/// Questionnaire history for this browser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_completed: Option<u64>,
    #[serde(default)]
    pub answers: Vec<QuestionnaireEntry>,
}

/// Current wall-clock time in ms since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}

/// Session state over a key-value store.
#[derive(Debug)]
pub struct SessionStore<S> {
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read a JSON record. Unreadable or corrupt records count as absent.
    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                log::warn!("Failed to read {}: {}", key, e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Ignoring corrupt {} record: {}", key, e);
                None
            }
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> SessionResult<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.set(key, &json)?;
        Ok(())
    }

    /// The stored user, if any.
    pub fn user(&self) -> Option<User> {
        self.read(USER_KEY)
    }

    pub fn set_user(&self, user: &User) -> SessionResult<()> {
        log::info!("Logged in as {}", user.id);
        self.write(USER_KEY, user)
    }

    /// Forget the user. Questionnaire history is kept.
    pub fn logout(&self) -> SessionResult<()> {
        self.store.remove(USER_KEY)?;
        Ok(())
    }

    /// Logged in means a stored user with a non-empty id.
    pub fn is_logged_in(&self) -> bool {
        self.user().is_some_and(|u| !u.id.is_empty())
    }

    /// Questionnaire history, empty when none was stored.
    pub fn questionnaire(&self) -> QuestionnaireRecord {
        self.read(QUESTIONNAIRE_KEY).unwrap_or_default()
    }

    pub fn needs_questionnaire(&self) -> bool {
        self.needs_questionnaire_at(now_ms())
    }

    /// Whether the questionnaire is due at `now` (ms since epoch).
    ///
    /// Never due without a logged-in user; otherwise due when never completed
    /// or at least a week has passed since the last completion.
    pub fn needs_questionnaire_at(&self, now: u64) -> bool {
        if !self.is_logged_in() {
            return false;
        }
        match self.questionnaire().last_completed {
            None => true,
            Some(last) => now.saturating_sub(last) >= WEEK_MS,
        }
    }

    pub fn record_completion(&self, answers: BTreeMap<String, String>) -> SessionResult<()> {
        self.record_completion_at(answers, now_ms())
    }

    /// Append a completed questionnaire and stamp the completion time.
    pub fn record_completion_at(
        &self,
        answers: BTreeMap<String, String>,
        now: u64,
    ) -> SessionResult<()> {
        if !self.is_logged_in() {
            return Err(SessionError::NotLoggedIn);
        }
        for field in QUESTIONNAIRE_FIELDS.iter().filter(|f| f.required) {
            let answered = answers.get(field.id).is_some_and(|a| !a.trim().is_empty());
            if !answered {
                return Err(SessionError::MissingAnswer(field.id.to_string()));
            }
        }

        let mut record = self.questionnaire();
        record.last_completed = Some(now);
        record.answers.push(QuestionnaireEntry { at: now, answers });
        self.write(QUESTIONNAIRE_KEY, &record)
    }
}
