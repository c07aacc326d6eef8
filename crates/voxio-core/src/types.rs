// SPDX-FileCopyrightText: 2026 Voxio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the calls client, the reconciler, and the CLI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{Display, EnumString};

/// Status of a call as reported by the calling collaborator.
///
/// The vocabulary is collaborator-defined and compared case-sensitively;
/// values outside the known set are preserved in [`CallStatus::Other`]
/// rather than rejected, so an unrecognized status never breaks list
/// deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum CallStatus {
    Pending,
    InProgress,
    Success,
    Completed,
    Error,
    Failed,
    #[strum(default, to_string = "{0}")]
    Other(String),
}

impl CallStatus {
    /// True for the two terminal-success spellings the collaborator uses
    /// interchangeably. Only calls in this state have derived artifacts
    /// (transcript, recording) worth fetching.
    pub fn is_terminal_success(&self) -> bool {
        matches!(self, CallStatus::Success | CallStatus::Completed)
    }

    /// True for terminal failure spellings.
    pub fn is_failed(&self) -> bool {
        matches!(self, CallStatus::Error | CallStatus::Failed)
    }
}

impl Default for CallStatus {
    fn default() -> Self {
        CallStatus::Pending
    }
}

impl Serialize for CallStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CallStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or_else(|_| CallStatus::Other(s)))
    }
}

/// Who produced a transcript segment.
///
/// Collaborator payloads are inconsistent here (`"User"`, `"user"`,
/// `"agent"`, `"assistant"` all appear); deserialization folds case and
/// treats anything that is not the human caller as the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Speaker {
    Caller,
    Agent,
}

impl Serialize for Speaker {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Speaker {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(match s.to_ascii_lowercase().as_str() {
            "user" | "caller" | "human" => Speaker::Caller,
            _ => Speaker::Agent,
        })
    }
}

/// One speaker-tagged utterance of an aligned transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub speaker: Speaker,
    pub text: String,
}

/// One requested call, as returned by the history endpoint.
///
/// `call_id` is assigned by the calling collaborator and is absent until
/// placement succeeds. `status` transitions are owned entirely by the
/// collaborator; this client observes them, never sets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    #[serde(default)]
    pub call_id: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub status: CallStatus,
    #[serde(default, alias = "created_at")]
    pub call_time: Option<DateTime<Utc>>,
}

/// Which account the history fetch is scoped to.
///
/// A signed-in user is identified by `user_id`, which takes precedence; a
/// guest is identified by `phone_number` alone. An identity with neither
/// cannot fetch history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub phone_number: Option<String>,
    pub user_id: Option<String>,
}

impl Identity {
    pub fn is_empty(&self) -> bool {
        self.phone_number.is_none() && self.user_id.is_none()
    }
}

/// Per-call transcript view state, keyed by call id and held only in
/// process memory.
///
/// `loading` is true while a fetch for this call is outstanding. A stored
/// `aligned` value is never cleared by a later failure; `error` records the
/// most recent failed fetch alongside whatever good data already exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub aligned: Option<Vec<Segment>>,
    pub loading: bool,
    pub error: Option<String>,
}

impl TranscriptEntry {
    /// A transcript with at least one stored segment is complete and needs
    /// no further fetching once its call has finished.
    pub fn is_complete(&self) -> bool {
        self.aligned.as_ref().is_some_and(|segments| !segments.is_empty())
    }
}

/// Classified transcript response.
///
/// The transcript endpoint's payload is effectively a four-way union;
/// the client classifies it once so the reconciler never inspects loose
/// fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptFetch {
    /// Speaker-tagged segments, non-empty.
    Aligned(Vec<Segment>),
    /// Undifferentiated transcript text; stored as a single agent segment.
    Text(String),
    /// Transcription has not finished yet; retry on a later tick.
    Pending,
    /// The collaborator reported an error for this transcript.
    Failed(String),
}

/// Classified recording response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingFetch {
    /// A playable media URL is available.
    Ready(String),
    /// No recording yet; retry on a later tick.
    NotReady,
}

/// Options attached to a placement request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOptions {
    pub premium: bool,
    pub max_duration_secs: u32,
    pub user_id: Option<String>,
}

/// Result of a placement request.
///
/// The backend answers HTTP 200 both for placed calls (`call_id` present)
/// and for server-side refusals (`message` only), so the outcome keeps all
/// three fields loose and lets callers branch on [`PlaceCallOutcome::placed`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceCallOutcome {
    pub call_id: Option<String>,
    pub status: Option<CallStatus>,
    pub message: Option<String>,
}

impl PlaceCallOutcome {
    pub fn placed(&self) -> bool {
        self.call_id.is_some()
    }
}
