use bson::oid::ObjectId;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

pub const PLACEHOLDER: &str = "Placeholder";

/// Input record: everything a caller may set. Identity is assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMeeting {
    #[serde(default = "default_text")]
    pub title: String,
    #[serde(default = "default_date")]
    pub date: String,
    #[serde(default)]
    pub duration: i64,
    #[serde(default = "default_participants")]
    pub participants: Vec<String>,
    #[serde(default = "default_text")]
    pub transcript: String,
    #[serde(default = "default_text")]
    pub summary: String,
}

impl Default for NewMeeting {
    fn default() -> Self {
        Self {
            title: default_text(),
            date: default_date(),
            duration: 0,
            participants: default_participants(),
            transcript: default_text(),
            summary: default_text(),
        }
    }
}

impl NewMeeting {
    /// A meeting carrying only a transcript; every other field takes its default.
    pub fn from_transcript(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("title must not be blank"));
        }
        if self.date.trim().is_empty() {
            return Err(DomainError::validation("date must not be blank"));
        }
        if self.duration < 0 {
            return Err(DomainError::validation("duration must not be negative"));
        }
        if self.participants.iter().any(|name| name.trim().is_empty()) {
            return Err(DomainError::validation(
                "participants must not contain blank names",
            ));
        }
        Ok(())
    }
}

/// Output record as stored, identity included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default = "default_text")]
    pub title: String,
    #[serde(default = "default_date")]
    pub date: String,
    #[serde(default)]
    pub duration: i64,
    #[serde(default = "default_participants")]
    pub participants: Vec<String>,
    #[serde(default = "default_text")]
    pub transcript: String,
    #[serde(default = "default_text")]
    pub summary: String,
}

impl Meeting {
    /// The caller-settable part of the record.
    pub fn fields(&self) -> NewMeeting {
        NewMeeting {
            title: self.title.clone(),
            date: self.date.clone(),
            duration: self.duration,
            participants: self.participants.clone(),
            transcript: self.transcript.clone(),
            summary: self.summary.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingSortBy {
    Id,
    Title,
    Date,
    Duration,
}

impl MeetingSortBy {
    pub fn field(self) -> &'static str {
        match self {
            Self::Id => crate::store::ID_FIELD,
            Self::Title => "title",
            Self::Date => "date",
            Self::Duration => "duration",
        }
    }
}

fn default_text() -> String {
    PLACEHOLDER.to_string()
}

fn default_participants() -> Vec<String> {
    vec![PLACEHOLDER.to_string()]
}

fn default_date() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}
