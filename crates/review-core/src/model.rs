//! Problem records and the JSON shapes exchanged with the tracker API.
//!
//! Difficulty and status are ordinal enums in memory. On the wire they are
//! written as their ordinal and read back from either the ordinal or the
//! label, so older servers that send `"FirstReview"` keep working.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Server-assigned problem identifier.
pub type ProblemId = i64;

/// Error returned when a difficulty or status label cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Lowercase and drop separators so "First Review", "first_review" and
/// "FirstReview" all compare equal.
fn normalize_label(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OrdinalOrLabel {
    Ordinal(i64),
    Label(String),
}

/// Problem difficulty, ordered Easy < Medium < Hard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Difficulty {
    #[default]
    Easy = 1,
    Medium = 2,
    Hard = 3,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::Easy),
            2 => Some(Self::Medium),
            3 => Some(Self::Hard),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }

    /// Next difficulty, wrapping from Hard back to Easy.
    pub fn cycle(&self) -> Self {
        match self {
            Self::Easy => Self::Medium,
            Self::Medium => Self::Hard,
            Self::Hard => Self::Easy,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "easy" | "1" => Ok(Self::Easy),
            "medium" | "2" => Ok(Self::Medium),
            "hard" | "3" => Ok(Self::Hard),
            _ => Err(ParseEnumError::new("difficulty", s)),
        }
    }
}

impl Serialize for Difficulty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.ordinal())
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match OrdinalOrLabel::deserialize(deserializer)? {
            OrdinalOrLabel::Ordinal(n) => Self::from_ordinal(n)
                .ok_or_else(|| de::Error::custom(format!("invalid difficulty ordinal {n}"))),
            OrdinalOrLabel::Label(s) => s.parse().map_err(de::Error::custom),
        }
    }
}

/// Review progress marker. Advances New -> FirstReview -> SecondReview -> Mastered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ProblemStatus {
    #[default]
    New = 1,
    FirstReview = 2,
    SecondReview = 3,
    Mastered = 4,
}

impl ProblemStatus {
    pub const ALL: [ProblemStatus; 4] = [
        ProblemStatus::New,
        ProblemStatus::FirstReview,
        ProblemStatus::SecondReview,
        ProblemStatus::Mastered,
    ];

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::New),
            2 => Some(Self::FirstReview),
            3 => Some(Self::SecondReview),
            4 => Some(Self::Mastered),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::FirstReview => "First Review",
            Self::SecondReview => "Second Review",
            Self::Mastered => "Mastered",
        }
    }

    pub fn short_label(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::FirstReview => "First",
            Self::SecondReview => "Second",
            Self::Mastered => "Mastered",
        }
    }
}

impl fmt::Display for ProblemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProblemStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "new" | "1" => Ok(Self::New),
            "firstreview" | "first" | "2" => Ok(Self::FirstReview),
            "secondreview" | "second" | "3" => Ok(Self::SecondReview),
            "mastered" | "4" => Ok(Self::Mastered),
            _ => Err(ParseEnumError::new("status", s)),
        }
    }
}

impl Serialize for ProblemStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.ordinal())
    }
}

impl<'de> Deserialize<'de> for ProblemStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match OrdinalOrLabel::deserialize(deserializer)? {
            OrdinalOrLabel::Ordinal(n) => Self::from_ordinal(n)
                .ok_or_else(|| de::Error::custom(format!("invalid status ordinal {n}"))),
            OrdinalOrLabel::Label(s) => s.parse().map_err(de::Error::custom),
        }
    }
}

/// One tracked practice item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub id: ProblemId,
    pub problem_number: u32,
    pub title: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub status: ProblemStatus,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub pattern: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notes: String,
    #[serde(with = "wire_date")]
    pub date_attempted: NaiveDate,
    #[serde(default, with = "wire_date::option")]
    pub first_review_date: Option<NaiveDate>,
    #[serde(default, with = "wire_date::option")]
    pub second_review_date: Option<NaiveDate>,
    #[serde(default, with = "wire_date::option")]
    pub final_review_date: Option<NaiveDate>,
    #[serde(default, with = "wire_timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "wire_timestamp", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Problem {
    /// Build a problem in the `New` state. Used for fixtures and previews;
    /// real records always come from the server.
    pub fn new(
        id: ProblemId,
        problem_number: u32,
        title: impl Into<String>,
        difficulty: Difficulty,
        pattern: impl Into<String>,
        date_attempted: NaiveDate,
    ) -> Self {
        Self {
            id,
            problem_number,
            title: title.into(),
            difficulty,
            status: ProblemStatus::New,
            pattern: pattern.into(),
            notes: String::new(),
            date_attempted,
            first_review_date: None,
            second_review_date: None,
            final_review_date: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_status(mut self, status: ProblemStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_first_review(mut self, date: NaiveDate) -> Self {
        self.first_review_date = Some(date);
        self
    }

    pub fn with_second_review(mut self, date: NaiveDate) -> Self {
        self.second_review_date = Some(date);
        self
    }

    pub fn with_final_review(mut self, date: NaiveDate) -> Self {
        self.final_review_date = Some(date);
        self
    }
}

/// Body of `POST /problems`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProblemRequest {
    pub problem_number: u32,
    pub title: String,
    pub difficulty: Difficulty,
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Response of `POST /problems`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedProblem {
    pub id: ProblemId,
}

/// Body of `PUT /problems/{id}/notes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateNotesRequest {
    pub notes: String,
}

/// Confirmation body returned by the mutating endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}

/// Aggregate counts from `GET /problems/stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProblemStats {
    pub total_problems: u32,
    pub mastered_count: u32,
    pub new_count: u32,
    pub first_review_count: u32,
    pub second_review_count: u32,
    pub easy_count: u32,
    pub medium_count: u32,
    pub hard_count: u32,
    pub reviews_due_today: u32,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse a calendar date from any of the shapes the API has been seen to
/// emit. Time-of-day is dropped here; RFC 3339 instants are first moved
/// into the local time zone so the day matches what the user sees.
pub fn parse_wire_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Local).date_naive());
    }
    if let Ok(instant) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(instant.with_timezone(&Local).date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
}

mod wire_date {
    use super::parse_wire_date;
    use chrono::NaiveDate;
    use serde::de::{self, Deserializer};
    use serde::{Deserialize, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_wire_date(&raw).ok_or_else(|| de::Error::custom(format!("invalid date {raw:?}")))
    }

    pub mod option {
        use super::{parse_wire_date, FORMAT};
        use chrono::NaiveDate;
        use serde::de::{self, Deserializer};
        use serde::{Deserialize, Serializer};

        pub fn serialize<S: Serializer>(
            date: &Option<NaiveDate>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDate>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                None => Ok(None),
                Some(raw) if raw.trim().is_empty() => Ok(None),
                Some(raw) => parse_wire_date(&raw)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid date {raw:?}"))),
            }
        }
    }
}

/// Audit timestamps are informational only, so anything unparseable
/// decodes as `None` instead of rejecting the whole record.
mod wire_timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::de::Deserializer;
    use serde::{Deserialize, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw.trim()) {
            return Ok(Some(ts.with_timezone(&Utc)));
        }
        Ok(NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M:%S%.f")
            .ok()
            .map(|dt| dt.and_utc()))
    }
}
