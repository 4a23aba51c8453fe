// Copyright 2025 Prism Assessments (https://github.com/prism-assess)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Examinee responses. Append-only per assessment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which side of a forced-choice pair was endorsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Choice {
    A,
    B,
}

/// The raw response payload is heterogeneous across item formats, so it is
/// a tagged variant; scorers dispatch on the tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ResponseValue {
    /// Agreement rating 1..=5.
    Likert(u8),
    /// Selected option text of a multiple-choice item.
    MultipleChoice(String),
    /// Endorsed side of a forced-choice pair.
    ForcedChoice(Choice),
    /// True/false item.
    Binary(bool),
}

impl ResponseValue {
    pub fn as_likert(&self) -> Option<u8> {
        match self {
            ResponseValue::Likert(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<Choice> {
        match self {
            ResponseValue::ForcedChoice(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseValue::MultipleChoice(s) => Some(s),
            _ => None,
        }
    }

    /// Likert ratings must sit inside the 1-5 anchor range.
    pub fn validate(&self) -> bool {
        match self {
            ResponseValue::Likert(v) => (1..=5).contains(v),
            ResponseValue::MultipleChoice(s) => !s.trim().is_empty(),
            ResponseValue::ForcedChoice(_) | ResponseValue::Binary(_) => true,
        }
    }
}

/// One recorded answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub id: Uuid,
    pub assessment_id: Uuid,
    pub item_id: Uuid,
    pub value: ResponseValue,
    /// Wall-clock answer latency reported by the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    /// Derived for cognitive items only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
    /// Ability estimate at the time this response was recorded
    /// (cognitive items only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theta_snapshot: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Response {
    pub fn new(assessment_id: Uuid, item_id: Uuid, value: ResponseValue) -> Self {
        Self {
            id: Uuid::new_v4(),
            assessment_id,
            item_id,
            value,
            response_time_ms: None,
            is_correct: None,
            theta_snapshot: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_response_time(mut self, millis: u64) -> Self {
        self.response_time_ms = Some(millis);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn likert_range_validation() {
        assert!(ResponseValue::Likert(1).validate());
        assert!(ResponseValue::Likert(5).validate());
        assert!(!ResponseValue::Likert(0).validate());
        assert!(!ResponseValue::Likert(6).validate());
    }

    #[test]
    fn tagged_serialization_round_trip() {
        let value = ResponseValue::ForcedChoice(Choice::B);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"kind":"forced_choice","value":"B"}"#);
        let back: ResponseValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }
}
