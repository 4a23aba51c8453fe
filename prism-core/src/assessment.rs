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

//! Assessment lifecycle state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Which sections an assessment administers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentType {
    Full,
    CognitiveOnly,
    BehavioralOnly,
    InterestsOnly,
}

impl AssessmentType {
    /// Section plan in administration order.
    pub fn sections(self) -> &'static [Section] {
        match self {
            AssessmentType::Full => {
                &[Section::Cognitive, Section::Behavioral, Section::Interests]
            }
            AssessmentType::CognitiveOnly => &[Section::Cognitive],
            AssessmentType::BehavioralOnly => &[Section::Behavioral],
            AssessmentType::InterestsOnly => &[Section::Interests],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Cognitive,
    Behavioral,
    Interests,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    NotStarted,
    InProgress,
    Completed,
    Expired,
}

impl AssessmentStatus {
    pub fn is_open(self) -> bool {
        matches!(self, AssessmentStatus::NotStarted | AssessmentStatus::InProgress)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssessmentEvent {
    Start,
    Complete,
    Expire,
}

#[derive(Debug, Error)]
#[error("invalid transition: {current:?} -> {event:?}")]
pub struct InvalidTransition {
    pub current: AssessmentStatus,
    pub event: AssessmentEvent,
}

impl AssessmentStatus {
    pub fn transition(self, event: AssessmentEvent) -> Result<AssessmentStatus, InvalidTransition> {
        use AssessmentEvent::*;
        use AssessmentStatus::*;

        let next = match (self, event) {
            (NotStarted, Start) => InProgress,
            (InProgress, Complete) => Completed,
            (s, Expire) if s.is_open() => Expired,
            _ => {
                return Err(InvalidTransition {
                    current: self,
                    event,
                })
            }
        };

        Ok(next)
    }
}

/// One administration of the test battery to one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub kind: AssessmentType,
    pub status: AssessmentStatus,
    /// Section currently being administered, `None` until started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_section: Option<Section>,
    /// Zero-based position within the current section.
    pub current_item_index: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Assessment {
    pub fn new(candidate_id: Uuid, kind: AssessmentType) -> Self {
        Self {
            id: Uuid::new_v4(),
            candidate_id,
            kind,
            status: AssessmentStatus::NotStarted,
            current_section: None,
            current_item_index: 0,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            expires_at: None,
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Expiry is observed lazily by the next operation; this is the check.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|deadline| now > deadline)
    }

    pub fn first_section(&self) -> Section {
        self.kind.sections()[0]
    }

    /// The section after `current` in this assessment's plan, if any.
    pub fn section_after(&self, current: Section) -> Option<Section> {
        let plan = self.kind.sections();
        plan.iter()
            .position(|&s| s == current)
            .and_then(|idx| plan.get(idx + 1))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_transitions() {
        let s = AssessmentStatus::NotStarted;
        let s = s.transition(AssessmentEvent::Start).unwrap();
        assert_eq!(s, AssessmentStatus::InProgress);
        let s = s.transition(AssessmentEvent::Complete).unwrap();
        assert_eq!(s, AssessmentStatus::Completed);
    }

    #[test]
    fn completed_assessments_cannot_expire_or_restart() {
        let done = AssessmentStatus::Completed;
        assert!(done.transition(AssessmentEvent::Expire).is_err());
        assert!(done.transition(AssessmentEvent::Start).is_err());
    }

    #[test]
    fn open_assessments_can_expire() {
        assert!(AssessmentStatus::NotStarted
            .transition(AssessmentEvent::Expire)
            .is_ok());
        assert!(AssessmentStatus::InProgress
            .transition(AssessmentEvent::Expire)
            .is_ok());
    }

    #[test]
    fn section_plans_per_type() {
        assert_eq!(AssessmentType::Full.sections().len(), 3);
        assert_eq!(
            AssessmentType::CognitiveOnly.sections(),
            &[Section::Cognitive]
        );

        let a = Assessment::new(Uuid::new_v4(), AssessmentType::Full);
        assert_eq!(a.first_section(), Section::Cognitive);
        assert_eq!(a.section_after(Section::Cognitive), Some(Section::Behavioral));
        assert_eq!(a.section_after(Section::Interests), None);
    }

    #[test]
    fn expiry_check() {
        let now = Utc::now();
        let a = Assessment::new(Uuid::new_v4(), AssessmentType::Full)
            .with_expiry(now - chrono::Duration::minutes(1));
        assert!(a.is_expired(now));

        let b = Assessment::new(Uuid::new_v4(), AssessmentType::Full);
        assert!(!b.is_expired(now));
    }
}
