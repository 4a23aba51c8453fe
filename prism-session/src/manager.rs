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

//! The assessment session manager.
//!
//! Owns the lifecycle state machine and the per-assessment serialization
//! discipline: every `start` / `next` / `respond` / `complete` on one
//! assessment runs under that assessment's lock, so reads of the item
//! cursor and writes of new responses are atomic. Expiry is observed
//! lazily - the first operation past `expires_at` flips the status and
//! surfaces `AssessmentExpired`, preserving partial responses.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

use prism_core::{
    Assessment, AssessmentEvent, AssessmentStatus, AssessmentType, Domain, IrtParams, Item,
    ItemFormat, PrismError, Repository, Response, ResponseValue, Result, Scale, ScaleScore,
    Section,
};
use prism_scoring::{estimate_or_sentinel, finalize_profile, select_next_item, ProfileConfig};

/// What the examinee should see next.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NextItem {
    /// Present this item.
    Item {
        item: Item,
        section: Section,
        item_index: u32,
    },
    /// The current section is exhausted; `next_section` is `None` once the
    /// whole battery is done and the driver should call complete.
    SectionComplete {
        #[serde(skip_serializing_if = "Option::is_none")]
        next_section: Option<Section>,
    },
}

/// Serializes and drives assessment sessions against the repository.
pub struct SessionManager {
    repo: Arc<dyn Repository>,
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
    config: ProfileConfig,
}

impl SessionManager {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self {
            repo,
            locks: DashMap::new(),
            config: ProfileConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ProfileConfig) -> Self {
        self.config = config;
        self
    }

    fn lock_for(&self, assessment_id: Uuid) -> Arc<Mutex<()>> {
        self.locks
            .entry(assessment_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn load(&self, assessment_id: Uuid) -> Result<Assessment> {
        self.repo
            .assessment(assessment_id)?
            .ok_or_else(|| PrismError::not_found("assessment", assessment_id))
    }

    /// Flip an overdue assessment to expired and surface the error. Runs
    /// under the caller's lock.
    fn observe_expiry(&self, assessment: &mut Assessment) -> Result<()> {
        if assessment.status == AssessmentStatus::Expired {
            return Err(PrismError::AssessmentExpired(assessment.id));
        }
        if assessment.status.is_open() && assessment.is_expired(Utc::now()) {
            assessment.status = assessment
                .status
                .transition(AssessmentEvent::Expire)
                .map_err(|e| PrismError::StateInvalid(e.to_string()))?;
            self.repo.update_assessment(assessment)?;
            tracing::warn!(assessment = %assessment.id, "assessment expired in flight");
            return Err(PrismError::AssessmentExpired(assessment.id));
        }
        Ok(())
    }

    fn require_in_progress(assessment: &Assessment) -> Result<()> {
        if assessment.status != AssessmentStatus::InProgress {
            return Err(PrismError::StateInvalid(format!(
                "assessment {} is {:?}, expected in_progress",
                assessment.id, assessment.status
            )));
        }
        Ok(())
    }

    /// Create a new assessment for a candidate.
    pub fn create(
        &self,
        candidate_id: Uuid,
        kind: AssessmentType,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Assessment> {
        self.repo
            .candidate(candidate_id)?
            .ok_or_else(|| PrismError::not_found("candidate", candidate_id))?;

        let mut assessment = Assessment::new(candidate_id, kind);
        if let Some(deadline) = expires_at {
            assessment = assessment.with_expiry(deadline);
        }
        self.repo.insert_assessment(assessment.clone())?;
        tracing::info!(assessment = %assessment.id, %candidate_id, ?kind, "assessment created");
        Ok(assessment)
    }

    /// Begin administration. Idempotent: starting an in-progress
    /// assessment returns the current state unchanged.
    pub fn start(&self, assessment_id: Uuid) -> Result<Assessment> {
        let lock = self.lock_for(assessment_id);
        let _guard = lock.lock();

        let mut assessment = self.load(assessment_id)?;
        self.observe_expiry(&mut assessment)?;

        match assessment.status {
            AssessmentStatus::InProgress => Ok(assessment),
            AssessmentStatus::NotStarted => {
                assessment.status = assessment
                    .status
                    .transition(AssessmentEvent::Start)
                    .map_err(|e| PrismError::StateInvalid(e.to_string()))?;
                assessment.started_at = Some(Utc::now());
                assessment.current_section = Some(assessment.first_section());
                assessment.current_item_index = 0;
                self.repo.update_assessment(&assessment)?;
                tracing::info!(
                    assessment = %assessment.id,
                    section = ?assessment.current_section,
                    "assessment started"
                );
                Ok(assessment)
            }
            status => Err(PrismError::StateInvalid(format!(
                "cannot start assessment {assessment_id} in status {status:?}"
            ))),
        }
    }

    /// Select the next item, advancing the section cursor when the
    /// current section is exhausted. The driver decides whether to call
    /// again on a section boundary.
    pub fn next(&self, assessment_id: Uuid) -> Result<NextItem> {
        let lock = self.lock_for(assessment_id);
        let _guard = lock.lock();

        let mut assessment = self.load(assessment_id)?;
        self.observe_expiry(&mut assessment)?;
        Self::require_in_progress(&assessment)?;

        let section = assessment
            .current_section
            .unwrap_or_else(|| assessment.first_section());

        let responses = self.repo.responses_for(assessment_id)?;
        let answered: HashSet<Uuid> = responses.iter().map(|r| r.item_id).collect();

        let candidate_item = match section {
            Section::Cognitive => self.next_cognitive(&responses, &answered)?,
            Section::Behavioral => self.next_sequential(Domain::Behavioral, &answered)?,
            Section::Interests => self.next_sequential(Domain::Interests, &answered)?,
        };

        match candidate_item {
            Some(item) => Ok(NextItem::Item {
                item,
                section,
                item_index: assessment.current_item_index,
            }),
            None => {
                let next_section = assessment.section_after(section);
                if let Some(next) = next_section {
                    assessment.current_section = Some(next);
                    assessment.current_item_index = 0;
                    self.repo.update_assessment(&assessment)?;
                    tracing::info!(
                        assessment = %assessment.id,
                        from = ?section,
                        to = ?next,
                        "section advanced"
                    );
                }
                Ok(NextItem::SectionComplete { next_section })
            }
        }
    }

    /// Adaptive selection across the cognitive scales: the first scale
    /// whose termination criterion is unmet supplies the next item at the
    /// current ability estimate.
    fn next_cognitive(
        &self,
        responses: &[Response],
        answered: &HashSet<Uuid>,
    ) -> Result<Option<Item>> {
        let scales = self.repo.scales_in_domain(Domain::Cognitive)?;

        for scale in scales.iter().filter(|s| !s.is_composite()) {
            let pool = self.repo.active_items_in_scale(&scale.id)?;
            if pool.is_empty() {
                continue;
            }
            let by_id: HashMap<Uuid, &Item> = pool.iter().map(|item| (item.id, item)).collect();

            let mut params: Vec<IrtParams> = Vec::new();
            let mut pattern: Vec<bool> = Vec::new();
            for response in responses {
                if let (Some(item), Some(correct)) =
                    (by_id.get(&response.item_id), response.is_correct)
                {
                    params.push(item.irt);
                    pattern.push(correct);
                }
            }

            let estimate = estimate_or_sentinel(&params, &pattern, &self.config.cat);
            if self.config.cat.should_stop(pattern.len(), estimate.sem) {
                continue;
            }
            if let Some(item) = select_next_item(&pool, answered, estimate.theta) {
                tracing::debug!(
                    scale = %scale.id,
                    theta = estimate.theta,
                    sem = estimate.sem,
                    administered = pattern.len(),
                    "adaptive item selected"
                );
                return Ok(Some(item.clone()));
            }
            // Pool exhausted before the SEM target: the scale is done.
        }
        Ok(None)
    }

    /// Fixed-order selection for behavioral and interest sections:
    /// first unanswered active item by (scale, order, id). Distortion
    /// items ride along flagged; the scorers separate them.
    fn next_sequential(&self, domain: Domain, answered: &HashSet<Uuid>) -> Result<Option<Item>> {
        let items = self.repo.active_items_in_domain(domain)?;
        Ok(items.into_iter().find(|item| !answered.contains(&item.id)))
    }

    /// Record one response. For cognitive items the correctness flag and
    /// a fresh ability snapshot are derived before the append.
    pub fn respond(
        &self,
        assessment_id: Uuid,
        item_id: Uuid,
        value: ResponseValue,
        response_time_ms: Option<u64>,
    ) -> Result<Response> {
        let lock = self.lock_for(assessment_id);
        let _guard = lock.lock();

        let mut assessment = self.load(assessment_id)?;
        self.observe_expiry(&mut assessment)?;
        Self::require_in_progress(&assessment)?;

        if !value.validate() {
            return Err(PrismError::InputInvalid(
                "response value outside its format's range".to_string(),
            ));
        }

        let item = self
            .repo
            .item(item_id)?
            .ok_or_else(|| PrismError::not_found("item", item_id))?;
        if !item.active {
            return Err(PrismError::InputInvalid(format!(
                "item {item_id} is not active"
            )));
        }
        Self::check_format(&item, &value)?;

        let responses = self.repo.responses_for(assessment_id)?;
        if responses.iter().any(|r| r.item_id == item_id) {
            return Err(PrismError::StateInvalid(format!(
                "item {item_id} already answered in assessment {assessment_id}"
            )));
        }

        let mut response = Response::new(assessment_id, item_id, value.clone());
        if let Some(millis) = response_time_ms {
            response = response.with_response_time(millis);
        }

        if item.domain == Domain::Cognitive {
            let answer_text = match &value {
                ResponseValue::MultipleChoice(text) => text.clone(),
                ResponseValue::Binary(flag) => flag.to_string(),
                // check_format rules the rest out for cognitive items
                _ => String::new(),
            };
            response.is_correct = item.is_answer_correct(&answer_text);
            response.theta_snapshot =
                Some(self.theta_after(&item, response.is_correct, &responses)?);
        }

        self.repo.append_response(response.clone())?;
        assessment.current_item_index += 1;
        self.repo.update_assessment(&assessment)?;

        tracing::debug!(
            assessment = %assessment_id,
            item = %item_id,
            index = assessment.current_item_index,
            correct = ?response.is_correct,
            "response recorded"
        );
        Ok(response)
    }

    /// Ability on the item's scale including the response being recorded.
    fn theta_after(
        &self,
        item: &Item,
        is_correct: Option<bool>,
        prior_responses: &[Response],
    ) -> Result<f64> {
        let pool = self.repo.active_items_in_scale(&item.scale_id)?;
        let by_id: HashMap<Uuid, &Item> = pool.iter().map(|i| (i.id, i)).collect();

        let mut params: Vec<IrtParams> = Vec::new();
        let mut pattern: Vec<bool> = Vec::new();
        for response in prior_responses {
            if let (Some(pool_item), Some(correct)) =
                (by_id.get(&response.item_id), response.is_correct)
            {
                params.push(pool_item.irt);
                pattern.push(correct);
            }
        }
        if let Some(correct) = is_correct {
            params.push(item.irt);
            pattern.push(correct);
        }

        Ok(estimate_or_sentinel(&params, &pattern, &self.config.cat).theta)
    }

    fn check_format(item: &Item, value: &ResponseValue) -> Result<()> {
        let matches = matches!(
            (item.format, value),
            (ItemFormat::Likert, ResponseValue::Likert(_))
                | (ItemFormat::MultipleChoice, ResponseValue::MultipleChoice(_))
                | (ItemFormat::ForcedChoice, ResponseValue::ForcedChoice(_))
                | (ItemFormat::Binary, ResponseValue::Binary(_))
        );
        if matches {
            Ok(())
        } else {
            Err(PrismError::InputInvalid(format!(
                "response does not match item format {:?}",
                item.format
            )))
        }
    }

    /// Finalize: score every applicable scale, persist the rows, and mark
    /// the assessment completed. Idempotent - completing a completed
    /// assessment returns the stored rows untouched.
    pub fn complete(&self, assessment_id: Uuid) -> Result<Vec<ScaleScore>> {
        let lock = self.lock_for(assessment_id);
        let _guard = lock.lock();

        let mut assessment = self.load(assessment_id)?;
        if assessment.status == AssessmentStatus::Completed {
            return self.repo.scores_for(assessment_id);
        }
        self.observe_expiry(&mut assessment)?;
        Self::require_in_progress(&assessment)?;

        let scales = self.all_scales()?;
        let mut items: Vec<Item> = Vec::new();
        for domain in [Domain::Cognitive, Domain::Behavioral, Domain::Interests] {
            items.extend(self.repo.active_items_in_domain(domain)?);
        }
        let responses = self.repo.responses_for(assessment_id)?;

        let profile = finalize_profile(assessment_id, &scales, &items, &responses, &self.config);
        self.repo.insert_scores(&profile.scores)?;

        assessment.status = assessment
            .status
            .transition(AssessmentEvent::Complete)
            .map_err(|e| PrismError::StateInvalid(e.to_string()))?;
        assessment.completed_at = Some(Utc::now());
        self.repo.update_assessment(&assessment)?;

        tracing::info!(
            assessment = %assessment_id,
            rows = profile.scores.len(),
            "assessment completed"
        );
        Ok(profile.scores)
    }

    pub fn all_scales(&self) -> Result<Vec<Scale>> {
        let mut scales = Vec::new();
        for domain in [Domain::Cognitive, Domain::Behavioral, Domain::Interests] {
            scales.extend(self.repo.scales_in_domain(domain)?);
        }
        Ok(scales)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_boundaries_serialize_compactly() {
        let done = NextItem::SectionComplete { next_section: None };
        assert_eq!(
            serde_json::to_string(&done).unwrap(),
            r#"{"kind":"section_complete"}"#
        );

        let boundary = NextItem::SectionComplete {
            next_section: Some(Section::Interests),
        };
        assert_eq!(
            serde_json::to_string(&boundary).unwrap(),
            r#"{"kind":"section_complete","next_section":"interests"}"#
        );
    }
}
