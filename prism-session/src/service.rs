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

//! The in-process service API. A thin HTTP layer maps these operations
//! 1:1; nothing here knows about wire formats.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use prism_core::{
    AssessmentStatus, AssessmentType, PrismError, Repository, Response, ResponseValue, Result,
    ScaleKind, ScaleScore, Section,
};
use prism_match::{generate_interview_blocks, InterviewBlock, JobMatch, MatchEngine};
use prism_scoring::{DistortionCategory, ProfileConfig};

use crate::manager::{NextItem, SessionManager};

/// Facade over the session manager and the match engine.
pub struct AssessmentService {
    repo: Arc<dyn Repository>,
    manager: SessionManager,
    engine: MatchEngine,
}

impl AssessmentService {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self {
            manager: SessionManager::new(repo.clone()),
            engine: MatchEngine::new(),
            repo,
        }
    }

    pub fn with_profile_config(mut self, config: ProfileConfig) -> Self {
        self.manager = SessionManager::new(self.repo.clone()).with_config(config);
        self
    }

    /// CreateAssessment: returns the new assessment id.
    pub fn create_assessment(&self, candidate_id: Uuid, kind: AssessmentType) -> Result<Uuid> {
        Ok(self.manager.create(candidate_id, kind, None)?.id)
    }

    /// CreateAssessment with a deadline after which operations observe
    /// the assessment as expired.
    pub fn create_assessment_expiring(
        &self,
        candidate_id: Uuid,
        kind: AssessmentType,
        expires_at: DateTime<Utc>,
    ) -> Result<Uuid> {
        Ok(self.manager.create(candidate_id, kind, Some(expires_at))?.id)
    }

    /// StartAssessment: returns the first section to administer.
    pub fn start_assessment(&self, assessment_id: Uuid) -> Result<Section> {
        let assessment = self.manager.start(assessment_id)?;
        assessment.current_section.ok_or_else(|| {
            PrismError::StateInvalid(format!(
                "assessment {assessment_id} started without a current section"
            ))
        })
    }

    /// NextItem: an item to present, or a section boundary.
    pub fn next_item(&self, assessment_id: Uuid) -> Result<NextItem> {
        self.manager.next(assessment_id)
    }

    /// RespondItem: record one answer.
    pub fn respond(
        &self,
        assessment_id: Uuid,
        item_id: Uuid,
        value: ResponseValue,
        response_time_ms: Option<u64>,
    ) -> Result<Response> {
        self.manager.respond(assessment_id, item_id, value, response_time_ms)
    }

    /// CompleteAssessment: finalize and return the profile keyed by scale.
    pub fn complete_assessment(&self, assessment_id: Uuid) -> Result<BTreeMap<String, ScaleScore>> {
        let scores = self.manager.complete(assessment_id)?;
        Ok(scores
            .into_iter()
            .map(|score| (score.scale_id.clone(), score))
            .collect())
    }

    /// ComputeMatch: fit a completed profile against a performance model.
    pub fn compute_match(&self, assessment_id: Uuid, model_id: Uuid) -> Result<JobMatch> {
        let model = self
            .repo
            .model(model_id)?
            .ok_or_else(|| PrismError::not_found("model", model_id))?;

        let assessment = self
            .repo
            .assessment(assessment_id)?
            .ok_or_else(|| PrismError::not_found("assessment", assessment_id))?;
        if assessment.status != AssessmentStatus::Completed {
            return Err(PrismError::StateInvalid(format!(
                "assessment {assessment_id} is {:?}, match requires completed",
                assessment.status
            )));
        }

        let scales = self.manager.all_scales()?;
        let scores = self.repo.scores_for(assessment_id)?;

        // Validity rides on the distortion scale's STEN
        let validity = scales
            .iter()
            .find(|scale| scale.kind == ScaleKind::Distortion)
            .and_then(|scale| scores.iter().find(|score| score.scale_id == scale.id))
            .map(|score| DistortionCategory::from_sten(score.sten));

        Ok(self
            .engine
            .compute(assessment_id, &model, &scales, &scores, validity))
    }

    /// InterviewQuestions: probe blocks for every out-of-band scale of the
    /// match.
    pub fn interview_questions(
        &self,
        assessment_id: Uuid,
        model_id: Uuid,
    ) -> Result<Vec<InterviewBlock>> {
        let job_match = self.compute_match(assessment_id, model_id)?;
        let scales = self.manager.all_scales()?;
        let deviations: Vec<_> = job_match.out_of_band().cloned().collect();
        Ok(generate_interview_blocks(&deviations, &scales))
    }
}
