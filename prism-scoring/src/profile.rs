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

//! Profile finalization: fan a completed assessment out to every
//! applicable scorer and collect the standardized profile.

use std::collections::HashMap;

use uuid::Uuid;

use prism_core::{Domain, Item, ItemFormat, Response, Scale, ScaleKind, ScaleScore};

use crate::irt::CatConfig;
use crate::scorers::behavioral::{score_behavioral, BehavioralWeights};
use crate::scorers::cognitive::score_cognitive_scale;
use crate::scorers::distortion::{detect_distortion, DistortionReport};
use crate::scorers::interests::score_interests;
use crate::scorers::learning::learning_index;
use crate::stats::sten_to_percentile;

/// Tunables for profile finalization.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileConfig {
    pub cat: CatConfig,
    pub behavioral: BehavioralWeights,
}

/// The finalized profile of one assessment.
#[derive(Debug, Clone)]
pub struct ScoredProfile {
    /// One row per scored scale: active non-composite scales that saw
    /// responses, the learning-index composite, and the distortion scale
    /// when distortion items ran.
    pub scores: Vec<ScaleScore>,
    pub distortion: Option<DistortionReport>,
}

/// Score everything the response stream covers.
///
/// Pure: repeated invocation over the same inputs yields the same STENs
/// (row ids and timestamps are fresh, which is why completion must persist
/// the first result rather than recompute).
pub fn finalize_profile(
    assessment_id: Uuid,
    scales: &[Scale],
    items: &[Item],
    responses: &[Response],
    config: &ProfileConfig,
) -> ScoredProfile {
    let items_by_id: HashMap<Uuid, &Item> = items.iter().map(|item| (item.id, item)).collect();
    let mut scores = Vec::new();

    // Cognitive scales, then their composite
    let cognitive_start = scores.len();
    for scale in scales {
        if scale.domain == Domain::Cognitive && scale.kind == ScaleKind::Cognitive && !scale.is_composite() {
            if let Some(score) = score_cognitive_scale(
                assessment_id,
                &scale.id,
                &items_by_id,
                responses,
                &config.cat,
            ) {
                scores.push(score);
            }
        }
    }
    let cognitive_scores = scores[cognitive_start..].to_vec();
    for scale in scales {
        if scale.is_composite() {
            if let Some(score) = learning_index(assessment_id, scale, &cognitive_scores) {
                scores.push(score);
            }
        }
    }

    // Behavioral traits
    scores.extend(score_behavioral(
        assessment_id,
        &items_by_id,
        responses,
        &config.behavioral,
    ));

    // Interests, only when the section actually ran
    let saw_interests = responses.iter().any(|response| {
        items_by_id
            .get(&response.item_id)
            .is_some_and(|item| item.domain == Domain::Interests)
    });
    if saw_interests {
        let interest_scales: Vec<Scale> = scales
            .iter()
            .filter(|scale| scale.kind == ScaleKind::Interest)
            .cloned()
            .collect();
        scores.extend(score_interests(
            assessment_id,
            &interest_scales,
            &items_by_id,
            responses,
        ));
    }

    // Validity
    let mut distortion_ratings = Vec::new();
    let mut behavioral_stream = Vec::new();
    for response in responses {
        let Some(item) = items_by_id.get(&response.item_id) else {
            continue;
        };
        if item.domain != Domain::Behavioral || item.format != ItemFormat::Likert {
            continue;
        }
        let Some(rating) = response.value.as_likert() else {
            continue;
        };
        behavioral_stream.push(rating);
        if item.is_distortion {
            distortion_ratings.push(rating);
        }
    }

    let distortion = detect_distortion(&distortion_ratings, &behavioral_stream);
    if let Some(report) = &distortion {
        if let Some(scale) = scales.iter().find(|s| s.kind == ScaleKind::Distortion) {
            scores.push(ScaleScore::new(
                assessment_id,
                &scale.id,
                report.raw,
                report.sten,
                sten_to_percentile(report.sten),
                report.item_count,
            ));
        }
    }

    tracing::info!(
        %assessment_id,
        rows = scores.len(),
        distortion = distortion.is_some(),
        "profile finalized"
    );

    ScoredProfile { scores, distortion }
}
