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

//! The job-match engine.
//!
//! Cognitive and behavioral fit are weight-averaged distance-decay
//! penalties over the model's bands. Interest fit is positional agreement
//! between the candidate's and the model's top-three interests. Scales the
//! model asks for but the profile lacks contribute nothing; they are
//! reported in the diagnostics instead of failing the match.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use prism_core::{Domain, PerformanceModel, Scale, ScaleKind, ScaleScore};
use prism_scoring::top_interests;
use prism_scoring::DistortionCategory;

use crate::distance::{band_distance, decay_penalty};

/// Where a candidate STEN sits relative to a model band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    High,
    Low,
    In,
}

/// Per-scale diagnostic record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleDeviation {
    pub scale_id: String,
    pub candidate_sten: u8,
    pub target_min: u8,
    pub target_max: u8,
    pub distance: u32,
    pub direction: Direction,
}

/// Domain weighting of the overall fit.
#[derive(Debug, Clone, Copy)]
pub struct MatchWeights {
    pub cognitive: f64,
    pub behavioral: f64,
    pub interests: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            cognitive: 0.4,
            behavioral: 0.4,
            interests: 0.2,
        }
    }
}

/// The result of matching one completed profile against one model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMatch {
    pub assessment_id: Uuid,
    pub model_id: Uuid,
    /// Overall fit percentage, 0-100.
    pub overall: u8,
    pub cognitive_fit: f64,
    pub behavioral_fit: f64,
    pub interest_fit: f64,
    pub deviations: Vec<ScaleDeviation>,
    /// Model scales the profile had no score for.
    pub missing_scales: Vec<String>,
    /// Validity category of the underlying profile; callers should refuse
    /// to base selection decisions on an `Invalid` profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity: Option<DistortionCategory>,
}

impl JobMatch {
    /// Deviations that warrant probing in an interview.
    pub fn out_of_band(&self) -> impl Iterator<Item = &ScaleDeviation> {
        self.deviations.iter().filter(|d| d.direction != Direction::In)
    }
}

/// Computes [`JobMatch`] results. Stateless; the weights are the only
/// configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchEngine {
    weights: MatchWeights,
}

impl MatchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(mut self, weights: MatchWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Match a completed profile against a performance model.
    ///
    /// `scales` supplies domain membership for the model's ranges;
    /// `scores` is the profile (one row per scored scale).
    pub fn compute(
        &self,
        assessment_id: Uuid,
        model: &PerformanceModel,
        scales: &[Scale],
        scores: &[ScaleScore],
        validity: Option<DistortionCategory>,
    ) -> JobMatch {
        let domain_of: HashMap<&str, Domain> = scales
            .iter()
            .map(|scale| (scale.id.as_str(), scale.domain))
            .collect();
        let score_by_scale: HashMap<&str, &ScaleScore> = scores
            .iter()
            .map(|score| (score.scale_id.as_str(), score))
            .collect();

        let mut cognitive = DomainAccumulator::default();
        let mut behavioral = DomainAccumulator::default();
        let mut deviations = Vec::new();
        let mut missing_scales = Vec::new();

        for range in &model.ranges {
            let Some(&domain) = domain_of.get(range.scale_id.as_str()) else {
                missing_scales.push(range.scale_id.clone());
                continue;
            };
            let Some(score) = score_by_scale.get(range.scale_id.as_str()) else {
                missing_scales.push(range.scale_id.clone());
                continue;
            };

            let distance = band_distance(score.sten, range.target_min, range.target_max);
            deviations.push(ScaleDeviation {
                scale_id: range.scale_id.clone(),
                candidate_sten: score.sten,
                target_min: range.target_min,
                target_max: range.target_max,
                distance,
                direction: if score.sten > range.target_max {
                    Direction::High
                } else if score.sten < range.target_min {
                    Direction::Low
                } else {
                    Direction::In
                },
            });

            match domain {
                Domain::Cognitive => cognitive.add(decay_penalty(distance), range.weight),
                Domain::Behavioral => behavioral.add(decay_penalty(distance), range.weight),
                // Interests are rank-matched below, not distance-decayed
                Domain::Interests => {}
            }
        }

        let cognitive_fit = cognitive.fit();
        let behavioral_fit = behavioral.fit();
        let interest_fit = self.interest_fit(model, scales, scores);

        let overall = (self.weights.cognitive * cognitive_fit
            + self.weights.behavioral * behavioral_fit
            + self.weights.interests * interest_fit)
            .round()
            .clamp(0.0, 100.0) as u8;

        tracing::debug!(
            %assessment_id,
            model = %model.id,
            overall,
            cognitive_fit,
            behavioral_fit,
            interest_fit,
            missing = missing_scales.len(),
            "job match computed"
        );

        JobMatch {
            assessment_id,
            model_id: model.id,
            overall,
            cognitive_fit,
            behavioral_fit,
            interest_fit,
            deviations,
            missing_scales,
            validity,
        }
    }

    /// Rank-order interest agreement: how many of the top-three positions
    /// coincide. The floor of 33 reflects that even a fully mismatched
    /// interest profile is not disqualifying.
    fn interest_fit(
        &self,
        model: &PerformanceModel,
        scales: &[Scale],
        scores: &[ScaleScore],
    ) -> f64 {
        let interest_ids: Vec<&str> = scales
            .iter()
            .filter(|scale| scale.kind == ScaleKind::Interest)
            .map(|scale| scale.id.as_str())
            .collect();

        let candidate_scores: Vec<ScaleScore> = scores
            .iter()
            .filter(|score| interest_ids.contains(&score.scale_id.as_str()))
            .cloned()
            .collect();
        let candidate_top = top_interests(&candidate_scores, 3);

        let mut model_ranges: Vec<_> = model
            .ranges
            .iter()
            .filter(|range| interest_ids.contains(&range.scale_id.as_str()))
            .collect();
        model_ranges.sort_by(|a, b| {
            b.midpoint()
                .partial_cmp(&a.midpoint())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.scale_id.cmp(&b.scale_id))
        });
        let model_top: Vec<&str> = model_ranges.iter().take(3).map(|r| r.scale_id.as_str()).collect();

        let matches = candidate_top
            .iter()
            .zip(&model_top)
            .filter(|&(candidate, model)| candidate == model)
            .count();

        (33.33 + matches as f64 * 22.22).round()
    }
}

#[derive(Default)]
struct DomainAccumulator {
    weighted_penalty: f64,
    total_weight: f64,
}

impl DomainAccumulator {
    fn add(&mut self, penalty: f64, weight: f64) {
        self.weighted_penalty += penalty * weight;
        self.total_weight += weight;
    }

    /// Weighted mean penalty as a percentage; zero when nothing
    /// contributed.
    fn fit(&self) -> f64 {
        if self.total_weight > 0.0 {
            self.weighted_penalty / self.total_weight * 100.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::ModelScaleRange;

    fn scales() -> Vec<Scale> {
        let mut scales = vec![
            Scale::new("numerical_reasoning", "Numerical Reasoning", Domain::Cognitive, ScaleKind::Cognitive),
            Scale::new("verbal_reasoning", "Verbal Reasoning", Domain::Cognitive, ScaleKind::Cognitive),
            Scale::new("assertiveness", "Assertiveness", Domain::Behavioral, ScaleKind::Trait),
            Scale::new("sociability", "Sociability", Domain::Behavioral, ScaleKind::Trait),
        ];
        for id in ["realistic", "investigative", "artistic", "social", "enterprising", "conventional"] {
            scales.push(Scale::new(id, id, Domain::Interests, ScaleKind::Interest));
        }
        scales
    }

    fn score(assessment: Uuid, scale: &str, sten: u8) -> ScaleScore {
        ScaleScore::new(assessment, scale, sten as f64, sten, 50.0, 10)
    }

    #[test]
    fn perfect_bands_score_one_hundred_per_domain() {
        let assessment = Uuid::new_v4();
        let model = PerformanceModel::new(
            "Analyst",
            "professional",
            vec![
                ModelScaleRange::new("numerical_reasoning", 5, 7, 1.0).unwrap(),
                ModelScaleRange::new("verbal_reasoning", 5, 7, 1.0).unwrap(),
                ModelScaleRange::new("assertiveness", 5, 7, 1.0).unwrap(),
            ],
        );
        let scores = vec![
            score(assessment, "numerical_reasoning", 6),
            score(assessment, "verbal_reasoning", 6),
            score(assessment, "assertiveness", 6),
        ];

        let result = MatchEngine::new().compute(assessment, &model, &scales(), &scores, None);
        assert_eq!(result.cognitive_fit, 100.0);
        assert_eq!(result.behavioral_fit, 100.0);
        // No interest data: rank agreement floor
        assert_eq!(result.interest_fit, 33.0);
        // 0.4*100 + 0.4*100 + 0.2*33 = 86.6 -> 87
        assert_eq!(result.overall, 87);
        assert!(result.deviations.iter().all(|d| d.direction == Direction::In));
    }

    #[test]
    fn domain_weighting_of_overall() {
        let assessment = Uuid::new_v4();
        // Cognitive/behavioral perfect, interests floored:
        // overall = 0.4*100 + 0.4*100 + 0.2*0 would be 80 with interest 0,
        // but interest fit never drops below 33; validated above. Here the
        // inverse: both distance domains at zero.
        let model = PerformanceModel::new(
            "Operator",
            "industrial",
            vec![
                ModelScaleRange::new("numerical_reasoning", 5, 5, 1.0).unwrap(),
                ModelScaleRange::new("assertiveness", 5, 5, 1.0).unwrap(),
            ],
        );
        let scores = vec![
            score(assessment, "numerical_reasoning", 10),
            score(assessment, "assertiveness", 10),
        ];

        let result = MatchEngine::new().compute(assessment, &model, &scales(), &scores, None);
        assert_eq!(result.cognitive_fit, 0.0);
        assert_eq!(result.behavioral_fit, 0.0);
        // 0.2 * 33 = 6.6 -> 7
        assert_eq!(result.overall, 7);
    }

    #[test]
    fn near_misses_decay_gently() {
        let assessment = Uuid::new_v4();
        let model = PerformanceModel::new(
            "Supervisor",
            "management",
            vec![
                ModelScaleRange::new("assertiveness", 5, 7, 3.0).unwrap(),
                ModelScaleRange::new("sociability", 5, 7, 1.0).unwrap(),
            ],
        );
        // One STEN above band (penalty 0.80, weight 3), one inside
        // (penalty 1.0, weight 1): fit = (0.8*3 + 1*1) / 4 = 85%
        let scores = vec![
            score(assessment, "assertiveness", 8),
            score(assessment, "sociability", 6),
        ];

        let result = MatchEngine::new().compute(assessment, &model, &scales(), &scores, None);
        assert!((result.behavioral_fit - 85.0).abs() < 1e-9);

        let deviation = result
            .deviations
            .iter()
            .find(|d| d.scale_id == "assertiveness")
            .unwrap();
        assert_eq!(deviation.direction, Direction::High);
        assert_eq!(deviation.distance, 1);
    }

    #[test]
    fn missing_scores_shrink_the_basis_instead_of_failing() {
        let assessment = Uuid::new_v4();
        let model = PerformanceModel::new(
            "Analyst",
            "professional",
            vec![
                ModelScaleRange::new("numerical_reasoning", 5, 7, 1.0).unwrap(),
                ModelScaleRange::new("verbal_reasoning", 5, 7, 1.0).unwrap(),
            ],
        );
        let scores = vec![score(assessment, "numerical_reasoning", 6)];

        let result = MatchEngine::new().compute(assessment, &model, &scales(), &scores, None);
        assert_eq!(result.cognitive_fit, 100.0);
        assert_eq!(result.missing_scales, vec!["verbal_reasoning".to_string()]);
        assert_eq!(result.deviations.len(), 1);
    }

    #[test]
    fn interest_rank_agreement_steps() {
        let assessment = Uuid::new_v4();
        let mut ranges = vec![
            ModelScaleRange::new("investigative", 8, 10, 1.0).unwrap(),
            ModelScaleRange::new("realistic", 6, 8, 1.0).unwrap(),
            ModelScaleRange::new("conventional", 5, 7, 1.0).unwrap(),
        ];
        ranges.push(ModelScaleRange::new("artistic", 1, 3, 1.0).unwrap());
        let model = PerformanceModel::new("Engineer", "technical", ranges);

        // Candidate top-3 in the same order as the model's band midpoints
        let scores = vec![
            score(assessment, "investigative", 9),
            score(assessment, "realistic", 8),
            score(assessment, "conventional", 7),
            score(assessment, "artistic", 2),
            score(assessment, "social", 3),
            score(assessment, "enterprising", 4),
        ];
        let result = MatchEngine::new().compute(assessment, &model, &scales(), &scores, None);
        // 33.33 + 3 * 22.22 = 99.99 -> 100
        assert_eq!(result.interest_fit, 100.0);

        // Swap the top two: positions 0 and 1 disagree, position 2 holds
        let scores = vec![
            score(assessment, "realistic", 9),
            score(assessment, "investigative", 8),
            score(assessment, "conventional", 7),
            score(assessment, "artistic", 2),
            score(assessment, "social", 3),
            score(assessment, "enterprising", 4),
        ];
        let result = MatchEngine::new().compute(assessment, &model, &scales(), &scores, None);
        // 33.33 + 1 * 22.22 = 55.55 -> 56
        assert_eq!(result.interest_fit, 56.0);
    }

    #[test]
    fn match_report_serializes_field_names_as_is() {
        let assessment = Uuid::new_v4();
        let model = PerformanceModel::new(
            "Analyst",
            "professional",
            vec![ModelScaleRange::new("assertiveness", 5, 7, 1.0).unwrap()],
        );
        let scores = vec![score(assessment, "assertiveness", 9)];
        let result = MatchEngine::new().compute(assessment, &model, &scales(), &scores, None);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["overall"], result.overall);
        assert_eq!(json["deviations"][0]["scale_id"], "assertiveness");
        assert_eq!(json["deviations"][0]["direction"], "high");
        assert_eq!(json["deviations"][0]["candidate_sten"], 9);
    }

    #[test]
    fn validity_flag_travels_with_the_match() {
        let assessment = Uuid::new_v4();
        let model = PerformanceModel::new(
            "Analyst",
            "professional",
            vec![ModelScaleRange::new("assertiveness", 5, 7, 1.0).unwrap()],
        );
        let scores = vec![score(assessment, "assertiveness", 6)];
        let result = MatchEngine::new().compute(
            assessment,
            &model,
            &scales(),
            &scores,
            Some(DistortionCategory::Invalid),
        );
        assert_eq!(result.validity, Some(DistortionCategory::Invalid));
    }
}
