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

//! Cognitive scale scoring: IRT theta to STEN.

use std::collections::HashMap;

use uuid::Uuid;

use prism_core::{Item, Response, ScaleScore};

use crate::irt::{estimate_or_sentinel, theta_to_sten, CatConfig};
use crate::stats::sten_to_percentile;

/// Score one cognitive scale from the administered responses.
///
/// Responses are taken in arrival order; each must already carry the
/// derived `is_correct` flag. Returns `None` when the scale saw no
/// responses (the profile then simply has no row for it).
pub fn score_cognitive_scale(
    assessment_id: Uuid,
    scale_id: &str,
    items_by_id: &HashMap<Uuid, &Item>,
    responses: &[Response],
    config: &CatConfig,
) -> Option<ScaleScore> {
    let mut params = Vec::new();
    let mut pattern = Vec::new();

    for response in responses {
        let Some(item) = items_by_id.get(&response.item_id) else {
            continue;
        };
        if item.scale_id != scale_id {
            continue;
        }
        let Some(correct) = response.is_correct else {
            continue;
        };
        params.push(item.irt);
        pattern.push(correct);
    }

    if pattern.is_empty() {
        return None;
    }

    let estimate = estimate_or_sentinel(&params, &pattern, config);
    let sten = theta_to_sten(estimate.theta);
    let raw = pattern.iter().filter(|&&u| u).count() as f64;

    tracing::debug!(
        scale_id,
        theta = estimate.theta,
        sem = estimate.sem,
        n = pattern.len(),
        "cognitive scale scored"
    );

    Some(
        ScaleScore::new(
            assessment_id,
            scale_id,
            raw,
            sten,
            sten_to_percentile(sten),
            pattern.len() as u32,
        )
        .with_theta(estimate.theta),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::{IrtParams, ResponseValue};

    fn fixture(scale: &str, n: usize) -> Vec<Item> {
        (0..n)
            .map(|i| {
                Item::cognitive(
                    scale,
                    format!("q{i}"),
                    vec!["a".into(), "b".into()],
                    "a",
                    IrtParams::new(1.0, -1.5 + i as f64 * 0.5, 0.2).unwrap(),
                    i as u32,
                )
            })
            .collect()
    }

    fn respond(assessment: Uuid, item: &Item, correct: bool) -> Response {
        let mut r = Response::new(
            assessment,
            item.id,
            ResponseValue::MultipleChoice(if correct { "a".into() } else { "b".into() }),
        );
        r.is_correct = Some(correct);
        r
    }

    #[test]
    fn mixed_pattern_scores_mid_range() {
        let assessment = Uuid::new_v4();
        let items = fixture("numerical_reasoning", 6);
        let by_id: HashMap<Uuid, &Item> = items.iter().map(|i| (i.id, i)).collect();
        let responses: Vec<Response> = items
            .iter()
            .enumerate()
            .map(|(i, item)| respond(assessment, item, i % 2 == 0))
            .collect();

        let score = score_cognitive_scale(
            assessment,
            "numerical_reasoning",
            &by_id,
            &responses,
            &CatConfig::default(),
        )
        .unwrap();

        assert_eq!(score.raw, 3.0);
        assert_eq!(score.item_count, 6);
        assert!((3..=8).contains(&score.sten));
        assert!(score.theta.is_some());
    }

    #[test]
    fn all_correct_hits_sentinel_ceiling() {
        let assessment = Uuid::new_v4();
        let items = fixture("spatial_reasoning", 6);
        let by_id: HashMap<Uuid, &Item> = items.iter().map(|i| (i.id, i)).collect();
        let responses: Vec<Response> = items
            .iter()
            .map(|item| respond(assessment, item, true))
            .collect();

        let score = score_cognitive_scale(
            assessment,
            "spatial_reasoning",
            &by_id,
            &responses,
            &CatConfig::default(),
        )
        .unwrap();

        assert_eq!(score.theta, Some(4.0));
        assert_eq!(score.sten, 10);
    }

    #[test]
    fn unrelated_scales_are_ignored() {
        let assessment = Uuid::new_v4();
        let items = fixture("numerical_reasoning", 4);
        let by_id: HashMap<Uuid, &Item> = items.iter().map(|i| (i.id, i)).collect();
        let responses: Vec<Response> = items
            .iter()
            .map(|item| respond(assessment, item, true))
            .collect();

        let score = score_cognitive_scale(
            assessment,
            "verbal_reasoning",
            &by_id,
            &responses,
            &CatConfig::default(),
        );
        assert!(score.is_none());
    }
}
