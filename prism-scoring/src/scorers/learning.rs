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

//! Learning-index composite: one summary score over the cognitive
//! sub-scales.

use uuid::Uuid;

use prism_core::{Scale, ScaleScore};

use crate::stats::{raw_to_sten, sten_to_percentile};

/// Fallback bounds assuming the historical fixed battery, used only when
/// the administered item counts are unknown.
const FALLBACK_BOUNDS: (f64, f64) = (80.0, 400.0);

/// Compose the learning index from the cognitive sub-scale scores.
///
/// Raw is the summed raw score of the composite's sub-scales. Bounds are
/// derived from the actually administered item counts (0 to one point per
/// item); adaptive sections vary in length, so a fixed range would skew
/// the standardization.
pub fn learning_index(
    assessment_id: Uuid,
    composite: &Scale,
    cognitive_scores: &[ScaleScore],
) -> Option<ScaleScore> {
    let part_ids = composite.composite_of.as_ref()?;

    let parts: Vec<&ScaleScore> = cognitive_scores
        .iter()
        .filter(|score| part_ids.contains(&score.scale_id))
        .collect();
    if parts.is_empty() {
        return None;
    }

    let raw: f64 = parts.iter().map(|score| score.raw).sum();
    let item_count: u32 = parts.iter().map(|score| score.item_count).sum();

    let (raw_min, raw_max) = if item_count > 0 {
        (0.0, item_count as f64)
    } else {
        FALLBACK_BOUNDS
    };

    let sten = raw_to_sten(raw, raw_min, raw_max);
    Some(ScaleScore::new(
        assessment_id,
        &composite.id,
        raw,
        sten,
        sten_to_percentile(sten),
        item_count,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::{Domain, ScaleKind};

    fn composite() -> Scale {
        Scale::composite(
            "learning_index",
            "Learning Index",
            Domain::Cognitive,
            ScaleKind::Cognitive,
            vec![
                "verbal_reasoning".into(),
                "numerical_reasoning".into(),
                "abstract_reasoning".into(),
                "spatial_reasoning".into(),
            ],
        )
    }

    #[test]
    fn sums_sub_scales_with_derived_bounds() {
        let assessment = Uuid::new_v4();
        let scores: Vec<ScaleScore> = [
            ("verbal_reasoning", 5.0, 10),
            ("numerical_reasoning", 6.0, 12),
            ("abstract_reasoning", 4.0, 8),
            ("spatial_reasoning", 5.0, 10),
        ]
        .into_iter()
        .map(|(id, raw, n)| ScaleScore::new(assessment, id, raw, 6, 60.0, n))
        .collect();

        let index = learning_index(assessment, &composite(), &scores).unwrap();
        assert_eq!(index.scale_id, "learning_index");
        assert_eq!(index.raw, 20.0);
        assert_eq!(index.item_count, 40);
        // 20 of 40 -> proportion 0.5 -> STEN 6
        assert_eq!(index.sten, 6);
    }

    #[test]
    fn ignores_unrelated_scales() {
        let assessment = Uuid::new_v4();
        let scores = vec![ScaleScore::new(assessment, "assertiveness", 30.0, 7, 70.0, 10)];
        assert!(learning_index(assessment, &composite(), &scores).is_none());
    }

    #[test]
    fn non_composite_scale_yields_nothing() {
        let assessment = Uuid::new_v4();
        let plain = Scale::new(
            "verbal_reasoning",
            "Verbal Reasoning",
            Domain::Cognitive,
            ScaleKind::Cognitive,
        );
        assert!(learning_index(assessment, &plain, &[]).is_none());
    }
}
