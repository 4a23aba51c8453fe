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

//! Interest scoring: ipsative forced-choice pairs to normative STENs.
//!
//! Interest items are forced-choice pairs where the six Holland-style
//! scales compete; each response awards a win to one scale. Win counts are
//! ipsative (sum-constant), so they are converted to normative scores by
//! rank: rank r of N maps to the percentile midpoint (N - r + 0.5) / N,
//! which goes through the normal quantile onto the STEN scale.

use std::collections::HashMap;

use uuid::Uuid;

use prism_core::{Choice, Domain, Item, ItemFormat, Response, Scale, ScaleScore};

use crate::stats::{percentile_to_sten, sten_to_percentile};

/// Score the interest domain from forced-choice pair responses.
///
/// Every interest scale receives a row, including scales with zero wins;
/// rank ties break by scale id so the result is deterministic.
pub fn score_interests(
    assessment_id: Uuid,
    interest_scales: &[Scale],
    items_by_id: &HashMap<Uuid, &Item>,
    responses: &[Response],
) -> Vec<ScaleScore> {
    let mut wins: HashMap<&str, u32> = interest_scales
        .iter()
        .map(|scale| (scale.id.as_str(), 0))
        .collect();
    let mut appearances: HashMap<&str, u32> = wins.clone();

    for response in responses {
        let Some(item) = items_by_id.get(&response.item_id) else {
            continue;
        };
        if item.domain != Domain::Interests || item.format != ItemFormat::ForcedChoice {
            continue;
        }
        let (Some(choice), Some(pair)) =
            (response.value.as_choice(), item.forced_choice.as_ref())
        else {
            continue;
        };

        let winner = match choice {
            Choice::A => pair.scale_a.as_str(),
            Choice::B => pair.scale_b.as_str(),
        };
        if let Some(count) = wins.get_mut(winner) {
            *count += 1;
        }
        for scale in [pair.scale_a.as_str(), pair.scale_b.as_str()] {
            if let Some(count) = appearances.get_mut(scale) {
                *count += 1;
            }
        }
    }

    // Rank descending by wins, ties by scale id
    let mut ranked: Vec<(&str, u32)> = wins.iter().map(|(&id, &count)| (id, count)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    let n = ranked.len() as f64;
    ranked
        .iter()
        .enumerate()
        .map(|(index, &(scale_id, count))| {
            let rank = (index + 1) as f64;
            let percentile = (n - rank + 0.5) / n * 100.0;
            let sten = percentile_to_sten(percentile);
            ScaleScore::new(
                assessment_id,
                scale_id,
                count as f64,
                sten,
                sten_to_percentile(sten),
                appearances.get(scale_id).copied().unwrap_or(0),
            )
        })
        .collect()
}

/// The candidate's strongest interests: STEN descending, ties broken by
/// higher win count, then by scale id.
pub fn top_interests(scores: &[ScaleScore], k: usize) -> Vec<String> {
    let mut sorted: Vec<&ScaleScore> = scores.iter().collect();
    sorted.sort_by(|a, b| {
        b.sten
            .cmp(&a.sten)
            .then(b.raw.partial_cmp(&a.raw).unwrap_or(std::cmp::Ordering::Equal))
            .then(a.scale_id.cmp(&b.scale_id))
    });
    sorted.into_iter().take(k).map(|s| s.scale_id.clone()).collect()
}
