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

//! Behavioral trait scoring.
//!
//! Two response channels feed each trait:
//!
//! - **Likert**: 1-5 ratings summed against theoretical bounds, with
//!   reverse-keyed items inverted (6 - x) before summing.
//! - **Forced choice**: multidimensional blocks where endorsing option A
//!   accumulates `+weight` and option B `-weight` per trait loading; the
//!   accumulated total is normalized into the 1-5 anchor range.
//!
//! When both channels score the same trait they are combined by a weighted
//! average in both raw and STEN space, STEN rounded after combination. The
//! 0.7/0.3 split has no theoretical backing, so it is exposed as
//! [`BehavioralWeights`] rather than baked in.

use std::collections::{BTreeMap, HashMap};

use uuid::Uuid;

use prism_core::{Choice, Domain, Item, ItemFormat, Response, ScaleScore};

use crate::stats::{likert_sum_to_sten, raw_to_sten, sten_to_percentile};

/// Relative weight of the Likert and forced-choice channels when both
/// cover a trait.
#[derive(Debug, Clone, Copy)]
pub struct BehavioralWeights {
    pub likert: f64,
    pub forced_choice: f64,
}

impl Default for BehavioralWeights {
    fn default() -> Self {
        Self {
            likert: 0.7,
            forced_choice: 0.3,
        }
    }
}

impl BehavioralWeights {
    fn normalized(&self) -> (f64, f64) {
        let total = self.likert + self.forced_choice;
        debug_assert!(total > 0.0, "behavioral channel weights sum to zero");
        (self.likert / total, self.forced_choice / total)
    }
}

#[derive(Default)]
struct LikertChannel {
    /// Ratings after reverse-key inversion.
    ratings: Vec<u8>,
}

#[derive(Default)]
struct ForcedChoiceChannel {
    accumulated: f64,
    /// Maximum absolute accumulation, for normalization into [1, 5].
    span: f64,
    item_count: u32,
}

impl ForcedChoiceChannel {
    /// Accumulated total mapped linearly from [-span, +span] onto [1, 5].
    fn normalized_value(&self) -> Option<f64> {
        if self.span <= 0.0 {
            return None;
        }
        Some(1.0 + 4.0 * (self.accumulated + self.span) / (2.0 * self.span))
    }
}

/// Score every behavioral trait present in the response stream.
///
/// Distortion items are excluded here; they feed the validity scorer.
/// Output is ordered by scale id so repeated finalization is byte-stable.
pub fn score_behavioral(
    assessment_id: Uuid,
    items_by_id: &HashMap<Uuid, &Item>,
    responses: &[Response],
    weights: &BehavioralWeights,
) -> Vec<ScaleScore> {
    let mut likert: BTreeMap<String, LikertChannel> = BTreeMap::new();
    let mut forced: BTreeMap<String, ForcedChoiceChannel> = BTreeMap::new();

    for response in responses {
        let Some(item) = items_by_id.get(&response.item_id) else {
            continue;
        };
        if item.domain != Domain::Behavioral || item.is_distortion {
            continue;
        }

        match item.format {
            ItemFormat::Likert => {
                let Some(rating) = response.value.as_likert() else {
                    continue;
                };
                let adjusted = if item.reverse_keyed { 6 - rating } else { rating };
                likert.entry(item.scale_id.clone()).or_default().ratings.push(adjusted);
            }
            ItemFormat::ForcedChoice => {
                let (Some(choice), Some(pair)) =
                    (response.value.as_choice(), item.forced_choice.as_ref())
                else {
                    continue;
                };
                let sign = match choice {
                    Choice::A => 1.0,
                    Choice::B => -1.0,
                };
                for loading in &pair.loadings {
                    let channel = forced.entry(loading.scale_id.clone()).or_default();
                    channel.accumulated += loading.weight * sign;
                    channel.span += loading.weight.abs();
                    channel.item_count += 1;
                }
            }
            _ => {}
        }
    }

    let (w_likert, w_forced) = weights.normalized();
    let mut scores = Vec::new();

    let mut scale_ids: Vec<String> = likert.keys().chain(forced.keys()).cloned().collect();
    scale_ids.sort();
    scale_ids.dedup();

    for scale_id in scale_ids {
        let likert_part = likert.get(&scale_id).filter(|ch| !ch.ratings.is_empty());
        let forced_part = forced.get(&scale_id).and_then(|ch| {
            ch.normalized_value().map(|value| (value, ch.item_count))
        });

        let score = match (likert_part, forced_part) {
            (Some(channel), None) => {
                let sum: f64 = channel.ratings.iter().map(|&r| r as f64).sum();
                let sten = likert_sum_to_sten(&channel.ratings);
                ScaleScore::new(
                    assessment_id,
                    &scale_id,
                    sum,
                    sten,
                    sten_to_percentile(sten),
                    channel.ratings.len() as u32,
                )
            }
            (None, Some((value, n))) => {
                let sten = raw_to_sten(value, 1.0, 5.0);
                ScaleScore::new(assessment_id, &scale_id, value, sten, sten_to_percentile(sten), n)
            }
            (Some(channel), Some((fc_value, fc_n))) => {
                let sum: f64 = channel.ratings.iter().map(|&r| r as f64).sum();
                let likert_mean = sum / channel.ratings.len() as f64;
                let likert_sten = likert_sum_to_sten(&channel.ratings);
                let fc_sten = raw_to_sten(fc_value, 1.0, 5.0);

                // Weighted average in both spaces; STEN rounded after
                // combination, never before.
                let raw = w_likert * likert_mean + w_forced * fc_value;
                let sten = (w_likert * likert_sten as f64 + w_forced * fc_sten as f64)
                    .round()
                    .clamp(1.0, 10.0) as u8;

                ScaleScore::new(
                    assessment_id,
                    &scale_id,
                    raw,
                    sten,
                    sten_to_percentile(sten),
                    channel.ratings.len() as u32 + fc_n,
                )
            }
            (None, None) => continue,
        };
        scores.push(score);
    }

    scores
}
