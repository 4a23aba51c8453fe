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

//! Response validity: distortion ("faking good") and careless-responding
//! detection.
//!
//! Distortion items are over-virtuous statements ("I have never told a
//! lie") interleaved with the behavioral section. High endorsement means
//! the candidate is presenting an unrealistically favorable picture, so a
//! high distortion STEN is the invalid direction. Pattern checks over the
//! full behavioral stream catch straight-lining, mechanical alternation,
//! and statistically random answering.

use serde::{Deserialize, Serialize};

use crate::stats::likert_sum_to_sten;

/// Validity category from the distortion STEN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistortionCategory {
    Valid,
    Warning,
    Invalid,
}

impl DistortionCategory {
    /// High endorsement of distortion items is the distorted direction.
    pub fn from_sten(sten: u8) -> Self {
        match sten {
            s if s >= 7 => DistortionCategory::Invalid,
            4..=6 => DistortionCategory::Warning,
            _ => DistortionCategory::Valid,
        }
    }
}

/// Mechanical response pattern detected in the behavioral stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponsePattern {
    /// Every response identical.
    StraightLine,
    /// Period-two repetition (1-5-1-5-...).
    Alternating,
    /// Directional runs consistent with coin-flip answering.
    Random,
}

/// What to do with the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Use,
    Interview,
    Discard,
}

/// Full validity analysis for one assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistortionReport {
    /// Summed distortion-item ratings.
    pub raw: f64,
    pub sten: u8,
    pub category: DistortionCategory,
    /// Spread of behavioral responding scaled to 0-100; low values mean
    /// the candidate barely varied their answers.
    pub consistency_score: f64,
    pub patterns: Vec<ResponsePattern>,
    pub recommendation: Recommendation,
    /// Number of distortion items administered.
    pub item_count: u32,
}

/// Analyze validity from the distortion ratings and the full behavioral
/// Likert stream (distortion items included), both in arrival order.
///
/// Returns `None` when no distortion items were administered.
pub fn detect_distortion(
    distortion_ratings: &[u8],
    behavioral_stream: &[u8],
) -> Option<DistortionReport> {
    if distortion_ratings.is_empty() {
        return None;
    }

    let raw: f64 = distortion_ratings.iter().map(|&r| r as f64).sum();
    let sten = likert_sum_to_sten(distortion_ratings);
    let category = DistortionCategory::from_sten(sten);

    let sigma = std_dev(behavioral_stream);
    let consistency_score = (sigma / 1.5 * 100.0).min(100.0);

    let patterns = detect_patterns(behavioral_stream);

    let recommendation = if category == DistortionCategory::Invalid
        || patterns.contains(&ResponsePattern::Random)
    {
        Recommendation::Discard
    } else if category == DistortionCategory::Warning
        || patterns.contains(&ResponsePattern::StraightLine)
        || patterns.contains(&ResponsePattern::Alternating)
    {
        Recommendation::Interview
    } else {
        Recommendation::Use
    };

    if recommendation != Recommendation::Use {
        tracing::warn!(
            sten,
            ?category,
            ?patterns,
            ?recommendation,
            "behavioral responding flagged by validity checks"
        );
    }

    Some(DistortionReport {
        raw,
        sten,
        category,
        consistency_score,
        patterns,
        recommendation,
        item_count: distortion_ratings.len() as u32,
    })
}

fn detect_patterns(stream: &[u8]) -> Vec<ResponsePattern> {
    let mut patterns = Vec::new();
    let n = stream.len();

    if n >= 5 && stream.iter().all(|&v| v == stream[0]) {
        patterns.push(ResponsePattern::StraightLine);
    }

    // Period-two repetition: value at i equals value at i + 2
    if n >= 5 {
        let pairs = n - 2;
        let equal = (0..pairs).filter(|&i| stream[i] == stream[i + 2]).count();
        if equal as f64 >= 0.8 * pairs as f64 {
            patterns.push(ResponsePattern::Alternating);
        }
    }

    // Wallis-Moore runs test: a directional-run count close to the
    // expectation (2n - 1) / 3 is what genuine coin-flip answering looks
    // like
    if n >= 5 {
        let runs = direction_runs(stream);
        let expected = (2.0 * n as f64 - 1.0) / 3.0;
        if (runs as f64 - expected).abs() < 0.3 * expected {
            patterns.push(ResponsePattern::Random);
        }
    }

    patterns
}

/// Runs of strictly increasing/decreasing movement; ties extend the
/// current run.
fn direction_runs(stream: &[u8]) -> usize {
    let mut runs = 0;
    let mut previous_sign = 0i8;
    for pair in stream.windows(2) {
        let sign = match pair[1].cmp(&pair[0]) {
            std::cmp::Ordering::Greater => 1,
            std::cmp::Ordering::Less => -1,
            std::cmp::Ordering::Equal => continue,
        };
        if sign != previous_sign {
            runs += 1;
            previous_sign = sign;
        }
    }
    runs
}

fn std_dev(values: &[u8]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|&v| (v as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_bands() {
        assert_eq!(DistortionCategory::from_sten(1), DistortionCategory::Valid);
        assert_eq!(DistortionCategory::from_sten(3), DistortionCategory::Valid);
        assert_eq!(DistortionCategory::from_sten(4), DistortionCategory::Warning);
        assert_eq!(DistortionCategory::from_sten(6), DistortionCategory::Warning);
        assert_eq!(DistortionCategory::from_sten(7), DistortionCategory::Invalid);
        assert_eq!(DistortionCategory::from_sten(10), DistortionCategory::Invalid);
    }

    #[test]
    fn maximal_endorsement_is_discarded() {
        // 15 distortion items all rated 5: STEN 10, invalid, discard
        let ratings = [5u8; 15];
        let report = detect_distortion(&ratings, &ratings).unwrap();
        assert_eq!(report.sten, 10);
        assert_eq!(report.category, DistortionCategory::Invalid);
        assert_eq!(report.recommendation, Recommendation::Discard);
    }

    #[test]
    fn honest_varied_responding_is_usable() {
        let ratings = [1u8, 2, 1, 2, 3, 1, 2, 1, 1, 2];
        // Long directional runs: far from both mechanical repetition and
        // the coin-flip run count
        let stream = [
            1u8, 2, 3, 4, 5, 4, 3, 2, 1, 2, 3, 4, 5, 4, 3, 2, 1, 2, 3, 4,
        ];
        let report = detect_distortion(&ratings, &stream).unwrap();
        assert_eq!(report.category, DistortionCategory::Valid);
        assert!(report.patterns.is_empty());
        assert_eq!(report.recommendation, Recommendation::Use);
        assert!(report.consistency_score > 50.0);
    }

    #[test]
    fn straight_line_stream_is_flagged() {
        let ratings = [1u8, 1, 2, 1, 2];
        let stream = [3u8; 20];
        let report = detect_distortion(&ratings, &stream).unwrap();
        assert!(report.patterns.contains(&ResponsePattern::StraightLine));
        assert_eq!(report.recommendation, Recommendation::Interview);
        assert_eq!(report.consistency_score, 0.0);
    }

    #[test]
    fn alternating_stream_is_flagged() {
        let ratings = [1u8, 1, 2, 1, 2];
        let stream: Vec<u8> = (0..20).map(|i| if i % 2 == 0 { 1 } else { 5 }).collect();
        let report = detect_distortion(&ratings, &stream).unwrap();
        assert!(report.patterns.contains(&ResponsePattern::Alternating));
        assert_ne!(report.recommendation, Recommendation::Use);
    }

    #[test]
    fn no_distortion_items_no_report() {
        assert!(detect_distortion(&[], &[3, 4, 5]).is_none());
    }
}
