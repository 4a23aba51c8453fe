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

//! Interview-question generation.
//!
//! A static catalog maps (scale id, deviation direction) to curated
//! probes. Scales without curated content fall back to two generic
//! templates interpolating the scale name, so every out-of-band deviation
//! yields something an interviewer can work with.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use prism_core::Scale;

use crate::engine::{Direction, ScaleDeviation};

/// One curated interview probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub id: String,
    pub text: String,
    pub category: String,
}

/// Questions for one out-of-band scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewBlock {
    pub scale_id: String,
    pub scale_name: String,
    pub direction: Direction,
    pub candidate_sten: u8,
    pub target_min: u8,
    pub target_max: u8,
    pub questions: Vec<InterviewQuestion>,
}

/// Curated probe catalog, keyed by (scale id, direction). Immutable and
/// process-wide.
static CATALOG: Lazy<HashMap<(&'static str, Direction), Vec<InterviewQuestion>>> =
    Lazy::new(|| {
        let mut catalog = HashMap::new();

        let mut add = |scale: &'static str,
                       direction: Direction,
                       category: &'static str,
                       texts: &[&str]| {
            let tag = match direction {
                Direction::High => "high",
                Direction::Low => "low",
                Direction::In => unreachable!("catalog holds out-of-band probes only"),
            };
            let questions: Vec<InterviewQuestion> = texts
                .iter()
                .enumerate()
                .map(|(i, text)| InterviewQuestion {
                    id: format!("{scale}_{tag}_{}", i + 1),
                    text: (*text).to_string(),
                    category: category.to_string(),
                })
                .collect();
            catalog.insert((scale, direction), questions);
        };

        add(
            "assertiveness",
            Direction::High,
            "leadership",
            &[
                "Tell me about a time your directness created friction with a colleague. How did you repair the relationship?",
                "Describe a situation where you deliberately held back your own view. What made you decide to?",
            ],
        );
        add(
            "assertiveness",
            Direction::Low,
            "leadership",
            &[
                "Describe a time you disagreed with a decision but said nothing. What would make you speak up?",
                "Tell me about the last time you had to push back on a stakeholder. How did you approach it?",
            ],
        );
        add(
            "sociability",
            Direction::High,
            "collaboration",
            &[
                "How do you stay productive on tasks that require long stretches of solitary focus?",
                "Tell me about a role where you had little day-to-day contact with others. How did it suit you?",
            ],
        );
        add(
            "sociability",
            Direction::Low,
            "collaboration",
            &[
                "This role involves constant customer contact. Walk me through how you would manage that energy demand.",
                "Describe how you build working relationships with people you don't naturally connect with.",
            ],
        );
        add(
            "conscientiousness",
            Direction::High,
            "work_style",
            &[
                "Tell me about a time perfectionism slowed a deliverable. How did you decide when it was good enough?",
                "How do you handle handing work to people with looser standards than yours?",
            ],
        );
        add(
            "conscientiousness",
            Direction::Low,
            "work_style",
            &[
                "Describe the system you use to make sure routine details don't slip.",
                "Tell me about a time a missed detail caused a problem. What changed afterwards?",
            ],
        );
        add(
            "emotional_stability",
            Direction::Low,
            "resilience",
            &[
                "Walk me through the most stressful period in your last role. What did your manager see from the outside?",
                "What kinds of pressure affect your work the most, and what do you do about it?",
            ],
        );
        add(
            "drive",
            Direction::High,
            "motivation",
            &[
                "Tell me about a goal you pursued that, in hindsight, cost more than it returned.",
                "How do you react when the organization's pace is slower than yours?",
            ],
        );
        add(
            "drive",
            Direction::Low,
            "motivation",
            &[
                "What kind of work gets you to go beyond what was asked? Give me a recent example.",
                "Describe a time you had to sustain effort on something you found dull.",
            ],
        );
        add(
            "teamwork",
            Direction::Low,
            "collaboration",
            &[
                "Tell me about a team decision you disagreed with but had to carry out. What did you do?",
                "Describe your ideal split between independent work and group work, and why.",
            ],
        );

        catalog
    });

/// Generic probes for a scale with no curated content.
fn generic_questions(scale_name: &str, direction: Direction) -> Vec<InterviewQuestion> {
    let (tag, framing) = match direction {
        Direction::High => ("high", "scored above"),
        Direction::Low => ("low", "scored below"),
        Direction::In => unreachable!("in-band deviations are filtered before generation"),
    };
    vec![
        InterviewQuestion {
            id: format!("generic_{tag}_1"),
            text: format!(
                "Your profile {framing} the target range for {scale_name}. Tell me about a work situation where that showed."
            ),
            category: "general".to_string(),
        },
        InterviewQuestion {
            id: format!("generic_{tag}_2"),
            text: format!(
                "How would your {scale_name} profile affect the way you approach this role day to day?"
            ),
            category: "general".to_string(),
        },
    ]
}

/// Build one interview block per out-of-band deviation.
///
/// In-band deviations are skipped; unknown scales get the generic
/// templates. Blocks come back in the order the deviations were given.
pub fn generate_interview_blocks(
    deviations: &[ScaleDeviation],
    scales: &[Scale],
) -> Vec<InterviewBlock> {
    let names: HashMap<&str, &str> = scales
        .iter()
        .map(|scale| (scale.id.as_str(), scale.name.as_str()))
        .collect();

    deviations
        .iter()
        .filter(|deviation| deviation.direction != Direction::In)
        .map(|deviation| {
            let scale_name = names
                .get(deviation.scale_id.as_str())
                .copied()
                .unwrap_or(deviation.scale_id.as_str());

            let questions = CATALOG
                .get(&(deviation.scale_id.as_str(), deviation.direction))
                .cloned()
                .unwrap_or_else(|| generic_questions(scale_name, deviation.direction));

            InterviewBlock {
                scale_id: deviation.scale_id.clone(),
                scale_name: scale_name.to_string(),
                direction: deviation.direction,
                candidate_sten: deviation.candidate_sten,
                target_min: deviation.target_min,
                target_max: deviation.target_max,
                questions,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::{Domain, ScaleKind};

    fn deviation(scale_id: &str, sten: u8, min: u8, max: u8) -> ScaleDeviation {
        let direction = if sten > max {
            Direction::High
        } else if sten < min {
            Direction::Low
        } else {
            Direction::In
        };
        ScaleDeviation {
            scale_id: scale_id.to_string(),
            candidate_sten: sten,
            target_min: min,
            target_max: max,
            distance: (min.saturating_sub(sten) + sten.saturating_sub(max)) as u32,
            direction,
        }
    }

    #[test]
    fn curated_probes_for_known_scales() {
        let scales = vec![Scale::new(
            "assertiveness",
            "Assertiveness",
            Domain::Behavioral,
            ScaleKind::Trait,
        )];
        let blocks =
            generate_interview_blocks(&[deviation("assertiveness", 9, 4, 7)], &scales);

        assert_eq!(blocks.len(), 1);
        let block = &blocks[0];
        assert_eq!(block.direction, Direction::High);
        assert_eq!(block.candidate_sten, 9);
        assert_eq!(block.questions.len(), 2);
        assert!(block.questions[0].id.starts_with("assertiveness_high"));
        assert_eq!(block.questions[0].category, "leadership");
    }

    #[test]
    fn in_band_deviations_produce_nothing() {
        let scales = vec![Scale::new(
            "assertiveness",
            "Assertiveness",
            Domain::Behavioral,
            ScaleKind::Trait,
        )];
        let blocks = generate_interview_blocks(&[deviation("assertiveness", 6, 4, 7)], &scales);
        assert!(blocks.is_empty());
    }

    #[test]
    fn unknown_scales_fall_back_to_templates() {
        let scales = vec![Scale::new(
            "customer_focus",
            "Customer Focus",
            Domain::Behavioral,
            ScaleKind::Trait,
        )];
        let blocks = generate_interview_blocks(&[deviation("customer_focus", 2, 5, 8)], &scales);

        assert_eq!(blocks.len(), 1);
        let block = &blocks[0];
        assert_eq!(block.questions.len(), 2);
        assert!(block.questions[0].id.starts_with("generic_low"));
        assert!(block.questions[0].text.contains("Customer Focus"));
    }

    #[test]
    fn block_order_follows_deviation_order() {
        let scales = vec![
            Scale::new("drive", "Drive", Domain::Behavioral, ScaleKind::Trait),
            Scale::new("teamwork", "Teamwork", Domain::Behavioral, ScaleKind::Trait),
        ];
        let blocks = generate_interview_blocks(
            &[
                deviation("teamwork", 2, 5, 8),
                deviation("drive", 10, 4, 7),
            ],
            &scales,
        );
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].scale_id, "teamwork");
        assert_eq!(blocks[1].scale_id, "drive");
    }
}
