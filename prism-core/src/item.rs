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

//! Test items and their IRT parameterization. Immutable after authoring.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PrismError, Result};
use crate::scale::Domain;

/// Presentation format of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemFormat {
    MultipleChoice,
    Likert,
    ForcedChoice,
    Binary,
}

/// Three-parameter-logistic item parameters.
///
/// `a` is discrimination, `b` difficulty on the theta scale, `c` the
/// pseudo-guessing floor. Validated on construction; the IRT engine assumes
/// the invariants hold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrtParams {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl IrtParams {
    /// Requires a > 0, b in [-4, 4], c in [0, 0.35].
    pub fn new(a: f64, b: f64, c: f64) -> Result<Self> {
        if !(a.is_finite() && a > 0.0) {
            return Err(PrismError::InputInvalid(format!(
                "discrimination must be positive and finite, got {a}"
            )));
        }
        if !(-4.0..=4.0).contains(&b) {
            return Err(PrismError::InputInvalid(format!(
                "difficulty must be in [-4, 4], got {b}"
            )));
        }
        if !(0.0..=0.35).contains(&c) {
            return Err(PrismError::InputInvalid(format!(
                "guessing parameter must be in [0, 0.35], got {c}"
            )));
        }
        Ok(Self { a, b, c })
    }
}

impl Default for IrtParams {
    /// Median-difficulty item with unit discrimination and no guessing.
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
        }
    }
}

/// Loading of a forced-choice item onto a behavioral trait.
///
/// Endorsing option A accumulates `+weight` on the trait, option B
/// `-weight`; the sign of the weight itself encodes keying direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraitLoading {
    pub scale_id: String,
    pub weight: f64,
}

/// Scale bindings for a forced-choice item.
///
/// Interest pairs bind each option to exactly one interest scale.
/// Behavioral multidimensional forced-choice blocks additionally carry
/// per-trait loadings used by the forced-choice integrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForcedChoicePair {
    pub scale_a: String,
    pub scale_b: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub loadings: Vec<TraitLoading>,
}

/// A single test item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub scale_id: String,
    pub text: String,
    pub format: ItemFormat,
    pub options: Vec<String>,
    /// Present on cognitive items only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    pub irt: IrtParams,
    pub domain: Domain,
    /// Validity item mixed into the behavioral section.
    #[serde(default)]
    pub is_distortion: bool,
    /// Likert item keyed against the trait; scored as 6 - x.
    #[serde(default)]
    pub reverse_keyed: bool,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Presentation order within the scale for sequential sections.
    pub order: u32,
    /// Present on forced-choice items only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forced_choice: Option<ForcedChoicePair>,
}

fn default_active() -> bool {
    true
}

impl Item {
    /// A multiple-choice cognitive item with IRT parameters.
    pub fn cognitive(
        scale_id: impl Into<String>,
        text: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
        irt: IrtParams,
        order: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            scale_id: scale_id.into(),
            text: text.into(),
            format: ItemFormat::MultipleChoice,
            options,
            correct_answer: Some(correct_answer.into()),
            irt,
            domain: Domain::Cognitive,
            is_distortion: false,
            reverse_keyed: false,
            active: true,
            order,
            forced_choice: None,
        }
    }

    /// A 1-5 Likert behavioral item.
    pub fn likert(scale_id: impl Into<String>, text: impl Into<String>, order: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            scale_id: scale_id.into(),
            text: text.into(),
            format: ItemFormat::Likert,
            options: (1..=5).map(|n| n.to_string()).collect(),
            correct_answer: None,
            irt: IrtParams::default(),
            domain: Domain::Behavioral,
            is_distortion: false,
            reverse_keyed: false,
            active: true,
            order,
            forced_choice: None,
        }
    }

    /// A forced-choice interest pair; option A and B each map to a scale.
    pub fn interest_pair(
        text: impl Into<String>,
        option_a: impl Into<String>,
        scale_a: impl Into<String>,
        option_b: impl Into<String>,
        scale_b: impl Into<String>,
        order: u32,
    ) -> Self {
        let scale_a = scale_a.into();
        Self {
            id: Uuid::new_v4(),
            // The pair is filed under option A's scale for bookkeeping; the
            // interest scorer reads both scales from `forced_choice`.
            scale_id: scale_a.clone(),
            text: text.into(),
            format: ItemFormat::ForcedChoice,
            options: vec![option_a.into(), option_b.into()],
            correct_answer: None,
            irt: IrtParams::default(),
            domain: Domain::Interests,
            is_distortion: false,
            reverse_keyed: false,
            active: true,
            order,
            forced_choice: Some(ForcedChoicePair {
                scale_a,
                scale_b: scale_b.into(),
                loadings: Vec::new(),
            }),
        }
    }

    /// A behavioral forced-choice block loading on multiple traits.
    pub fn behavioral_pair(
        scale_id: impl Into<String>,
        text: impl Into<String>,
        option_a: impl Into<String>,
        option_b: impl Into<String>,
        loadings: Vec<TraitLoading>,
        order: u32,
    ) -> Self {
        let scale_id = scale_id.into();
        Self {
            id: Uuid::new_v4(),
            scale_id: scale_id.clone(),
            text: text.into(),
            format: ItemFormat::ForcedChoice,
            options: vec![option_a.into(), option_b.into()],
            correct_answer: None,
            irt: IrtParams::default(),
            domain: Domain::Behavioral,
            is_distortion: false,
            reverse_keyed: false,
            active: true,
            order,
            forced_choice: Some(ForcedChoicePair {
                scale_a: scale_id.clone(),
                scale_b: scale_id,
                loadings,
            }),
        }
    }

    pub fn with_reverse_keyed(mut self, reverse: bool) -> Self {
        self.reverse_keyed = reverse;
        self
    }

    pub fn with_distortion(mut self, distortion: bool) -> Self {
        self.is_distortion = distortion;
        self
    }

    pub fn with_irt(mut self, irt: IrtParams) -> Self {
        self.irt = irt;
        self
    }

    /// Authoring invariants: cognitive items carry a correct answer,
    /// non-cognitive items do not; forced-choice items carry their pair.
    pub fn validate(&self) -> Result<()> {
        match self.domain {
            Domain::Cognitive => {
                if self.correct_answer.is_none() {
                    return Err(PrismError::InputInvalid(format!(
                        "cognitive item {} has no correct answer",
                        self.id
                    )));
                }
            }
            Domain::Behavioral | Domain::Interests => {
                if self.correct_answer.is_some() {
                    return Err(PrismError::InputInvalid(format!(
                        "non-cognitive item {} must not have a correct answer",
                        self.id
                    )));
                }
            }
        }
        if self.format == ItemFormat::ForcedChoice && self.forced_choice.is_none() {
            return Err(PrismError::InputInvalid(format!(
                "forced-choice item {} has no scale pair",
                self.id
            )));
        }
        Ok(())
    }

    /// Case-insensitive, trimmed comparison against the keyed answer.
    pub fn is_answer_correct(&self, answer: &str) -> Option<bool> {
        self.correct_answer
            .as_deref()
            .map(|key| key.trim().eq_ignore_ascii_case(answer.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn irt_params_validate_bounds() {
        assert!(IrtParams::new(1.2, 0.5, 0.2).is_ok());
        assert!(IrtParams::new(0.0, 0.0, 0.0).is_err());
        assert!(IrtParams::new(1.0, 4.5, 0.0).is_err());
        assert!(IrtParams::new(1.0, 0.0, 0.4).is_err());
    }

    #[test]
    fn cognitive_item_requires_answer() {
        let mut item = Item::cognitive(
            "numerical_reasoning",
            "What is 12 * 12?",
            vec!["122".into(), "144".into(), "124".into(), "148".into()],
            "144",
            IrtParams::default(),
            1,
        );
        assert!(item.validate().is_ok());
        item.correct_answer = None;
        assert!(item.validate().is_err());
    }

    #[test]
    fn answer_comparison_is_trimmed_and_case_insensitive() {
        let item = Item::cognitive(
            "verbal_reasoning",
            "Opposite of 'scarce'?",
            vec!["Abundant".into(), "Rare".into()],
            "Abundant",
            IrtParams::default(),
            1,
        );
        assert_eq!(item.is_answer_correct("  abundant "), Some(true));
        assert_eq!(item.is_answer_correct("rare"), Some(false));
    }

    #[test]
    fn likert_item_has_no_answer() {
        let item = Item::likert("assertiveness", "I take charge in group settings.", 1);
        assert!(item.validate().is_ok());
        assert_eq!(item.correct_answer, None);
    }
}
