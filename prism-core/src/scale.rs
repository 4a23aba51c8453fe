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

//! Measurement scales. Seeded once, immutable afterwards.

use serde::{Deserialize, Serialize};

/// Test domain a scale belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Cognitive,
    Behavioral,
    Interests,
}

/// What kind of construct the scale measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleKind {
    /// Ability scale scored through IRT.
    Cognitive,
    /// Behavioral trait scored from Likert / forced-choice responses.
    Trait,
    /// Occupational interest scored ipsatively.
    Interest,
    /// Validity scale detecting socially desirable responding.
    Distortion,
}

/// A measurement scale.
///
/// Scale ids are stable string slugs (`"numerical_reasoning"`,
/// `"assertiveness"`): they key performance-model ranges and the interview
/// question catalog, so they must survive reseeding unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scale {
    pub id: String,
    pub name: String,
    pub domain: Domain,
    pub kind: ScaleKind,
    /// Sub-scale ids for composite scales (the learning index).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite_of: Option<Vec<String>>,
}

impl Scale {
    pub fn new(id: impl Into<String>, name: impl Into<String>, domain: Domain, kind: ScaleKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            domain,
            kind,
            composite_of: None,
        }
    }

    /// A composite scale aggregating the given sub-scales.
    pub fn composite(
        id: impl Into<String>,
        name: impl Into<String>,
        domain: Domain,
        kind: ScaleKind,
        parts: Vec<String>,
    ) -> Self {
        Self {
            composite_of: Some(parts),
            ..Self::new(id, name, domain, kind)
        }
    }

    pub fn is_composite(&self) -> bool {
        self.composite_of.is_some()
    }
}
