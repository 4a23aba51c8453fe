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

//! Performance models: per-scale STEN bands describing an ideal incumbent.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PrismError, Result};

/// Target STEN band and weight for one scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelScaleRange {
    pub scale_id: String,
    pub target_min: u8,
    pub target_max: u8,
    pub weight: f64,
}

impl ModelScaleRange {
    /// Requires 1 <= min <= max <= 10 and weight > 0.
    pub fn new(scale_id: impl Into<String>, target_min: u8, target_max: u8, weight: f64) -> Result<Self> {
        if !(1..=10).contains(&target_min) || !(1..=10).contains(&target_max) {
            return Err(PrismError::InputInvalid(format!(
                "target band must lie in [1, 10], got [{target_min}, {target_max}]"
            )));
        }
        if target_min > target_max {
            return Err(PrismError::InputInvalid(format!(
                "target band is inverted: [{target_min}, {target_max}]"
            )));
        }
        if !(weight.is_finite() && weight > 0.0) {
            return Err(PrismError::InputInvalid(format!(
                "range weight must be positive and finite, got {weight}"
            )));
        }
        Ok(Self {
            scale_id: scale_id.into(),
            target_min,
            target_max,
            weight,
        })
    }

    /// Band midpoint, used for rank-ordering interest scales.
    pub fn midpoint(&self) -> f64 {
        (self.target_min as f64 + self.target_max as f64) / 2.0
    }
}

/// A job's ideal-incumbent profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceModel {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    /// Library template vs customer-built model.
    #[serde(default)]
    pub is_template: bool,
    pub ranges: Vec<ModelScaleRange>,
}

impl PerformanceModel {
    pub fn new(name: impl Into<String>, category: impl Into<String>, ranges: Vec<ModelScaleRange>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category: category.into(),
            is_template: false,
            ranges,
        }
    }

    pub fn range_for(&self, scale_id: &str) -> Option<&ModelScaleRange> {
        self.ranges.iter().find(|r| r.scale_id == scale_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_validation() {
        assert!(ModelScaleRange::new("assertiveness", 5, 7, 1.0).is_ok());
        assert!(ModelScaleRange::new("assertiveness", 7, 5, 1.0).is_err());
        assert!(ModelScaleRange::new("assertiveness", 0, 7, 1.0).is_err());
        assert!(ModelScaleRange::new("assertiveness", 5, 11, 1.0).is_err());
        assert!(ModelScaleRange::new("assertiveness", 5, 7, 0.0).is_err());
        assert!(ModelScaleRange::new("assertiveness", 5, 7, -2.0).is_err());
    }

    #[test]
    fn midpoint() {
        let range = ModelScaleRange::new("enterprising", 6, 9, 1.0).unwrap();
        assert_eq!(range.midpoint(), 7.5);
    }
}
