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

//! Standardized scale scores. Created once when an assessment completes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One standardized score on one scale.
///
/// STEN is always an integer clamped to [1, 10] (population mean 5.5,
/// SD 2); `raw` and `percentile` are finite doubles; `theta` is present on
/// IRT-scored scales only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleScore {
    pub id: Uuid,
    pub assessment_id: Uuid,
    pub scale_id: String,
    pub raw: f64,
    pub sten: u8,
    pub percentile: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theta: Option<f64>,
    pub item_count: u32,
    pub computed_at: DateTime<Utc>,
}

impl ScaleScore {
    pub fn new(
        assessment_id: Uuid,
        scale_id: impl Into<String>,
        raw: f64,
        sten: u8,
        percentile: f64,
        item_count: u32,
    ) -> Self {
        debug_assert!((1..=10).contains(&sten));
        Self {
            id: Uuid::new_v4(),
            assessment_id,
            scale_id: scale_id.into(),
            raw,
            sten,
            percentile,
            theta: None,
            item_count,
            computed_at: Utc::now(),
        }
    }

    pub fn with_theta(mut self, theta: f64) -> Self {
        self.theta = Some(theta);
        self
    }
}
