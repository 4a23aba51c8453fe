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

//! Persistence contract.
//!
//! The relational store is an external collaborator; the core only relies on
//! this synchronous trait. Implementations must make each method atomic, and
//! must preserve response append order per assessment - the session layer's
//! ordering guarantee stands on that.

use uuid::Uuid;

use crate::assessment::Assessment;
use crate::candidate::Candidate;
use crate::error::Result;
use crate::item::Item;
use crate::model::PerformanceModel;
use crate::response::Response;
use crate::scale::{Domain, Scale};
use crate::score::ScaleScore;

pub trait Repository: Send + Sync {
    // Scales (seeded, immutable)
    fn insert_scale(&self, scale: Scale) -> Result<()>;
    fn scale(&self, id: &str) -> Result<Option<Scale>>;
    fn scales_in_domain(&self, domain: Domain) -> Result<Vec<Scale>>;

    // Items (authored, immutable)
    fn insert_item(&self, item: Item) -> Result<()>;
    fn item(&self, id: Uuid) -> Result<Option<Item>>;
    /// Active items in a domain, ordered by (scale_id, order, id).
    fn active_items_in_domain(&self, domain: Domain) -> Result<Vec<Item>>;
    /// Active items belonging to one scale, ordered by (order, id).
    fn active_items_in_scale(&self, scale_id: &str) -> Result<Vec<Item>>;

    // Candidates
    fn insert_candidate(&self, candidate: Candidate) -> Result<()>;
    fn candidate(&self, id: Uuid) -> Result<Option<Candidate>>;

    // Assessments
    fn insert_assessment(&self, assessment: Assessment) -> Result<()>;
    fn assessment(&self, id: Uuid) -> Result<Option<Assessment>>;
    fn update_assessment(&self, assessment: &Assessment) -> Result<()>;

    // Responses (append-only; order of return equals commit order)
    fn append_response(&self, response: Response) -> Result<()>;
    fn responses_for(&self, assessment_id: Uuid) -> Result<Vec<Response>>;

    // Scores (written once at completion)
    fn insert_scores(&self, scores: &[ScaleScore]) -> Result<()>;
    fn scores_for(&self, assessment_id: Uuid) -> Result<Vec<ScaleScore>>;

    // Performance models
    fn insert_model(&self, model: PerformanceModel) -> Result<()>;
    fn model(&self, id: Uuid) -> Result<Option<PerformanceModel>>;
}
