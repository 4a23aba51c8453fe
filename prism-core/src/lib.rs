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

//! Prism Core
//!
//! Fundamental entities and contracts for the Prism assessment platform:
//! scales, items, assessments, responses, scores, performance models, the
//! assessment lifecycle state machine, error kinds, and the repository
//! trait the session layer persists through.
//!
//! Scoring math lives in `prism-scoring`; job matching in `prism-match`.

pub mod assessment;
pub mod candidate;
pub mod error;
pub mod item;
pub mod model;
pub mod repository;
pub mod response;
pub mod scale;
pub mod score;

pub use assessment::{
    Assessment, AssessmentEvent, AssessmentStatus, AssessmentType, InvalidTransition, Section,
};
pub use candidate::Candidate;
pub use error::{PrismError, Result};
pub use item::{ForcedChoicePair, IrtParams, Item, ItemFormat, TraitLoading};
pub use model::{ModelScaleRange, PerformanceModel};
pub use repository::Repository;
pub use response::{Choice, Response, ResponseValue};
pub use scale::{Domain, Scale, ScaleKind};
pub use score::ScaleScore;
