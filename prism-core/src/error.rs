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

//! Error kinds shared across the workspace.
//!
//! Scoring primitives never construct these; they return defined values for
//! every input inside their contract. The session layer maps operation
//! preconditions onto `InputInvalid` / `StateInvalid` / `NotFound` /
//! `AssessmentExpired`; anything coming out of a store is wrapped as
//! `Repository` and propagated unchanged.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur in assessment operations.
#[derive(Debug, Error)]
pub enum PrismError {
    /// Missing or ill-typed caller input. Fatal to the operation.
    #[error("invalid input: {0}")]
    InputInvalid(String),

    /// An entity id is unknown to the repository.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Operation incompatible with the assessment's current status.
    #[error("invalid state: {0}")]
    StateInvalid(String),

    /// The assessment is past its expiry; partial responses are preserved.
    #[error("assessment {0} has expired")]
    AssessmentExpired(Uuid),

    /// Ability estimation diverged (all-correct or all-incorrect pattern).
    /// Recoverable: the cognitive scorer substitutes a sentinel theta.
    #[error("ability estimation diverged: {0}")]
    EstimationDiverged(&'static str),

    /// Passthrough from the backing store.
    #[error("repository failure: {0}")]
    Repository(String),
}

impl PrismError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        PrismError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PrismError>;
