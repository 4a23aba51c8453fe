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

//! # Prism Session
//!
//! Drives examinees through an assessment: the session manager owns the
//! lifecycle state machine, dispatches next-item requests to the adaptive
//! engine or the sequential selectors, records responses, and finalizes
//! the profile. [`AssessmentService`] is the in-process API the HTTP layer
//! maps 1:1.
//!
//! Every operation on one assessment serializes through a per-assessment
//! lock; the scoring math itself never blocks, so operations are short and
//! atomic.

pub mod manager;
pub mod service;

pub use manager::{NextItem, SessionManager};
pub use service::AssessmentService;
