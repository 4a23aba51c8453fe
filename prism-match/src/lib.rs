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

//! # Prism Match
//!
//! Fit scoring of candidate profiles against job performance models, and
//! interview-question generation for the scales that land outside the
//! model's bands.
//!
//! A performance model describes the ideal incumbent as per-scale STEN
//! bands with weights. Matching is distance-decay for the cognitive and
//! behavioral domains (how far outside the band, quadratically punished)
//! and rank-order for interests (do the candidate's top three interests
//! line up with the model's). Domains aggregate 0.4 / 0.4 / 0.2 into one
//! fit percentage.

pub mod distance;
pub mod engine;
pub mod interview;

pub use distance::{band_distance, decay_penalty};
pub use engine::{Direction, JobMatch, MatchEngine, MatchWeights, ScaleDeviation};
pub use interview::{generate_interview_blocks, InterviewBlock, InterviewQuestion};
