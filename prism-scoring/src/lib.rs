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

//! # Prism Scoring
//!
//! The psychometric core: statistical primitives, the 3PL item-response
//! engine driving adaptive testing, and the per-domain scale scorers that
//! turn a response stream into a standardized STEN profile.
//!
//! ## Layers
//!
//! - [`stats`] - normal CDF / inverse CDF, raw-to-STEN, percentiles. Pure,
//!   deterministic, allocation-free.
//! - [`irt`] - 3PL probability and information, Newton-Raphson ability
//!   estimation (MLE and Bayesian MAP), next-item selection, termination.
//! - [`scorers`] - cognitive, behavioral, interest, learning-index, and
//!   distortion scorers.
//! - [`profile`] - the finalizer that fans a completed assessment out to
//!   every applicable scorer.
//! - [`simulation`] - a seeded generative examinee for exercising the
//!   adaptive loop in tests.
//!
//! Everything here is a pure function of its inputs; no scorer touches a
//! repository or shares mutable state.

pub mod irt;
pub mod profile;
pub mod scorers;
pub mod simulation;
pub mod stats;

pub use irt::{
    estimate_map, estimate_mle, estimate_or_sentinel, information, probability, select_next_item,
    standard_error, theta_to_sten, AbilityEstimate, CatConfig, Divergence, EstimationError,
    NormalPrior,
};
pub use profile::{finalize_profile, ProfileConfig, ScoredProfile};
pub use scorers::behavioral::{score_behavioral, BehavioralWeights};
pub use scorers::cognitive::score_cognitive_scale;
pub use scorers::distortion::{
    detect_distortion, DistortionCategory, DistortionReport, Recommendation, ResponsePattern,
};
pub use scorers::interests::{score_interests, top_interests};
pub use scorers::learning::learning_index;
pub use simulation::SimulatedExaminee;
