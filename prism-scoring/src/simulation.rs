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

//! A seeded generative examinee for exercising the adaptive loop.
//!
//! Answers 3PL items stochastically at a fixed true ability, so tests can
//! verify that the adaptive engine converges toward the truth and
//! terminates inside its item budget. Seeded for reproducibility; never
//! used in production scoring paths.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use prism_core::IrtParams;

use crate::irt::probability;

/// Simulated examinee with a known true ability.
pub struct SimulatedExaminee {
    true_theta: f64,
    rng: StdRng,
}

impl SimulatedExaminee {
    pub fn new(true_theta: f64, seed: u64) -> Self {
        Self {
            true_theta,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn true_theta(&self) -> f64 {
        self.true_theta
    }

    /// Answer one item: correct with probability P(true_theta).
    pub fn answer(&mut self, params: &IrtParams) -> bool {
        self.rng.gen::<f64>() < probability(params, self.true_theta)
    }
}
