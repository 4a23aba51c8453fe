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

//! Item-response-theory engine: the 3PL model, ability estimation, and the
//! adaptive-testing loop primitives.
//!
//! ## Model
//!
//! Probability of a correct response under the three-parameter logistic
//! model:
//!
//! ```text
//! P(theta; a, b, c) = c + (1 - c) / (1 + exp(-a (theta - b)))
//! ```
//!
//! Ability is estimated by Newton-Raphson with the Fisher information as
//! the (negated) second derivative, clamped to [-4, 4] each step. Response
//! patterns that are all-correct or all-incorrect have no interior maximum
//! and fail with [`EstimationError::Diverged`]; callers substitute the
//! sentinel theta of +/-4.
//!
//! With fewer than a handful of responses the likelihood is too flat for a
//! stable MLE, so the engine switches to Bayesian MAP with a standard
//! normal prior ([`NormalPrior`]).

use std::collections::HashSet;

use thiserror::Error;
use uuid::Uuid;

use prism_core::{IrtParams, Item, PrismError};

/// Hard bounds of the ability scale.
pub const THETA_MIN: f64 = -4.0;
pub const THETA_MAX: f64 = 4.0;

const MAX_ITERATIONS: u32 = 50;
const CONVERGENCE_TOLERANCE: f64 = 1e-3;
const CURVATURE_FLOOR: f64 = 1e-10;

// ============================================================================
// 3PL model
// ============================================================================

/// Probability of a correct response at ability `theta`.
pub fn probability(params: &IrtParams, theta: f64) -> f64 {
    params.c + (1.0 - params.c) / (1.0 + (-params.a * (theta - params.b)).exp())
}

/// Fisher information contributed by one item at ability `theta`.
///
/// Birnbaum's 3PL information function; non-negative everywhere and, for
/// c = 0, peaked at theta = b.
pub fn information(params: &IrtParams, theta: f64) -> f64 {
    let e = (params.a * (theta - params.b)).exp();
    let one_plus_e = 1.0 + e;
    params.a * params.a * (1.0 - params.c) * e * e
        / (one_plus_e * one_plus_e * (params.c + e))
}

/// SEM = 1 / sqrt(total information) at `theta`; infinite with no
/// information.
pub fn standard_error(items: &[IrtParams], theta: f64) -> f64 {
    let total: f64 = items.iter().map(|p| information(p, theta)).sum();
    if total > 0.0 {
        1.0 / total.sqrt()
    } else {
        f64::INFINITY
    }
}

/// Linear mapping of the ability scale onto STEN (theta 0 -> 5.5).
pub fn theta_to_sten(theta: f64) -> u8 {
    (5.5 + 2.0 * theta).round().clamp(1.0, 10.0) as u8
}

// ============================================================================
// Ability estimation
// ============================================================================

/// Which way a degenerate response pattern pushes the estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Divergence {
    AllCorrect,
    AllIncorrect,
}

impl Divergence {
    /// The sentinel ability substituted by callers that recover.
    pub fn sentinel_theta(self) -> f64 {
        match self {
            Divergence::AllCorrect => THETA_MAX,
            Divergence::AllIncorrect => THETA_MIN,
        }
    }
}

#[derive(Debug, Error)]
pub enum EstimationError {
    #[error("empty response vector")]
    EmptyResponses,

    #[error("items and responses disagree in length: {items} vs {responses}")]
    LengthMismatch { items: usize, responses: usize },

    #[error("degenerate response pattern ({0:?}) has no interior maximum")]
    Diverged(Divergence),
}

impl From<EstimationError> for PrismError {
    fn from(err: EstimationError) -> Self {
        match err {
            EstimationError::Diverged(Divergence::AllCorrect) => {
                PrismError::EstimationDiverged("all responses correct")
            }
            EstimationError::Diverged(Divergence::AllIncorrect) => {
                PrismError::EstimationDiverged("all responses incorrect")
            }
            other => PrismError::InputInvalid(other.to_string()),
        }
    }
}

/// Normal prior on ability for MAP estimation.
#[derive(Debug, Clone, Copy)]
pub struct NormalPrior {
    pub mean: f64,
    pub variance: f64,
}

impl Default for NormalPrior {
    fn default() -> Self {
        Self {
            mean: 0.0,
            variance: 1.0,
        }
    }
}

/// An ability estimate with its measurement precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbilityEstimate {
    pub theta: f64,
    pub sem: f64,
    pub iterations: u32,
}

/// Maximum-likelihood ability estimate.
///
/// Fails with [`EstimationError::Diverged`] on all-correct or
/// all-incorrect patterns; use [`estimate_map`] or substitute the sentinel
/// theta in that case.
pub fn estimate_mle(
    items: &[IrtParams],
    responses: &[bool],
) -> Result<AbilityEstimate, EstimationError> {
    check_inputs(items, responses)?;
    if let Some(divergence) = degenerate_pattern(responses) {
        return Err(EstimationError::Diverged(divergence));
    }
    Ok(newton_raphson(items, responses, None))
}

/// Bayesian MAP ability estimate.
///
/// The prior keeps the estimate finite even for degenerate patterns, which
/// makes this the right estimator early in an adaptive session.
pub fn estimate_map(
    items: &[IrtParams],
    responses: &[bool],
    prior: NormalPrior,
) -> Result<AbilityEstimate, EstimationError> {
    check_inputs(items, responses)?;
    Ok(newton_raphson(items, responses, Some(prior)))
}

/// Estimation policy for a live adaptive session: MAP below the
/// configured item-count threshold, MLE above it, sentinel theta when the
/// MLE diverges.
pub fn estimate_or_sentinel(
    items: &[IrtParams],
    responses: &[bool],
    config: &CatConfig,
) -> AbilityEstimate {
    debug_assert_eq!(items.len(), responses.len());
    if responses.is_empty() {
        return AbilityEstimate {
            theta: 0.0,
            sem: f64::INFINITY,
            iterations: 0,
        };
    }

    let result = if responses.len() < config.map_threshold {
        estimate_map(items, responses, config.prior)
    } else {
        estimate_mle(items, responses)
    };

    match result {
        Ok(estimate) => estimate,
        Err(EstimationError::Diverged(divergence)) => {
            let theta = divergence.sentinel_theta();
            tracing::warn!(
                ?divergence,
                theta,
                n = responses.len(),
                "ability estimation diverged, substituting sentinel"
            );
            AbilityEstimate {
                theta,
                sem: standard_error(items, theta),
                iterations: 0,
            }
        }
        // Inputs were checked above; only divergence can occur.
        Err(_) => unreachable!("input validation precedes estimation"),
    }
}

fn check_inputs(items: &[IrtParams], responses: &[bool]) -> Result<(), EstimationError> {
    if responses.is_empty() {
        return Err(EstimationError::EmptyResponses);
    }
    if items.len() != responses.len() {
        return Err(EstimationError::LengthMismatch {
            items: items.len(),
            responses: responses.len(),
        });
    }
    Ok(())
}

fn degenerate_pattern(responses: &[bool]) -> Option<Divergence> {
    if responses.iter().all(|&u| u) {
        Some(Divergence::AllCorrect)
    } else if responses.iter().all(|&u| !u) {
        Some(Divergence::AllIncorrect)
    } else {
        None
    }
}

fn newton_raphson(
    items: &[IrtParams],
    responses: &[bool],
    prior: Option<NormalPrior>,
) -> AbilityEstimate {
    let mut theta = prior.map(|p| p.mean).unwrap_or(0.0);
    let mut iterations = 0;

    for iter in 1..=MAX_ITERATIONS {
        iterations = iter;

        let mut first = 0.0;
        let mut second = 0.0;
        for (params, &correct) in items.iter().zip(responses) {
            let p = probability(params, theta);
            let u = if correct { 1.0 } else { 0.0 };
            first += (u - p) * params.a * (1.0 - params.c) / (1.0 - p);
            second -= information(params, theta);
        }
        if let Some(prior) = prior {
            first -= (theta - prior.mean) / prior.variance;
            second -= 1.0 / prior.variance;
        }

        if second.abs() < CURVATURE_FLOOR {
            break;
        }

        let delta = first / second;
        theta = (theta - delta).clamp(THETA_MIN, THETA_MAX);

        if delta.abs() < CONVERGENCE_TOLERANCE {
            break;
        }
    }

    AbilityEstimate {
        theta,
        sem: standard_error(items, theta),
        iterations,
    }
}

// ============================================================================
// Adaptive-testing loop
// ============================================================================

/// Adaptive-section configuration.
#[derive(Debug, Clone, Copy)]
pub struct CatConfig {
    /// Never stop before this many items.
    pub min_items: usize,
    /// Always stop at this many items.
    pub max_items: usize,
    /// Stop once SEM drops to this level (with min_items satisfied).
    pub target_sem: f64,
    /// Below this administered count, estimate via MAP instead of MLE.
    pub map_threshold: usize,
    /// Prior for the MAP estimator.
    pub prior: NormalPrior,
}

impl Default for CatConfig {
    fn default() -> Self {
        Self {
            min_items: 5,
            max_items: 20,
            target_sem: 0.35,
            map_threshold: 5,
            prior: NormalPrior::default(),
        }
    }
}

impl CatConfig {
    pub fn with_item_bounds(mut self, min_items: usize, max_items: usize) -> Self {
        self.min_items = min_items;
        self.max_items = max_items;
        self
    }

    pub fn with_target_sem(mut self, target_sem: f64) -> Self {
        self.target_sem = target_sem;
        self
    }

    /// Termination criterion for one scale's adaptive run.
    pub fn should_stop(&self, administered: usize, sem: f64) -> bool {
        administered >= self.max_items
            || (administered >= self.min_items && sem <= self.target_sem)
    }
}

/// Pick the unadministered active item with maximum information at the
/// current ability estimate. Ties break toward the smaller item id so the
/// selection is stable across runs.
pub fn select_next_item<'a>(
    pool: &'a [Item],
    administered: &HashSet<Uuid>,
    theta: f64,
) -> Option<&'a Item> {
    let mut best: Option<(&Item, f64)> = None;
    for item in pool {
        if !item.active || administered.contains(&item.id) {
            continue;
        }
        let info = information(&item.irt, theta);
        let better = match best {
            None => true,
            Some((current, current_info)) => {
                info > current_info || (info == current_info && item.id < current.id)
            }
        };
        if better {
            best = Some((item, info));
        }
    }
    best.map(|(item, _)| item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::Domain;

    fn params(a: f64, b: f64, c: f64) -> IrtParams {
        IrtParams::new(a, b, c).unwrap()
    }

    #[test]
    fn probability_at_difficulty_is_guessing_midpoint() {
        // P(theta = b) = (1 + c) / 2 regardless of discrimination
        for a in [0.5, 1.0, 2.3] {
            let p = params(a, 0.7, 0.2);
            assert!((probability(&p, 0.7) - 0.6).abs() < 1e-12);
        }
    }

    #[test]
    fn probability_reference_values() {
        let p = params(1.0, 0.0, 0.25);
        assert!((probability(&p, 0.0) - 0.625).abs() < 1e-9);
        assert!((probability(&p, 1.0) - 0.798).abs() < 1e-3);
        assert!((probability(&p, -1.0) - 0.452).abs() < 1e-3);
    }

    #[test]
    fn information_is_nonnegative_and_peaked_at_difficulty() {
        let p = params(1.5, 0.5, 0.0);
        let at_b = information(&p, 0.5);
        assert!(at_b > 0.0);
        for theta in [-3.0, -1.0, 0.0, 1.0, 2.0, 4.0] {
            let info = information(&p, theta);
            assert!(info >= 0.0);
            assert!(info <= at_b + 1e-12);
        }
        // Strictly decreasing away from b
        assert!(information(&p, 1.5) > information(&p, 2.5));
        assert!(information(&p, -0.5) > information(&p, -1.5));
    }

    #[test]
    fn mle_is_deterministic() {
        let items: Vec<IrtParams> = (0..8)
            .map(|i| params(1.0 + 0.1 * i as f64, -1.0 + 0.25 * i as f64, 0.2))
            .collect();
        let responses = [true, false, true, true, false, true, false, true];
        let a = estimate_mle(&items, &responses).unwrap();
        let b = estimate_mle(&items, &responses).unwrap();
        assert!((a.theta - b.theta).abs() < 1e-6);
    }

    #[test]
    fn mle_moves_with_added_evidence() {
        let base: Vec<IrtParams> = (0..6).map(|i| params(1.0, -1.0 + 0.4 * i as f64, 0.2)).collect();
        let responses = [true, false, true, true, false, true];
        let baseline = estimate_mle(&base, &responses).unwrap().theta;

        let mut more_items = base.clone();
        more_items.push(params(1.2, 0.0, 0.2));

        let mut with_correct = responses.to_vec();
        with_correct.push(true);
        // Slack covers the 1e-3 Newton-Raphson stopping tolerance
        let up = estimate_mle(&more_items, &with_correct).unwrap().theta;
        assert!(up >= baseline - 2e-3, "correct answer decreased theta");

        let mut with_incorrect = responses.to_vec();
        with_incorrect.push(false);
        let down = estimate_mle(&more_items, &with_incorrect).unwrap().theta;
        assert!(down <= baseline + 2e-3, "incorrect answer increased theta");
    }

    #[test]
    fn degenerate_patterns_diverge() {
        let items = vec![params(1.0, 0.0, 0.2); 6];
        match estimate_mle(&items, &[true; 6]) {
            Err(EstimationError::Diverged(Divergence::AllCorrect)) => {}
            other => panic!("expected divergence, got {other:?}"),
        }
        match estimate_mle(&items, &[false; 6]) {
            Err(EstimationError::Diverged(Divergence::AllIncorrect)) => {}
            other => panic!("expected divergence, got {other:?}"),
        }
    }

    #[test]
    fn sentinel_substitution() {
        let config = CatConfig::default();
        let items = vec![params(1.0, 0.0, 0.2); 6];
        let est = estimate_or_sentinel(&items, &[true; 6], &config);
        assert_eq!(est.theta, THETA_MAX);
        let est = estimate_or_sentinel(&items, &[false; 6], &config);
        assert_eq!(est.theta, THETA_MIN);
    }

    #[test]
    fn map_shrinks_toward_prior_mean() {
        // Two items with one correct each way; MAP with a tight prior should
        // sit closer to zero than the MLE
        let items: Vec<IrtParams> = vec![params(1.0, -2.0, 0.0), params(1.0, 2.0, 0.0)];
        let responses = [true, false];
        let map = estimate_map(&items, &responses, NormalPrior::default()).unwrap();
        assert!(map.theta.abs() < 1.0);
    }

    #[test]
    fn map_handles_degenerate_patterns() {
        let items = vec![params(1.0, 0.0, 0.2); 3];
        let est = estimate_map(&items, &[true; 3], NormalPrior::default()).unwrap();
        assert!(est.theta > 0.0);
        assert!(est.theta <= THETA_MAX);
    }

    #[test]
    fn empty_responses_rejected() {
        assert!(matches!(
            estimate_mle(&[], &[]),
            Err(EstimationError::EmptyResponses)
        ));
    }

    #[test]
    fn selection_maximizes_information_with_stable_ties() {
        let mut pool: Vec<Item> = (0..5)
            .map(|i| {
                Item::cognitive(
                    "numerical_reasoning",
                    format!("item {i}"),
                    vec!["a".into(), "b".into()],
                    "a",
                    params(1.0, -2.0 + i as f64, 0.0),
                    i,
                )
            })
            .collect();

        // theta = 0 -> the b = 0 item carries the most information
        let chosen = select_next_item(&pool, &HashSet::new(), 0.0).unwrap();
        assert_eq!(chosen.irt.b, 0.0);

        // Identical parameters: lowest id must win, repeatedly
        for item in &mut pool {
            item.irt = params(1.0, 0.0, 0.0);
        }
        let expected = pool.iter().map(|i| i.id).min().unwrap();
        let chosen = select_next_item(&pool, &HashSet::new(), 0.0).unwrap();
        assert_eq!(chosen.id, expected);

        // Inactive and administered items are skipped
        let mut administered = HashSet::new();
        administered.insert(expected);
        let second = select_next_item(&pool, &administered, 0.0).unwrap();
        assert_ne!(second.id, expected);
        assert_eq!(second.domain, Domain::Cognitive);
    }

    #[test]
    fn termination_criterion() {
        let config = CatConfig::default();
        assert!(!config.should_stop(4, 0.1)); // below min_items
        assert!(config.should_stop(5, 0.35)); // min reached, SEM at target
        assert!(!config.should_stop(5, 0.5)); // min reached, SEM too high
        assert!(config.should_stop(20, 9.9)); // max always stops
    }

    #[test]
    fn theta_to_sten_mapping() {
        assert_eq!(theta_to_sten(0.0), 6);
        assert_eq!(theta_to_sten(-4.0), 1);
        assert_eq!(theta_to_sten(4.0), 10);
        assert_eq!(theta_to_sten(1.0), 8);
        assert_eq!(theta_to_sten(-1.25), 3);
    }
}
