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

//! Statistical primitives for norm-referenced scoring.
//!
//! STEN (Standard-Ten) scores have population mean 5.5 and SD 2, clamped to
//! the integer range [1, 10]. Raw scores are mapped through the standard
//! normal quantile function, so the conversions here bottom out in two
//! approximations:
//!
//! - `normal_cdf`: Abramowitz & Stegun 26.2.17, |error| < 7.5e-8
//! - `normal_inverse`: rational approximation with a three-region split,
//!   |error| < 1e-9 in the central region
//!
//! All functions are pure and allocation-free.

/// STEN distribution constants.
const STEN_MEAN: f64 = 5.5;
const STEN_SD: f64 = 2.0;

// ============================================================================
// Normal distribution
// ============================================================================

/// Standard normal cumulative distribution function.
///
/// Abramowitz & Stegun formula 26.2.17; |error| < 7.5e-8 over the usable
/// range.
pub fn normal_cdf(x: f64) -> f64 {
    const P: f64 = 0.231_641_9;
    const B1: f64 = 0.319_381_530;
    const B2: f64 = -0.356_563_782;
    const B3: f64 = 1.781_477_937;
    const B4: f64 = -1.821_255_978;
    const B5: f64 = 1.330_274_429;

    let t = 1.0 / (1.0 + P * x.abs());
    let poly = t * (B1 + t * (B2 + t * (B3 + t * (B4 + t * B5))));
    let pdf = (-0.5 * x * x).exp() / (2.0 * std::f64::consts::PI).sqrt();
    let upper_tail = pdf * poly;

    if x >= 0.0 {
        1.0 - upper_tail
    } else {
        upper_tail
    }
}

/// Standard normal quantile function (inverse CDF).
///
/// Rational approximation split into lower tail / central region / upper
/// tail at p = 0.02425; |error| < 1e-9 in the central region. Out-of-range
/// probabilities saturate to +/- infinity.
pub fn normal_inverse(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969_683_028_665_376e1,
        2.209_460_984_245_205e2,
        -2.759_285_104_469_687e2,
        1.383_577_518_672_690e2,
        -3.066_479_806_614_716e1,
        2.506_628_277_459_239e0,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e1,
        1.615_858_368_580_409e2,
        -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1,
        -1.328_068_155_288_572e1,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3,
        -3.223_964_580_411_365e-1,
        -2.400_758_277_161_838e0,
        -2.549_732_539_343_734e0,
        4.374_664_141_464_968e0,
        2.938_163_982_698_783e0,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-3,
        3.224_671_290_700_398e-1,
        2.445_134_137_142_996e0,
        3.754_408_661_907_416e0,
    ];
    const P_LOW: f64 = 0.02425;
    const P_HIGH: f64 = 1.0 - P_LOW;

    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    if p < P_LOW {
        // Lower tail
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= P_HIGH {
        // Central region
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        // Upper tail
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}

// ============================================================================
// STEN conversions
// ============================================================================

/// Map a z-score onto the integer STEN scale.
pub fn z_to_sten(z: f64) -> u8 {
    (STEN_MEAN + STEN_SD * z).round().clamp(1.0, 10.0) as u8
}

/// Norm-referenced raw-score conversion.
///
/// The raw score is clamped into `[raw_min, raw_max]`, converted to a
/// proportion of the range, and pushed through the normal quantile. The
/// floor and ceiling of the range pin to STEN 1 and 10 directly so the
/// quantile never sees 0 or 1.
pub fn raw_to_sten(raw: f64, raw_min: f64, raw_max: f64) -> u8 {
    debug_assert!(raw_max > raw_min, "degenerate raw range [{raw_min}, {raw_max}]");
    let clamped = raw.clamp(raw_min, raw_max);
    let proportion = (clamped - raw_min) / (raw_max - raw_min);

    if proportion <= 0.0 {
        1
    } else if proportion >= 1.0 {
        10
    } else {
        z_to_sten(normal_inverse(proportion))
    }
}

/// Sum a block of 1-5 Likert ratings and standardize against the
/// theoretical bounds `[n, 5n]`.
pub fn likert_sum_to_sten(ratings: &[u8]) -> u8 {
    if ratings.is_empty() {
        return 1;
    }
    let n = ratings.len() as f64;
    let sum: f64 = ratings.iter().map(|&r| r as f64).sum();
    raw_to_sten(sum, n, 5.0 * n)
}

/// Logistic approximation of the percentile midpoint of a STEN band.
pub fn sten_to_percentile(sten: u8) -> f64 {
    let exponent = -1.7 * (sten as f64 - STEN_MEAN) / STEN_SD;
    (100.0 / (1.0 + exponent.exp())).round()
}

/// Percentile (0-100, exclusive) to STEN through the normal quantile.
pub fn percentile_to_sten(percentile: f64) -> u8 {
    z_to_sten(normal_inverse(percentile / 100.0))
}
