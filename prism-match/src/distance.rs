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

//! Distance-decay scoring for STEN bands.

/// Integer distance from a candidate STEN to a target band: zero inside
/// the band, otherwise how many STEN points outside.
pub fn band_distance(sten: u8, target_min: u8, target_max: u8) -> u32 {
    let below = target_min.saturating_sub(sten) as u32;
    let above = sten.saturating_sub(target_max) as u32;
    below + above
}

/// Decay a band distance into a [0, 1] penalty multiplier.
///
/// `1 - (0.15 d + 0.05 d^2)`, floored at zero: one point outside keeps
/// 80%, three points 10%, five or more nothing.
pub fn decay_penalty(distance: u32) -> f64 {
    let d = distance as f64;
    (1.0 - (0.15 * d + 0.05 * d * d)).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_band_has_no_distance() {
        for sten in 5..=7 {
            assert_eq!(band_distance(sten, 5, 7), 0);
        }
        assert_eq!(decay_penalty(0), 1.0);
    }

    #[test]
    fn decay_reference_points() {
        assert_eq!(band_distance(4, 5, 7), 1);
        assert_eq!(band_distance(8, 5, 7), 1);
        assert!((decay_penalty(1) - 0.80).abs() < 1e-12);

        assert_eq!(band_distance(2, 5, 7), 3);
        assert!((decay_penalty(3) - 0.10).abs() < 1e-12);

        assert_eq!(band_distance(10, 1, 5), 5);
        assert_eq!(decay_penalty(5), 0.0);
        assert_eq!(decay_penalty(9), 0.0);
    }

    #[test]
    fn decay_is_monotone() {
        let mut last = f64::INFINITY;
        for d in 0..10 {
            let p = decay_penalty(d);
            assert!((0.0..=1.0).contains(&p));
            assert!(p <= last);
            last = p;
        }
    }
}
