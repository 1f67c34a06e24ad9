// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Probability helpers over any [`rand::Rng`]
//!
//! Every helper consumes draws from the caller's stream in a fixed order, so a
//! seeded stream reproduces the same buildings.

use crate::error::{Error, Result};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::Normal;
use skyline_geometry::Color;

fn check_probability(p: f64) -> Result<()> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "probability must lie in [0, 1], got {}",
            p
        )))
    }
}

/// True with probability `p`
pub fn bernoulli<R: Rng + ?Sized>(rng: &mut R, p: f64) -> Result<bool> {
    check_probability(p)?;
    Ok(rng.gen_bool(p))
}

/// Number of failed Bernoulli(`p`) trials before the first success, clamped
/// to `[min, max]`. Runs in `O(max - min)` draws at worst.
pub fn geometric<R: Rng + ?Sized>(rng: &mut R, p: f64, min: u32, max: u32) -> Result<u32> {
    check_probability(p)?;
    if max < min {
        return Err(Error::InvalidArgument(format!(
            "invalid range [{}, {}]",
            min, max
        )));
    }

    let mut n = min;
    while n < max && !rng.gen_bool(p) {
        n += 1;
    }
    Ok(n)
}

/// Number of successes before the first failure, i.e. a geometric variable
/// with parameter `1 - p`
pub fn consecutive_bernoulli_successes<R: Rng + ?Sized>(
    rng: &mut R,
    p: f64,
    min: u32,
    max: u32,
) -> Result<u32> {
    check_probability(p)?;
    geometric(rng, 1.0 - p, min, max)
}

/// `n` independent Bernoulli(`p`) draws
pub fn bernoulli_seq<R: Rng + ?Sized>(rng: &mut R, n: usize, p: f64) -> Result<Vec<bool>> {
    check_probability(p)?;
    Ok((0..n).map(|_| rng.gen_bool(p)).collect())
}

/// Success probability of the trials of a geometric variable with expected
/// value `n`: from `E = (1 - p) / p` follows `p = 1 / (E + 1)`
pub fn bernoulli_prob_from_geometric_expected_value(n: f64) -> Result<f64> {
    if !(n > 0.0) {
        return Err(Error::InvalidArgument(format!(
            "expected value of a geometric variable must be positive, got {}",
            n
        )));
    }
    Ok(1.0 / (n + 1.0))
}

/// Uniform value in `[min, max)`
#[inline]
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    rng.gen::<f64>() * (max - min) + min
}

/// Normally distributed value
pub fn gaussian<R: Rng + ?Sized>(rng: &mut R, mu: f64, sigma: f64) -> Result<f64> {
    if !(mu.is_finite() && sigma.is_finite() && sigma >= 0.0) {
        return Err(Error::InvalidArgument(format!(
            "gaussian needs a finite mean and a non-negative deviation, got ({}, {})",
            mu, sigma
        )));
    }
    let normal = Normal::new(mu, sigma)
        .map_err(|e| Error::InvalidArgument(format!("gaussian({}, {}): {}", mu, sigma, e)))?;
    Ok(normal.sample(rng))
}

/// Index `i` with probability `weights[i] / sum(weights)`
pub fn random_weighted<R: Rng + ?Sized>(rng: &mut R, weights: &[f64]) -> Result<usize> {
    let dist = WeightedIndex::new(weights)
        .map_err(|e| Error::InvalidArgument(format!("invalid weights {:?}: {}", weights, e)))?;
    Ok(dist.sample(rng))
}

/// Uniformly chosen element
pub fn choose_random<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> Result<&'a T> {
    items
        .choose(rng)
        .ok_or_else(|| Error::InvalidArgument("must pick from at least one element".to_string()))
}

/// Element `items[i]` chosen with probability `weights[i] / sum(weights)`
pub fn choose_random_weighted<'a, T, R: Rng + ?Sized>(
    rng: &mut R,
    items: &'a [T],
    weights: &[f64],
) -> Result<&'a T> {
    if items.len() != weights.len() {
        return Err(Error::InvalidArgument(format!(
            "{} items but {} weights",
            items.len(),
            weights.len()
        )));
    }
    if items.is_empty() {
        return Err(Error::InvalidArgument(
            "must pick from at least one element".to_string(),
        ));
    }
    Ok(&items[random_weighted(rng, weights)?])
}

/// Random RGB color, each channel uniform in `[0, 1)`
pub fn rand_color<R: Rng + ?Sized>(rng: &mut R) -> Color {
    Color::new(rng.gen(), rng.gen(), rng.gen())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn test_bernoulli_extremes() {
        let mut rng = rng();
        for _ in 0..200 {
            assert!(!bernoulli(&mut rng, 0.0).unwrap());
            assert!(bernoulli(&mut rng, 1.0).unwrap());
        }
    }

    #[test]
    fn test_bernoulli_rejects_bad_probability() {
        let mut rng = rng();
        assert!(matches!(bernoulli(&mut rng, 1.5), Err(Error::InvalidArgument(_))));
        assert!(bernoulli(&mut rng, -0.1).is_err());
        assert!(bernoulli_seq(&mut rng, 3, f64::NAN).is_err());
    }

    #[test]
    fn test_geometric_bounds() {
        let mut rng = rng();
        assert_eq!(geometric(&mut rng, 1.0, 2, 10).unwrap(), 2);
        assert_eq!(geometric(&mut rng, 0.0, 2, 10).unwrap(), 10);
        assert_eq!(consecutive_bernoulli_successes(&mut rng, 1.0, 0, 5).unwrap(), 5);
        assert!(geometric(&mut rng, 0.5, 4, 3).is_err());
    }

    #[test]
    fn test_geometric_expected_value() {
        assert_eq!(bernoulli_prob_from_geometric_expected_value(1.0).unwrap(), 0.5);
        assert_eq!(bernoulli_prob_from_geometric_expected_value(3.0).unwrap(), 0.25);
        assert!(bernoulli_prob_from_geometric_expected_value(0.0).is_err());
    }

    #[test]
    fn test_uniform_range() {
        let mut rng = rng();
        for _ in 0..1000 {
            let v = uniform(&mut rng, -2.0, 3.0);
            assert!((-2.0..3.0).contains(&v));
        }
    }

    #[test]
    fn test_gaussian_mean() {
        let mut rng = rng();
        let n = 4000;
        let mean: f64 = (0..n)
            .map(|_| gaussian(&mut rng, 10.0, 1.0).unwrap())
            .sum::<f64>()
            / n as f64;
        assert!((mean - 10.0).abs() < 0.1);
        assert!(matches!(
            gaussian(&mut rng, 0.0, -1.0),
            Err(Error::InvalidArgument(_))
        ));
        assert!(gaussian(&mut rng, f64::NAN, 1.0).is_err());
        assert!(gaussian(&mut rng, 0.0, f64::INFINITY).is_err());
        assert_eq!(gaussian(&mut rng, 3.0, 0.0).unwrap(), 3.0);
    }

    #[test]
    fn test_weighted_choice() {
        let mut rng = rng();
        let items = ["never", "always"];
        for _ in 0..100 {
            assert_eq!(
                *choose_random_weighted(&mut rng, &items, &[0.0, 3.0]).unwrap(),
                "always"
            );
        }
        assert!(choose_random_weighted(&mut rng, &items, &[1.0]).is_err());
        assert!(random_weighted(&mut rng, &[0.0, 0.0]).is_err());
        let empty: [u8; 0] = [];
        assert!(choose_random(&mut rng, &empty).is_err());
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = rng();
        let mut b = rng();
        let colors_a: Vec<_> = (0..5).map(|_| rand_color(&mut a)).collect();
        let colors_b: Vec<_> = (0..5).map(|_| rand_color(&mut b)).collect();
        assert_eq!(colors_a, colors_b);
    }
}
