// Weight initialisers over a caller-owned rng, so a seeded model is reproducible

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// `1/sqrt(fan)`, the bound used for linear and recurrent weights
pub fn fan_bound(fan: usize) -> f32 {
    if fan == 0 { 0.0 } else { 1.0 / (fan as f32).sqrt() }
}

/// `len` samples from U(-bound, bound); zeros when the bound is degenerate
pub fn uniform<R: Rng>(rng: &mut R, len: usize, bound: f32) -> Vec<f32> {
    if !(bound.is_finite() && bound > 0.0) {
        return vec![0.0; len];
    }
    (0..len).map(|_| rng.gen_range(-bound..bound)).collect()
}

/// `len` samples from N(0, 1)
pub fn normal<R: Rng>(rng: &mut R, len: usize) -> Vec<f32> {
    StandardNormal.sample_iter(rng).take(len).collect()
}
