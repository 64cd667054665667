// Element-wise activations for GRU gates and attention projections

pub fn sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

pub fn tanh_inplace(values: &mut [f32]) {
    for v in values.iter_mut() {
        *v = v.tanh();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn simple_sigmoid() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-6);
        assert!((sigmoid(1.0) - 0.7310585786).abs() < 1e-6);
        assert!((sigmoid(-1.0) - 0.2689414214).abs() < 1e-6);
        assert!(sigmoid(-100.0) >= 0.0);
        assert!(sigmoid(100.0) <= 1.0);
    }

    #[test]
    fn inplace_activations() {
        let mut v = vec![0.0, 1.0];
        tanh_inplace(&mut v);
        assert!((v[1] - 0.7615942).abs() < 1e-6);
    }
}
