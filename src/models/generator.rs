use rand::Rng;

pub fn random_quota<R: Rng>(rng: &mut R) -> usize {
    rng.gen_range(1..=10)
}

pub fn random_competitiveness<R: Rng>(rng: &mut R) -> f32 {
    rng.gen_range(0f32..1f32)
}

pub fn is_coupled<R: Rng>(rng: &mut R, rate: f64) -> bool {
    rng.gen_bool(rate)
}
