use rand::Rng;

use crate::models::{Pid, RolPair};

/// Sample a permutation of `reference` with the repeated-insertion model:
/// item i is inserted near the back of the partial sample with probability
/// weighted by `dispersion`^distance. Dispersion 0 reproduces the reference
/// order; dispersion 1 is a uniform shuffle.
pub fn dispersion_sample<R: Rng>(rng: &mut R, reference: &[Pid], dispersion: f64) -> Vec<Pid> {
    let mut sample = Vec::with_capacity(reference.len());
    let Some(&first) = reference.first() else { return sample };
    sample.push(first);
    for i in 1..reference.len() {
        let pos = insert_position(rng, i + 1, dispersion);
        sample.insert(pos, reference[i]);
    }
    sample
}

fn insert_position<R: Rng>(rng: &mut R, n: usize, dispersion: f64) -> usize {
    if dispersion <= 0.0 {
        return n - 1;
    }
    if (dispersion - 1.0).abs() < f64::EPSILON {
        return rng.gen_range(0..n);
    }
    // weights phi^(n-1-j) for position j, normalized by their sum
    let total: f64 = (0..n).map(|j| dispersion.powi((n - 1 - j) as i32)).sum();
    let mut draw = rng.gen_range(0.0..total);
    for j in 0..n {
        let w = dispersion.powi((n - 1 - j) as i32);
        if draw < w {
            return j;
        }
        draw -= w;
    }
    n - 1
}

/// A single resident's ROL: a dispersion sample around the reference
/// ranking, truncated to the resident's application count.
pub fn resident_rol<R: Rng>(
    rng: &mut R,
    reference: &[Pid],
    applications: usize,
    dispersion: f64,
) -> Vec<Pid> {
    let mut rol = dispersion_sample(rng, reference, dispersion);
    rol.truncate(applications.max(1));
    rol
}

/// A couple's pair list: two member samples zipped, with a trailing
/// (program, NONE) entry so the first member keeps a fallback in which the
/// partner stays unmatched.
pub fn couple_rol<R: Rng>(
    rng: &mut R,
    reference: &[Pid],
    applications: usize,
    dispersion: f64,
) -> Vec<RolPair> {
    let a = resident_rol(rng, reference, applications, dispersion);
    let b = resident_rol(rng, reference, applications, dispersion);
    let mut rol: Vec<RolPair> = a
        .iter()
        .zip(b.iter())
        .map(|(&p1, &p2)| (Some(p1), Some(p2)))
        .collect();
    if let Some(&p) = a.first() {
        rol.push((Some(p), None));
    }
    rol
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn zero_dispersion_keeps_reference_order() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let reference: Vec<Pid> = (0..20).collect();
        assert_eq!(dispersion_sample(&mut rng, &reference, 0.0), reference);
    }

    #[test]
    fn sample_is_a_permutation() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let reference: Vec<Pid> = (0..50).collect();
        let mut sample = dispersion_sample(&mut rng, &reference, 0.7);
        sample.sort_unstable();
        assert_eq!(sample, reference);
    }

    #[test]
    fn couple_rol_ends_with_nil_fallback() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let reference: Vec<Pid> = (0..10).collect();
        let rol = couple_rol(&mut rng, &reference, 4, 0.3);
        let last = rol.last().copied().unwrap();
        assert!(last.1.is_none());
        assert!(rol.iter().all(|e| e.0.is_some()));
    }
}
