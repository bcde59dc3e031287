use std::io::{stdout, Write};
use std::sync::atomic::Ordering;

use crossterm::{cursor, terminal, ExecutableCommand, QueueableCommand};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::matcher::{self, MatchStatus, Matcher, RpMatcher};
use crate::models::generator;
use crate::models::{Cid, Couple, Pid, Program, Resident, Rid};
use crate::parameters::MatchOptions;
use crate::problem::Problem;
use crate::ranker;

/// Run the matcher, retrying with permuted couple orderings when rounds hit
/// a cycle and restarts are enabled. Singles keep their order; each round's
/// permutation is deterministic in the seed.
pub fn solve(prob: &mut Problem, opts: &MatchOptions) -> MatchStatus {
    let couples: Vec<Cid> = prob.couple_ids().collect();
    let cap = if opts.rnd > 0 { opts.visit_cap_rnd } else { opts.visit_cap };
    let mut engine = RpMatcher::new(cap);

    matcher::ROUNDS.fetch_add(1, Ordering::Relaxed);
    if engine.run_round(prob, &couples) == MatchStatus::Matched {
        return MatchStatus::Matched;
    }
    for round in 1..=opts.rnd {
        if opts.verb > 0 {
            println!("#restart round {}", round);
        }
        let mut order = couples.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(opts.seed.wrapping_add(round as u64));
        order.shuffle(&mut rng);
        matcher::ROUNDS.fetch_add(1, Ordering::Relaxed);
        if engine.run_round(prob, &order) == MatchStatus::Matched {
            return MatchStatus::Matched;
        }
    }
    MatchStatus::Cycle
}

/// Knobs for random instance generation.
#[derive(Debug, Clone)]
pub struct GenConfig {
    pub residents: usize,
    pub programs: usize,
    pub couple_rate: f64,
    pub list_len: usize,
    pub dispersion: f64,
}

impl Default for GenConfig {
    fn default() -> Self {
        GenConfig { residents: 1000, programs: 100, couple_rate: 0.02, list_len: 12, dispersion: 0.25 }
    }
}

/// Generate a random instance: competitiveness-scored population, resident
/// ROLs sampled by dispersion around the competitiveness-ordered reference,
/// program ROLs made of the applicants that ranked them. Edges are mutual
/// by construction.
pub fn generate_instance(cfg: &GenConfig, seed: u64, progress: bool) -> Problem {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut programs: Vec<Program> = Vec::with_capacity(cfg.programs);
    let mut prog_comp: Vec<f32> = Vec::with_capacity(cfg.programs);
    for _ in 0..cfg.programs {
        programs.push(Program {
            quota: generator::random_quota(&mut rng),
            rol: Vec::new(),
            accepted: Vec::new(),
            declared: true,
        });
        prog_comp.push(generator::random_competitiveness(&mut rng));
    }

    // programs ordered most competitive first; every applicant samples
    // around this reference
    let mut reference: Vec<Pid> = (0..cfg.programs as u32).collect();
    reference.sort_by(|&a, &b| prog_comp[b as usize].total_cmp(&prog_comp[a as usize]));

    let mut residents: Vec<Resident> = (0..cfg.residents)
        .map(|_| Resident { declared: true, ..Default::default() })
        .collect();
    let mut res_comp: Vec<f32> =
        (0..cfg.residents).map(|_| generator::random_competitiveness(&mut rng)).collect();
    let mut couples: Vec<Couple> = Vec::new();

    // per-program applicant pools, turned into ROLs afterwards
    let mut applicants: Vec<Vec<Rid>> = vec![Vec::new(); cfg.programs];
    let mut add = |pools: &mut Vec<Vec<Rid>>, p: Pid, r: Rid| {
        if !pools[p as usize].contains(&r) {
            pools[p as usize].push(r);
        }
    };

    let mut i = 0usize;
    let total = cfg.residents;
    let mut tick = progress_sink(progress, total);
    while i < cfg.residents {
        let r = i;
        let coupled = i + 1 < cfg.residents && generator::is_coupled(&mut rng, cfg.couple_rate);
        if coupled {
            let r2 = i + 1;
            // partners share an averaged competitiveness, like real pairs
            let comp = (res_comp[r] + res_comp[r2]) / 2.0;
            res_comp[r] = comp;
            res_comp[r2] = comp;
            let apps = applications(comp, cfg.list_len);
            let rol = ranker::couple_rol(&mut rng, &reference, apps, cfg.dispersion);
            let cid = couples.len() as Cid;
            for &(s1, s2) in &rol {
                if let Some(p) = s1 {
                    add(&mut applicants, p, r as Rid);
                }
                if let Some(p) = s2 {
                    add(&mut applicants, p, r2 as Rid);
                }
            }
            couples.push(Couple { r1: r as Rid, r2: r2 as Rid, rol, declared: true });
            residents[r].couple = Some(cid);
            residents[r2].couple = Some(cid);
            tick(i + 2);
            i += 2;
        } else {
            let apps = applications(res_comp[r], cfg.list_len);
            let rol = ranker::resident_rol(&mut rng, &reference, apps, cfg.dispersion);
            for &p in &rol {
                add(&mut applicants, p, r as Rid);
            }
            residents[r].rol = rol;
            tick(i + 1);
            i += 1;
        }
    }

    if progress {
        let _ = stdout().execute(cursor::Show);
    }

    // programs rank their applicants by competitiveness, best first
    for (pid, pool) in applicants.into_iter().enumerate() {
        let mut rol = pool;
        rol.sort_by(|&a, &b| res_comp[b as usize].total_cmp(&res_comp[a as usize]));
        programs[pid].rol = rol;
    }

    let mut prob = Problem { residents, couples, programs };
    prob.sanitize();
    prob
}

fn applications(comp: f32, list_len: usize) -> usize {
    ((comp * list_len as f32) as usize + 1).max(1)
}

fn progress_sink(progress: bool, total: usize) -> Box<dyn FnMut(usize)> {
    if !progress {
        return Box::new(|_| {});
    }
    Box::new(move |done| {
        show_progress(&format!(
            "...Ranked {}/{} applicants ({:.0}%)...",
            done,
            total,
            done as f64 / total as f64 * 100.0
        ));
    })
}

/// Animate a single status line in place.
fn show_progress(msg: &str) {
    let mut out = stdout();
    let _ = out.queue(cursor::SavePosition);
    let _ = out.write_all(msg.as_bytes());
    let _ = out.queue(cursor::RestorePosition);
    let _ = out.flush();
    let _ = out.queue(cursor::RestorePosition);
    let _ = out.queue(terminal::Clear(terminal::ClearType::FromCursorDown));
}
