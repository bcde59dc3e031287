//! End-to-end scenarios: engine output format, verifier agreement, and the
//! cross-run properties (determinism, cap monotonicity, restarts).

use std::io::Write;

use matchrp::matcher::MatchStatus;
use matchrp::verifier::{self, MatchFile};
use matchrp::{driver, MatchOptions, Problem};

fn solve_text(input: &str, opts: &MatchOptions) -> (MatchStatus, String) {
    let mut prob = Problem::parse(input).unwrap();
    let status = driver::solve(&mut prob, opts);
    let mut out = Vec::new();
    prob.write_match(&mut out, status == MatchStatus::Matched).unwrap();
    (status, String::from_utf8(out).unwrap())
}

/// Feed the engine's own output back through the verifier on a fresh copy
/// of the problem.
fn verify_output(input: &str, output: &str) -> Vec<String> {
    let mut prob = Problem::parse(input).unwrap();
    let mf = MatchFile::parse(output).unwrap();
    mf.apply(&mut prob).unwrap();
    if !mf.found {
        return Vec::new();
    }
    verifier::check(&mut prob)
}

#[test]
fn trivial_single_trivial_program() {
    let input = "r 0 0\np 0 1 0\n";
    let (status, out) = solve_text(input, &MatchOptions::default());
    assert_eq!(status, MatchStatus::Matched);
    assert_eq!(out, "m 1\nr 0 0\n");
    assert!(verify_output(input, &out).is_empty());
}

#[test]
fn unmatched_due_to_preference() {
    // program 0 ranks nobody, so sanitization empties the resident's list
    let input = "r 0 0\np 0 1\n";
    let (status, out) = solve_text(input, &MatchOptions::default());
    assert_eq!(status, MatchStatus::Matched);
    assert_eq!(out, "m 1\nr 0 -1\n");
    assert!(verify_output(input, &out).is_empty());
}

#[test]
fn simple_priority_displacement() {
    let input = "r 0 0\nr 1 0\np 0 1 1 0\n";
    let (status, out) = solve_text(input, &MatchOptions::default());
    assert_eq!(status, MatchStatus::Matched);
    assert_eq!(out, "m 1\nr 0 -1\nr 1 0\n");
    assert!(verify_output(input, &out).is_empty());
}

#[test]
fn couple_into_one_program() {
    let input = "c 0 0 1 5 5\np 5 2 0 1\n";
    let (status, out) = solve_text(input, &MatchOptions::default());
    assert_eq!(status, MatchStatus::Matched);
    assert_eq!(out, "m 1\nr 0 5\nr 1 5\n");
    assert!(verify_output(input, &out).is_empty());
}

#[test]
fn couple_forces_displacement_chain() {
    // the couple claims programs 7 and 8; resident 2 then bounces off 7,
    // which ranks resident 0 above it, and ends unmatched
    let input = "r 2 7\nc 0 0 1 7 8\np 7 1 0 2\np 8 1 1\n";
    let (status, out) = solve_text(input, &MatchOptions::default());
    assert_eq!(status, MatchStatus::Matched);
    assert_eq!(out, "m 1\nr 0 7\nr 1 8\nr 2 -1\n");
    assert!(verify_output(input, &out).is_empty());
}

#[test]
fn cyclic_instance_reports_no_matching() {
    let input = "r 2 0 1\nc 0 0 1 1 0\np 0 1 1 2\np 1 1 2 0\n";
    let opts = MatchOptions { visit_cap: 512, ..Default::default() };
    let (status, out) = solve_text(input, &opts);
    assert_eq!(status, MatchStatus::Cycle);
    assert_eq!(out, "m 0\n");
    // the verifier treats an m 0 declaration as vacuously fine
    let mf = MatchFile::parse(&out).unwrap();
    assert!(!mf.found);
    assert!(verify_output(input, &out).is_empty());
}

#[test]
fn restarts_cannot_rescue_an_unsolvable_instance() {
    let input = "r 2 0 1\nc 0 0 1 1 0\np 0 1 1 2\np 1 1 2 0\n";
    let opts =
        MatchOptions { rnd: 3, visit_cap_rnd: 256, ..Default::default() };
    let (status, out) = solve_text(input, &opts);
    assert_eq!(status, MatchStatus::Cycle);
    assert_eq!(out, "m 0\n");
}

#[test]
fn restarts_leave_solvable_instances_solved() {
    let input = "r 2 7\nc 0 0 1 7 8\np 7 1 0 2\np 8 1 1\n";
    let opts = MatchOptions { rnd: 2, ..Default::default() };
    let (status, out) = solve_text(input, &opts);
    assert_eq!(status, MatchStatus::Matched);
    assert_eq!(out, "m 1\nr 0 7\nr 1 8\nr 2 -1\n");
}

#[test]
fn matching_is_deterministic_without_restarts() {
    let cfg = driver::GenConfig {
        residents: 40,
        programs: 10,
        couple_rate: 0.2,
        ..Default::default()
    };
    let gen = driver::generate_instance(&cfg, 21, false);
    let mut buf = Vec::new();
    gen.write_problem(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();

    let (s1, o1) = solve_text(&text, &MatchOptions::default());
    let (s2, o2) = solve_text(&text, &MatchOptions::default());
    assert_eq!(s1, s2);
    assert_eq!(o1, o2);
}

#[test]
fn raising_the_visit_cap_preserves_success() {
    let input = "r 2 7\nc 0 0 1 7 8\np 7 1 0 2\np 8 1 1\n";
    let low = MatchOptions { visit_cap: 64, ..Default::default() };
    let high = MatchOptions { visit_cap: 64 * 1024, ..Default::default() };
    let (s1, o1) = solve_text(input, &low);
    let (s2, o2) = solve_text(input, &high);
    assert_eq!(s1, MatchStatus::Matched);
    assert_eq!(s2, MatchStatus::Matched);
    assert_eq!(o1, o2);
}

#[test]
fn engine_and_verifier_agree_on_generated_instances() {
    for seed in 0..15u64 {
        let cfg = driver::GenConfig {
            residents: 30,
            programs: 8,
            couple_rate: 0.25,
            list_len: 6,
            dispersion: 0.4,
        };
        let gen = driver::generate_instance(&cfg, seed, false);
        let mut buf = Vec::new();
        gen.write_problem(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let opts = MatchOptions { visit_cap: 2048, ..Default::default() };
        let (status, out) = solve_text(&text, &opts);
        if status == MatchStatus::Matched {
            let errors = verify_output(&text, &out);
            assert!(errors.is_empty(), "seed {}: {:?}", seed, errors);
        }
    }
}

#[test]
fn problem_files_load_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tiny.txt");
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(f, "# tiny instance").unwrap();
    writeln!(f, "r 0 0").unwrap();
    writeln!(f, "p 0 1 0").unwrap();
    drop(f);

    let prob = Problem::from_path(&path).unwrap();
    assert_eq!(prob.residents[0].rol, vec![0]);
}

#[test]
fn instance_cache_round_trips() {
    let cfg = driver::GenConfig { residents: 20, programs: 5, ..Default::default() };
    let prob = driver::generate_instance(&cfg, 2, false);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.bin").display().to_string();
    prob.save(&path).unwrap();
    let reloaded = Problem::open(&path).unwrap();
    assert_eq!(prob.residents.len(), reloaded.residents.len());
    let a: Vec<_> = prob.programs.iter().map(|p| p.rol.clone()).collect();
    let b: Vec<_> = reloaded.programs.iter().map(|p| p.rol.clone()).collect();
    assert_eq!(a, b);
}
