use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::{Cid, Pid, Rid};
use crate::problem::Problem;
use crate::verifier;

/// Default cap on placements of one applicant into one program before the
/// engine declares a cycle.
pub const DEFAULT_VISIT_CAP: u32 = 124 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    Matched,
    Cycle,
}

/// Raised inside a round when some (applicant, program) visit count passes
/// the cap.
struct CycleDetected;

#[derive(Debug, Clone, Copy)]
enum Applicant {
    Single(Rid),
    Couple(Cid),
}

/// A deferred-acceptance matcher. The seam exists so alternative algorithms
/// can sit behind the same driver; only Roth-Peranson ships here.
pub trait Matcher {
    /// Run one round over `prob` with couples queued in `order`.
    /// Match state in `prob` holds the result on success and is meaningless
    /// after a cycle.
    fn run_round(&mut self, prob: &mut Problem, order: &[Cid]) -> MatchStatus;
}

/// The Roth-Peranson state machine: an applicant work stack, a program
/// revisit stack, per-applicant resume cursors and per-(applicant, program)
/// visit counts for cycle detection. Termination is certified by a global
/// re-examination that asks the verifier's stability question.
pub struct RpMatcher {
    work: Vec<Applicant>,
    revisit: Vec<Pid>,
    next_single: Vec<usize>,
    next_couple: Vec<usize>,
    res_visits: HashMap<(Rid, Pid), u32>,
    cpl_visits: HashMap<(Cid, Pid), u32>,
    visit_cap: u32,
}

impl RpMatcher {
    pub fn new(visit_cap: u32) -> RpMatcher {
        RpMatcher {
            work: Vec::new(),
            revisit: Vec::new(),
            next_single: Vec::new(),
            next_couple: Vec::new(),
            res_visits: HashMap::new(),
            cpl_visits: HashMap::new(),
            visit_cap,
        }
    }

    fn reset(&mut self, prob: &mut Problem) {
        prob.clear_matches();
        self.work.clear();
        self.revisit.clear();
        self.next_single = vec![0; prob.residents.len()];
        self.next_couple = vec![0; prob.couples.len()];
        self.res_visits.clear();
        self.cpl_visits.clear();
    }

    fn solve_round(&mut self, prob: &mut Problem, order: &[Cid]) -> Result<(), CycleDetected> {
        self.reset(prob);
        // stack pops run singles (ascending id) before couples
        for &c in order.iter().rev() {
            self.work.push(Applicant::Couple(c));
        }
        let singles: Vec<Rid> = prob.single_ids().collect();
        for &r in singles.iter().rev() {
            self.work.push(Applicant::Single(r));
        }

        loop {
            loop {
                if let Some(a) = self.work.pop() {
                    match a {
                        Applicant::Single(r) => self.single_step(prob, r)?,
                        Applicant::Couple(c) => self.couple_step(prob, c)?,
                    }
                } else if let Some(p) = self.revisit.pop() {
                    self.revisit_step(prob, p);
                } else {
                    break;
                }
                STEPS.fetch_add(1, Ordering::Relaxed);
                debug_assert!(prob.invariants_ok());
            }
            if !self.sweep(prob) {
                return Ok(());
            }
        }
    }

    /// One proposal for a single resident: try the next ROL entry strictly
    /// preferred to the current match. The program may immediately bounce
    /// the proposer; that comes back through the displacement list.
    fn single_step(&mut self, prob: &mut Problem, r: Rid) -> Result<(), CycleDetected> {
        SINGLE_STEPS.fetch_add(1, Ordering::Relaxed);
        let res = &prob.residents[r as usize];
        let limit = res.rank_of(res.matched).min(res.rol.len());
        let i = self.next_single[r as usize];
        if i >= limit {
            // matched at or above the resume point, or list exhausted
            return Ok(());
        }
        let p = res.rol[i];
        self.next_single[r as usize] = i + 1;
        self.note_single_visit(r, p)?;
        if let Some(prev) = prob.withdraw(r) {
            self.revisit.push(prev);
        }
        let bumped = prob.place(r, p);
        self.requeue_displaced(prob, bumped);
        Ok(())
    }

    /// Advance a couple to the best admissible pair strictly preferred to
    /// its current match, scanning from its resume cursor. Admissibility is
    /// tested with the couple's own members withdrawn, the same view the
    /// verifier takes; if nothing qualifies the old assignment is restored.
    fn couple_step(&mut self, prob: &mut Problem, c: Cid) -> Result<(), CycleDetected> {
        COUPLE_STEPS.fetch_add(1, Ordering::Relaxed);
        let (r1, r2) = {
            let cpl = &prob.couples[c as usize];
            (cpl.r1, cpl.r2)
        };
        let cur = prob.couple_match(c);
        let cpl_len = prob.couples[c as usize].rol.len();
        let limit = prob.couples[c as usize].rank_of(cur).min(cpl_len);
        let start = self.next_couple[c as usize];
        if start >= limit {
            return Ok(());
        }

        let held1 = prob.withdraw(r1);
        let held2 = prob.withdraw(r2);
        let mut found = None;
        for i in start..limit {
            let pair = prob.couples[c as usize].rol[i];
            if prob.pair_admissible(c, pair) {
                found = Some((i, pair));
                break;
            }
        }
        let Some((i, (s1, s2))) = found else {
            if let Some(p) = held1 {
                prob.restore(r1, p);
            }
            if let Some(p) = held2 {
                prob.restore(r2, p);
            }
            self.next_couple[c as usize] = limit;
            return Ok(());
        };

        self.next_couple[c as usize] = i + 1;
        if let Some(p) = s1 {
            self.note_couple_visit(c, p)?;
        }
        if let Some(p) = s2 {
            self.note_couple_visit(c, p)?;
        }
        if let Some(p) = held1 {
            self.revisit.push(p);
        }
        if let Some(p) = held2 {
            self.revisit.push(p);
        }

        let bumped = match (s1, s2) {
            (Some(p1), Some(p2)) if p1 == p2 => prob.place_pair(p1, r1, r2),
            _ => {
                let mut d = Vec::new();
                if let Some(p1) = s1 {
                    d.extend(prob.place(r1, p1));
                }
                if let Some(p2) = s2 {
                    d.extend(prob.place(r2, p2));
                }
                d
            }
        };
        self.requeue_displaced(prob, bumped);
        Ok(())
    }

    /// A program regained capacity: queue every applicant it would now take
    /// that would also come. Cursors reset so the newly opened slot is
    /// reachable.
    fn revisit_step(&mut self, prob: &Problem, p: Pid) {
        REVISITS.fetch_add(1, Ordering::Relaxed);
        let prog = &prob.programs[p as usize];
        let mut queued: Vec<Cid> = Vec::new();
        for &r in &prog.rol {
            if prog.accepted.contains(&r) || !prog.will_accept(r) {
                continue;
            }
            match prob.residents[r as usize].couple {
                None => {
                    if prob.residents[r as usize].will_accept(p) {
                        self.next_single[r as usize] = 0;
                        self.work.push(Applicant::Single(r));
                    }
                }
                Some(c) => {
                    if !queued.contains(&c) && prob.couple_will_accept_slot(c, p, r) {
                        queued.push(c);
                        self.next_couple[c as usize] = 0;
                        self.work.push(Applicant::Couple(c));
                    }
                }
            }
        }
    }

    /// Global re-examination with both stacks empty: re-queue every
    /// applicant the verifier would flag. Returns whether anything was
    /// queued; a clean sweep certifies stability.
    fn sweep(&mut self, prob: &mut Problem) -> bool {
        SWEEPS.fetch_add(1, Ordering::Relaxed);
        let mut pushed = false;
        let couples: Vec<Cid> = prob.couple_ids().collect();
        for &c in couples.iter().rev() {
            if verifier::couple_better(prob, c).is_some() {
                self.next_couple[c as usize] = 0;
                self.work.push(Applicant::Couple(c));
                pushed = true;
            }
        }
        let singles: Vec<Rid> = prob.single_ids().collect();
        for &r in singles.iter().rev() {
            if verifier::single_better(prob, r).is_some() {
                self.next_single[r as usize] = 0;
                self.work.push(Applicant::Single(r));
                pushed = true;
            }
        }
        pushed
    }

    /// Re-queue displaced residents. A displaced couple member breaks the
    /// whole couple: the partner is withdrawn too and its program goes onto
    /// the revisit stack.
    fn requeue_displaced(&mut self, prob: &mut Problem, bumped: Vec<Rid>) {
        let mut broken: Vec<Cid> = Vec::new();
        for r in bumped {
            BUMPS.fetch_add(1, Ordering::Relaxed);
            match prob.residents[r as usize].couple {
                None => self.work.push(Applicant::Single(r)),
                Some(c) => {
                    if broken.contains(&c) {
                        continue;
                    }
                    broken.push(c);
                    let partner = prob.couples[c as usize].partner_of(r);
                    if let Some(p) = prob.withdraw(partner) {
                        self.revisit.push(p);
                    }
                    self.work.push(Applicant::Couple(c));
                }
            }
        }
    }

    fn note_single_visit(&mut self, r: Rid, p: Pid) -> Result<(), CycleDetected> {
        PROPOSALS.fetch_add(1, Ordering::Relaxed);
        let n = self.res_visits.entry((r, p)).or_insert(0);
        *n += 1;
        if *n > self.visit_cap {
            Err(CycleDetected)
        } else {
            Ok(())
        }
    }

    fn note_couple_visit(&mut self, c: Cid, p: Pid) -> Result<(), CycleDetected> {
        PROPOSALS.fetch_add(1, Ordering::Relaxed);
        let n = self.cpl_visits.entry((c, p)).or_insert(0);
        *n += 1;
        if *n > self.visit_cap {
            Err(CycleDetected)
        } else {
            Ok(())
        }
    }
}

impl Matcher for RpMatcher {
    fn run_round(&mut self, prob: &mut Problem, order: &[Cid]) -> MatchStatus {
        match self.solve_round(prob, order) {
            Ok(()) => {
                assert!(prob.invariants_ok());
                MatchStatus::Matched
            }
            Err(CycleDetected) => MatchStatus::Cycle,
        }
    }
}

// Process-wide search counters. Kept as statics so the signal path can read
// them without touching engine state.
static STEPS: AtomicU64 = AtomicU64::new(0);
static SINGLE_STEPS: AtomicU64 = AtomicU64::new(0);
static COUPLE_STEPS: AtomicU64 = AtomicU64::new(0);
static PROPOSALS: AtomicU64 = AtomicU64::new(0);
static BUMPS: AtomicU64 = AtomicU64::new(0);
static REVISITS: AtomicU64 = AtomicU64::new(0);
static SWEEPS: AtomicU64 = AtomicU64::new(0);
pub(crate) static ROUNDS: AtomicU64 = AtomicU64::new(0);

static STAT_LINES: [(&str, &AtomicU64); 8] = [
    ("#applicant steps: ", &STEPS),
    ("#single steps: ", &SINGLE_STEPS),
    ("#couple steps: ", &COUPLE_STEPS),
    ("#proposals: ", &PROPOSALS),
    ("#displacements: ", &BUMPS),
    ("#program revisits: ", &REVISITS),
    ("#stability sweeps: ", &SWEEPS),
    ("#rounds: ", &ROUNDS),
];

pub fn print_stats() {
    println!("#RP Search Stats:");
    for (label, v) in STAT_LINES {
        println!("{}{}", label, v.load(Ordering::Relaxed));
    }
}

/// Signal-path stats dump: raw `write(2)` only, no allocation, no locks.
pub fn write_stats_raw(fd: i32) {
    write_bytes(fd, b"#RP Search Stats:\n");
    for (label, v) in STAT_LINES {
        write_bytes(fd, label.as_bytes());
        write_dec(fd, v.load(Ordering::Relaxed));
        write_bytes(fd, b"\n");
    }
}

fn write_bytes(fd: i32, buf: &[u8]) {
    unsafe {
        libc::write(fd, buf.as_ptr() as *const libc::c_void, buf.len());
    }
}

fn write_dec(fd: i32, mut v: u64) {
    let mut buf = [0u8; 20];
    let mut i = buf.len();
    loop {
        i -= 1;
        buf[i] = b'0' + (v % 10) as u8;
        v /= 10;
        if v == 0 {
            break;
        }
    }
    write_bytes(fd, &buf[i..]);
}
