use std::collections::HashSet;
use std::fmt;
use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Cid, Couple, Pid, Program, Resident, Rid, RolPair};

#[derive(Debug, Error)]
pub enum ProblemError {
    #[error("{}", .0.join("\n"))]
    Parse(Vec<String>),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// The in-memory matching problem. Entities are owned here and referenced by
/// dense integer ids indexing the three arrays. Everything is structurally
/// immutable after sanitization; only `Resident::matched` and
/// `Program::accepted` change during matching.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Problem {
    pub residents: Vec<Resident>,
    pub couples: Vec<Couple>,
    pub programs: Vec<Program>,
}

fn slot<T: Default>(v: &mut Vec<T>, id: usize) -> &mut T {
    if v.len() <= id {
        v.resize_with(id + 1, Default::default);
    }
    &mut v[id]
}

impl Problem {
    pub fn from_path(path: &Path) -> Result<Problem, ProblemError> {
        let text = std::fs::read_to_string(path)?;
        Problem::parse(&text)
    }

    /// Parse the line-oriented problem format. Errors accumulate and are
    /// reported together; the problem is sanitized before it is returned.
    pub fn parse(text: &str) -> Result<Problem, ProblemError> {
        let mut loader = Loader::default();
        for line in text.lines() {
            loader.line(line);
        }
        loader.finish()
    }

    pub fn save(&self, path: &str) -> bincode::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = io::BufWriter::new(file);
        bincode::serialize_into(writer, self)
    }

    pub fn open(path: &str) -> bincode::Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = io::BufReader::new(file);
        bincode::deserialize_from(reader)
    }

    /// Remove unreciprocated rankings so every preference edge is mutual.
    /// Idempotent.
    pub fn sanitize(&mut self) {
        for rid in 0..self.residents.len() {
            let rol = std::mem::take(&mut self.residents[rid].rol);
            let kept: Vec<Pid> = rol
                .into_iter()
                .filter(|&p| self.programs[p as usize].is_ranked(rid as Rid))
                .collect();
            self.residents[rid].rol = kept;
        }
        for cid in 0..self.couples.len() {
            let (r1, r2) = (self.couples[cid].r1, self.couples[cid].r2);
            let rol = std::mem::take(&mut self.couples[cid].rol);
            let kept: Vec<RolPair> = rol
                .into_iter()
                .filter(|&(s1, s2)| {
                    s1.map_or(true, |p| self.programs[p as usize].is_ranked(r1))
                        && s2.map_or(true, |p| self.programs[p as usize].is_ranked(r2))
                })
                .collect();
            self.couples[cid].rol = kept;
        }
        for pid in 0..self.programs.len() {
            let rol = std::mem::take(&mut self.programs[pid].rol);
            let kept: Vec<Rid> = rol
                .into_iter()
                .filter(|&r| {
                    let res = &self.residents[r as usize];
                    match res.couple {
                        Some(c) => self.couples[c as usize].ranks_in_slot(pid as Pid, r),
                        None => res.is_ranked(pid as Pid),
                    }
                })
                .collect();
            self.programs[pid].rol = kept;
        }
    }

    pub fn couple_match(&self, c: Cid) -> RolPair {
        let cpl = &self.couples[c as usize];
        (
            self.residents[cpl.r1 as usize].matched,
            self.residents[cpl.r2 as usize].matched,
        )
    }

    /// Program-side admissibility of a couple ROL entry: a shared program
    /// must take both members at once, otherwise every non-NONE slot must
    /// accept its member. The all-NONE entry is never admissible.
    pub fn pair_admissible(&self, c: Cid, pair: RolPair) -> bool {
        let cpl = &self.couples[c as usize];
        match pair {
            (None, None) => false,
            (Some(p1), Some(p2)) if p1 == p2 => {
                self.programs[p1 as usize].will_accept_pair(cpl.r1, cpl.r2)
            }
            (s1, s2) => {
                s1.map_or(true, |p| self.programs[p as usize].will_accept(cpl.r1))
                    && s2.map_or(true, |p| self.programs[p as usize].will_accept(cpl.r2))
            }
        }
    }

    /// The asymmetric couple query: does the couple rank some entry strictly
    /// preferred to its current match that places `r` into `p`, such that
    /// the other slot's program would take the partner?
    pub fn couple_will_accept_slot(&self, c: Cid, p: Pid, r: Rid) -> bool {
        let cpl = &self.couples[c as usize];
        let lim = cpl.rank_of(self.couple_match(c)).min(cpl.rol.len());
        let first_slot = r == cpl.r1;
        cpl.rol[..lim].iter().any(|&(s1, s2)| {
            if first_slot {
                s1 == Some(p) && s2.map_or(true, |q| self.programs[q as usize].will_accept(cpl.r2))
            } else {
                s2 == Some(p) && s1.map_or(true, |q| self.programs[q as usize].will_accept(cpl.r1))
            }
        })
    }

    /// Match `r` into `p`. Any bumped residents come back unmatched.
    pub fn place(&mut self, r: Rid, p: Pid) -> Vec<Rid> {
        self.residents[r as usize].matched = Some(p);
        let bumped = self.programs[p as usize].accept(r);
        for &b in &bumped {
            self.residents[b as usize].matched = None;
        }
        bumped
    }

    /// Match both members of couple into the same program.
    pub fn place_pair(&mut self, p: Pid, r1: Rid, r2: Rid) -> Vec<Rid> {
        self.residents[r1 as usize].matched = Some(p);
        self.residents[r2 as usize].matched = Some(p);
        let bumped = self.programs[p as usize].accept_pair(r1, r2);
        for &b in &bumped {
            self.residents[b as usize].matched = None;
        }
        bumped
    }

    /// Unmatch `r`, returning the program it vacated.
    pub fn withdraw(&mut self, r: Rid) -> Option<Pid> {
        let p = self.residents[r as usize].matched.take()?;
        self.programs[p as usize].remove(r);
        Some(p)
    }

    /// Put `r` back into `p` after a temporary withdrawal. Capacity was not
    /// given away in between, so this never displaces.
    pub fn restore(&mut self, r: Rid, p: Pid) {
        self.residents[r as usize].matched = Some(p);
        let bumped = self.programs[p as usize].accept(r);
        debug_assert!(bumped.is_empty());
        for &b in &bumped {
            self.residents[b as usize].matched = None;
        }
    }

    pub fn clear_matches(&mut self) {
        for r in &mut self.residents {
            r.matched = None;
        }
        for p in &mut self.programs {
            p.accepted.clear();
        }
    }

    pub fn single_ids(&self) -> impl Iterator<Item = Rid> + '_ {
        self.residents
            .iter()
            .enumerate()
            .filter(|(_, r)| r.declared && !r.in_couple())
            .map(|(id, _)| id as Rid)
    }

    pub fn couple_ids(&self) -> impl Iterator<Item = Cid> + '_ {
        self.couples
            .iter()
            .enumerate()
            .filter(|(_, c)| c.declared)
            .map(|(id, _)| id as Cid)
    }

    /// Structural invariants that must hold after every completed applicant
    /// step: quotas respected, accepted sets sorted by program rank, match
    /// fields and accepted sets consistent, couple matches on the couple ROL.
    pub fn invariants_ok(&self) -> bool {
        for (pid, prog) in self.programs.iter().enumerate() {
            if prog.accepted.len() > prog.quota {
                return false;
            }
            let ranks: Vec<usize> = prog.accepted.iter().map(|&r| prog.rank_of(Some(r))).collect();
            if ranks.windows(2).any(|w| w[0] >= w[1]) {
                return false;
            }
            for &r in &prog.accepted {
                if self.residents[r as usize].matched != Some(pid as Pid) {
                    return false;
                }
            }
        }
        for (rid, res) in self.residents.iter().enumerate() {
            if let Some(p) = res.matched {
                let prog = &self.programs[p as usize];
                if !prog.accepted.contains(&(rid as Rid)) || !prog.is_ranked(rid as Rid) {
                    return false;
                }
            }
        }
        for c in self.couple_ids() {
            let m = self.couple_match(c);
            if m != (None, None) && !self.couples[c as usize].is_ranked(m) {
                return false;
            }
        }
        true
    }

    /// Emit the matching file: `m 1` followed by one `r <rid> <pid>` line per
    /// declared resident (-1 when unmatched), or just `m 0`.
    pub fn write_match<W: Write>(&self, w: &mut W, found: bool) -> io::Result<()> {
        if !found {
            return writeln!(w, "m 0");
        }
        writeln!(w, "m 1")?;
        for (rid, res) in self.residents.iter().enumerate() {
            if !res.declared {
                continue;
            }
            let pid = res.matched.map_or(-1, |p| p as i64);
            writeln!(w, "r {} {}", rid, pid)?;
        }
        Ok(())
    }

    /// Emit the problem in its own input format.
    pub fn write_problem<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for (rid, res) in self.residents.iter().enumerate() {
            if !res.declared || res.in_couple() {
                continue;
            }
            write!(w, "r {}", rid)?;
            for &p in &res.rol {
                write!(w, " {}", p)?;
            }
            writeln!(w)?;
        }
        for (cid, cpl) in self.couples.iter().enumerate() {
            if !cpl.declared {
                continue;
            }
            write!(w, "c {} {} {}", cid, cpl.r1, cpl.r2)?;
            for &(s1, s2) in &cpl.rol {
                write!(w, " {} {}", s1.map_or(-1, |p| p as i64), s2.map_or(-1, |p| p as i64))?;
            }
            writeln!(w)?;
        }
        for (pid, prog) in self.programs.iter().enumerate() {
            if !prog.declared {
                continue;
            }
            write!(w, "p {} {}", pid, prog.quota)?;
            for &r in &prog.rol {
                write!(w, " {}", r)?;
            }
            writeln!(w)?;
        }
        Ok(())
    }

    /// Summary statistics over the current match state, `#`-prefixed.
    pub fn print_summary(&self) {
        let mut res_not_matched = 0usize;
        let mut n_sing = 0usize;
        let mut res_top = 0usize;
        let mut res_ave = 0f64;
        for res in self.residents.iter().filter(|r| r.declared && !r.in_couple()) {
            n_sing += 1;
            match res.matched {
                None => res_not_matched += 1,
                Some(_) => {
                    let rank = res.rank_of(res.matched);
                    res_ave += rank as f64;
                    if rank == 0 {
                        res_top += 1;
                    }
                }
            }
        }

        let mut cpl_not_matched = 0usize;
        let mut cpl_top = 0usize;
        let mut cpl_ave = 0f64;
        let mut n_cpl = 0usize;
        for c in self.couple_ids() {
            n_cpl += 1;
            let m = self.couple_match(c);
            if m == (None, None) {
                cpl_not_matched += 1;
            } else {
                let rank = self.couples[c as usize].rank_of(m);
                cpl_ave += rank as f64;
                if rank == 0 {
                    cpl_top += 1;
                }
            }
        }

        let mut spare = 0usize;
        let mut prg_top = 0usize;
        let mut prg_ave = 0f64;
        let mut matched_progs = 0usize;
        for prog in self.programs.iter().filter(|p| p.declared) {
            spare += prog.quota.saturating_sub(prog.accepted.len());
            if prog.accepted.is_empty() {
                continue;
            }
            let mut ave = 0f64;
            for &r in &prog.accepted {
                let rank = prog.rank_of(Some(r));
                ave += rank as f64;
                if rank == 0 {
                    prg_top += 1;
                }
            }
            prg_ave += ave / prog.accepted.len() as f64;
            matched_progs += 1;
        }

        println!("#Matching Summary Stats:");
        println!("#Unmatched Singles: {}", res_not_matched);
        println!("#Unmatched Couples: {}", cpl_not_matched);
        println!("#Unmatched Program slots: {}", spare);
        if n_sing > res_not_matched {
            println!(
                "#Ave Resident Rank of their matching = {}",
                res_ave / (n_sing - res_not_matched) as f64
            );
        }
        println!("#Num Residents getting their top rank = {}", res_top);
        if n_cpl > cpl_not_matched {
            println!(
                "#Ave Couple Rank of their matching = {}",
                cpl_ave / (n_cpl - cpl_not_matched) as f64
            );
        }
        println!("#Num Couples getting their top rank = {}", cpl_top);
        if matched_progs > 0 {
            println!(
                "#Ave Program Rank of their matched residents {}",
                prg_ave / matched_progs as f64
            );
        }
        println!("#Num Programs getting their top rank = {}", prg_top);
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Problem Spec\nResidents:")?;
        for (rid, res) in self.residents.iter().enumerate() {
            if !res.declared {
                continue;
            }
            write!(f, "Resident {}. match = {:?} ", rid, res.matched)?;
            match res.couple {
                Some(c) => writeln!(f, "in couple {}", c)?,
                None => writeln!(f, "not in couple")?,
            }
            writeln!(f, "ROL = {:?}", res.rol)?;
        }
        writeln!(f, "\nCouples:")?;
        for (cid, cpl) in self.couples.iter().enumerate() {
            if !cpl.declared {
                continue;
            }
            writeln!(
                f,
                "Couple {}. r1 = {} r2 = {} match = {:?}",
                cid,
                cpl.r1,
                cpl.r2,
                self.couple_match(cid as Cid)
            )?;
            writeln!(f, "ROL = {:?}", cpl.rol)?;
        }
        writeln!(f, "\nPrograms:")?;
        for (pid, prog) in self.programs.iter().enumerate() {
            if !prog.declared {
                continue;
            }
            writeln!(f, "Program {}. quota = {}", pid, prog.quota)?;
            writeln!(f, "accepted = {:?}", prog.accepted)?;
            writeln!(f, "ROL = {:?}\n", prog.rol)?;
        }
        Ok(())
    }
}

#[derive(Default)]
struct Loader {
    prob: Problem,
    errors: Vec<String>,
    res_ids: HashSet<i64>,
    prog_ids: HashSet<i64>,
    cpl_ids: HashSet<i64>,
    progs_ranked: Vec<i64>,
    res_ranked: Vec<i64>,
}

impl Loader {
    fn post_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn line(&mut self, raw: &str) {
        let l = raw.trim_start();
        match l.chars().next() {
            None | Some('#') => {}
            Some('r') => self.resident(raw, l),
            Some('c') => self.couple(raw, l),
            Some('p') => self.program(raw, l),
            _ => self.post_error(format!("Input ERROR: line \"{}\" from input is invalid", raw)),
        }
    }

    /// Tokenize `l`, insisting the tag stands alone, and parse the rest as
    /// integers.
    fn fields(&mut self, raw: &str, l: &str, tag: &str) -> Option<Vec<i64>> {
        let mut toks = l.split_whitespace();
        if toks.next() != Some(tag) {
            self.post_error(format!("Input ERROR: line \"{}\" from input is invalid", raw));
            return None;
        }
        let mut out = Vec::new();
        for t in toks {
            match t.parse::<i64>() {
                Ok(v) => out.push(v),
                Err(_) => {
                    self.post_error(format!(
                        "Input ERROR: bad token \"{}\" on line \"{}\"",
                        t, raw
                    ));
                    return None;
                }
            }
        }
        Some(out)
    }

    fn chk_id(&mut self, id: i64, which: Which, msg: &str) -> bool {
        let set = match which {
            Which::Res => &mut self.res_ids,
            Which::Prog => &mut self.prog_ids,
            Which::Cpl => &mut self.cpl_ids,
        };
        if set.contains(&id) {
            self.post_error(msg.to_string());
            false
        } else {
            set.insert(id);
            true
        }
    }

    fn resident(&mut self, raw: &str, l: &str) {
        // "r <rid> <rol>", program ids most preferred first
        let Some(f) = self.fields(raw, l, "r") else { return };
        let Some((&rid, pids)) = f.split_first() else {
            self.post_error("Input ERROR: resident spec missing ID.".to_string());
            return;
        };
        if rid < 0 {
            self.post_error("Input ERROR: negative Resident ID in resident spec.".to_string());
            return;
        }
        if pids.iter().any(|&p| p < 0) {
            self.post_error("Input ERROR: negative program ID in resident spec.".to_string());
            return;
        }
        if !self.chk_id(rid, Which::Res, "Input ERROR: Duplicate resident ID in resident specs.") {
            return;
        }
        self.progs_ranked.extend_from_slice(pids);
        let rol: Vec<Pid> = pids.iter().map(|&p| p as Pid).collect();
        *slot(&mut self.prob.residents, rid as usize) =
            Resident { rol, couple: None, matched: None, declared: true };
    }

    fn couple(&mut self, raw: &str, l: &str) {
        // "c <cid> <r1> <r2> <rol>", an even number of program ids read as
        // pairs; -1 is the null program and is legal here
        let Some(f) = self.fields(raw, l, "c") else { return };
        if f.len() < 3 {
            self.post_error("Input ERROR: couple spec missing IDs.".to_string());
            return;
        }
        let (cid, r1, r2) = (f[0], f[1], f[2]);
        let pids = &f[3..];
        if pids.len() % 2 != 0 {
            self.post_error(
                "Input ERROR: Couple input had odd number of programs specified (not pairs)"
                    .to_string(),
            );
            return;
        }
        if r1 < 0 || r2 < 0 {
            self.post_error("Input ERROR: negative resident ID in couple spec".to_string());
            return;
        }
        if cid < 0 {
            self.post_error("Input ERROR: negative couple ID in couple spec".to_string());
            return;
        }
        if r1 == r2 {
            self.post_error("Input ERROR: couple names the same resident twice".to_string());
            return;
        }
        if pids.iter().any(|&p| p < -1) {
            self.post_error("Input ERROR: bad program ID in couple spec".to_string());
            return;
        }
        if !self.chk_id(r1, Which::Res, "Input ERROR: Duplicate resident ID in couple spec.") {
            return;
        }
        if !self.chk_id(r2, Which::Res, "Input ERROR: Duplicate resident ID in couple spec.") {
            return;
        }
        if !self.chk_id(cid, Which::Cpl, "Input ERROR: Duplicate couple ID in couple specs.") {
            return;
        }
        self.progs_ranked.extend_from_slice(pids);
        let rol: Vec<RolPair> = pids
            .chunks(2)
            .map(|w| {
                let s = |v: i64| if v < 0 { None } else { Some(v as Pid) };
                (s(w[0]), s(w[1]))
            })
            .collect();
        *slot(&mut self.prob.couples, cid as usize) =
            Couple { r1: r1 as Rid, r2: r2 as Rid, rol, declared: true };
        *slot(&mut self.prob.residents, r1 as usize) =
            Resident { rol: Vec::new(), couple: Some(cid as Cid), matched: None, declared: true };
        *slot(&mut self.prob.residents, r2 as usize) =
            Resident { rol: Vec::new(), couple: Some(cid as Cid), matched: None, declared: true };
    }

    fn program(&mut self, raw: &str, l: &str) {
        // "p <pid> <quota> <rol>"
        let Some(f) = self.fields(raw, l, "p") else { return };
        if f.len() < 2 {
            self.post_error("Input ERROR: program spec missing ID or quota.".to_string());
            return;
        }
        let (pid, quota) = (f[0], f[1]);
        let rids = &f[2..];
        if pid < 0 {
            self.post_error("Input ERROR: negative Program ID in program spec.".to_string());
            return;
        }
        if quota < 0 {
            self.post_error("Input ERROR: negative quota in program spec.".to_string());
            return;
        }
        if rids.iter().any(|&r| r < 0) {
            self.post_error("Input ERROR: negative resident ID in program spec.".to_string());
            return;
        }
        if !self.chk_id(pid, Which::Prog, "Input ERROR: Duplicate program ID in program specs.") {
            return;
        }
        self.res_ranked.extend_from_slice(rids);
        let rol: Vec<Rid> = rids.iter().map(|&r| r as Rid).collect();
        *slot(&mut self.prob.programs, pid as usize) =
            Program { quota: quota as usize, rol, accepted: Vec::new(), declared: true };
    }

    fn finish(mut self) -> Result<Problem, ProblemError> {
        for &pid in &self.progs_ranked {
            if pid != -1 && !self.prog_ids.contains(&pid) {
                self.errors
                    .push("Input ERROR: Resident or Couple ranked unspecified program.".to_string());
            }
        }
        for &rid in &self.res_ranked {
            if !self.res_ids.contains(&rid) {
                self.errors.push("Input ERROR: Program ranked unspecified resident.".to_string());
            }
        }
        if !self.errors.is_empty() {
            return Err(ProblemError::Parse(self.errors));
        }
        self.prob.sanitize();
        Ok(self.prob)
    }
}

#[derive(Clone, Copy)]
enum Which {
    Res,
    Prog,
    Cpl,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_small_problem() {
        let prob = Problem::parse("# comment\nr 0 0 1\np 0 2 0\np 1 1 0\n").unwrap();
        assert_eq!(prob.residents[0].rol, vec![0, 1]);
        assert_eq!(prob.programs[0].quota, 2);
        assert!(prob.programs[1].declared);
    }

    #[test]
    fn accumulates_input_errors() {
        let err = Problem::parse("r 0 0\nr 0 1\nq nonsense\np 0 1 0 5\n").unwrap_err();
        let ProblemError::Parse(msgs) = err else { panic!("expected parse error") };
        // duplicate resident, invalid line, undeclared resident 5 (program 1
        // exists, program ids 0/1 both fine)
        assert!(msgs.iter().any(|m| m.contains("Duplicate resident ID")));
        assert!(msgs.iter().any(|m| m.contains("is invalid")));
        assert!(msgs.iter().any(|m| m.contains("unspecified resident")));
    }

    #[test]
    fn rejects_odd_couple_rol() {
        let err = Problem::parse("c 0 0 1 2 3 4\np 2 1 0\np 3 1 1\np 4 1 0\n").unwrap_err();
        let ProblemError::Parse(msgs) = err else { panic!("expected parse error") };
        assert!(msgs.iter().any(|m| m.contains("odd number")));
    }

    #[test]
    fn rejects_resident_shared_between_lines() {
        let err = Problem::parse("r 0 1\nc 0 0 2 1 1\np 1 2 0 2\n").unwrap_err();
        let ProblemError::Parse(msgs) = err else { panic!("expected parse error") };
        assert!(msgs.iter().any(|m| m.contains("Duplicate resident ID in couple spec")));
    }

    #[test]
    fn sanitize_prunes_unreciprocated_edges() {
        // resident 0 ranks program 0, program ranks nobody
        let prob = Problem::parse("r 0 0\np 0 1\n").unwrap();
        assert!(prob.residents[0].rol.is_empty());
    }

    #[test]
    fn sanitize_is_idempotent() {
        let mut prob =
            Problem::parse("r 0 0 1\nr 1 1\nc 0 2 3 0 1 1 -1\np 0 1 0 2\np 1 2 0 3\n").unwrap();
        let once = prob.clone();
        prob.sanitize();
        let rols: Vec<_> = prob.residents.iter().map(|r| r.rol.clone()).collect();
        let rols_once: Vec<_> = once.residents.iter().map(|r| r.rol.clone()).collect();
        assert_eq!(rols, rols_once);
        assert_eq!(prob.couples[0].rol, once.couples[0].rol);
        let prols: Vec<_> = prob.programs.iter().map(|p| p.rol.clone()).collect();
        let prols_once: Vec<_> = once.programs.iter().map(|p| p.rol.clone()).collect();
        assert_eq!(prols, prols_once);
    }

    #[test]
    fn couple_slot_sanitization() {
        // couple ranks (0, 1) but program 1 does not rank member r2 = 3;
        // the entry goes away while (0, -1) survives
        let prob = Problem::parse("c 0 2 3 0 1 0 -1\np 0 1 2\np 1 1 2\n").unwrap();
        assert_eq!(prob.couples[0].rol, vec![(Some(0), None)]);
        // program 1's ranking of resident 2 is unreciprocated in slot terms
        assert!(prob.programs[1].rol.is_empty());
    }

    #[test]
    fn place_and_withdraw_stay_consistent() {
        let mut prob = Problem::parse("r 0 0\nr 1 0\np 0 1 1 0\n").unwrap();
        assert!(prob.place(0, 0).is_empty());
        assert!(prob.invariants_ok());
        let bumped = prob.place(1, 0);
        assert_eq!(bumped, vec![0]);
        assert_eq!(prob.residents[0].matched, None);
        assert!(prob.invariants_ok());
        assert_eq!(prob.withdraw(1), Some(0));
        assert!(prob.programs[0].accepted.is_empty());
    }
}
