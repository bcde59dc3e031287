use std::path::Path;

use crate::models::{Cid, Pid, Rid};
use crate::problem::{Problem, ProblemError};

/// A parsed matching file: the `m` header plus resident assignment lines.
#[derive(Debug, Clone, Default)]
pub struct MatchFile {
    pub found: bool,
    pub assignment: Vec<(Rid, Option<Pid>)>,
}

impl MatchFile {
    pub fn from_path(path: &Path) -> Result<MatchFile, ProblemError> {
        let text = std::fs::read_to_string(path)?;
        MatchFile::parse(&text)
    }

    pub fn parse(text: &str) -> Result<MatchFile, ProblemError> {
        let mut mf = MatchFile::default();
        let mut errors = Vec::new();
        for raw in text.lines() {
            let l = raw.trim_start();
            match l.chars().next() {
                None | Some('#') => {}
                Some('m') => match parse_ints(l, "m") {
                    Some(f) if f.len() == 1 => mf.found = f[0] == 1,
                    _ => errors
                        .push(format!("Input ERROR: line \"{}\" from input is invalid", raw)),
                },
                Some('r') => match parse_ints(l, "r") {
                    Some(f) if f.len() == 2 && f[0] >= 0 && f[1] >= -1 => {
                        let pid = if f[1] < 0 { None } else { Some(f[1] as Pid) };
                        mf.assignment.push((f[0] as Rid, pid));
                    }
                    Some(f) if f.len() == 2 && f[0] < 0 => {
                        errors.push("Input ERROR: negative ID in resident spec.".to_string());
                    }
                    _ => errors
                        .push(format!("Input ERROR: line \"{}\" from input is invalid", raw)),
                },
                _ => errors.push(format!("Input ERROR: line \"{}\" from input is invalid", raw)),
            }
        }
        if !mf.found && !mf.assignment.is_empty() {
            errors.push("Input ERROR: resident match lines without an \"m 1\" header".to_string());
        }
        if errors.is_empty() {
            Ok(mf)
        } else {
            Err(ProblemError::Parse(errors))
        }
    }

    /// Load the assignment into the problem's match state.
    pub fn apply(&self, prob: &mut Problem) -> Result<(), ProblemError> {
        let mut errors = Vec::new();
        for &(r, p) in &self.assignment {
            if (r as usize) >= prob.residents.len() || !prob.residents[r as usize].declared {
                errors.push(format!("Input ERROR: match names unspecified resident {}", r));
                continue;
            }
            match p {
                None => {
                    prob.residents[r as usize].matched = None;
                }
                Some(p) => {
                    if (p as usize) >= prob.programs.len() || !prob.programs[p as usize].declared {
                        errors
                            .push(format!("Input ERROR: match names unspecified program {}", p));
                        continue;
                    }
                    prob.residents[r as usize].matched = Some(p);
                    prob.programs[p as usize].insert_raw(r);
                }
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProblemError::Parse(errors))
        }
    }
}

fn parse_ints(l: &str, tag: &str) -> Option<Vec<i64>> {
    let mut toks = l.split_whitespace();
    if toks.next() != Some(tag) {
        return None;
    }
    toks.map(|t| t.parse::<i64>().ok()).collect()
}

/// The first program a single resident strictly prefers to its current
/// match that would also take it, if any. A `Some` answer is a blocking
/// pair.
pub fn single_better(prob: &Problem, r: Rid) -> Option<Pid> {
    let res = &prob.residents[r as usize];
    let lim = res.rank_of(res.matched).min(res.rol.len());
    res.rol[..lim]
        .iter()
        .copied()
        .find(|&p| prob.programs[p as usize].will_accept(r))
}

/// The first ROL pair a couple strictly prefers to its current match that
/// is jointly admissible. Admission is judged with the couple's members
/// withdrawn from their own programs, which are restored before returning.
pub fn couple_better(prob: &mut Problem, c: Cid) -> Option<(usize, (Option<Pid>, Option<Pid>))> {
    let (r1, r2) = {
        let cpl = &prob.couples[c as usize];
        (cpl.r1, cpl.r2)
    };
    let held1 = prob.withdraw(r1);
    let held2 = prob.withdraw(r2);
    let cur = (held1, held2);
    let lim = {
        let cpl = &prob.couples[c as usize];
        cpl.rank_of(cur).min(cpl.rol.len())
    };
    let mut found = None;
    for i in 0..lim {
        let pair = prob.couples[c as usize].rol[i];
        if prob.pair_admissible(c, pair) {
            found = Some((i, pair));
            break;
        }
    }
    if let Some(p) = held1 {
        prob.restore(r1, p);
    }
    if let Some(p) = held2 {
        prob.restore(r2, p);
    }
    found
}

/// Certify the current match state of `prob`. Counterexample messages
/// accumulate; an empty list means the matching is stable.
pub fn check(prob: &mut Problem) -> Vec<String> {
    let mut errors = Vec::new();

    for (pid, prog) in prob.programs.iter().enumerate() {
        if prog.declared && prog.accepted.len() > prog.quota {
            errors.push(format!(
                "ERROR: Program {} accepted {} residents with quota {}",
                pid,
                prog.accepted.len(),
                prog.quota
            ));
        }
    }

    let singles: Vec<Rid> = prob.single_ids().collect();
    for r in singles {
        check_single(prob, r, &mut errors);
    }
    let couples: Vec<Cid> = prob.couple_ids().collect();
    for c in couples {
        check_couple(prob, c, &mut errors);
    }
    errors
}

fn check_single(prob: &mut Problem, r: Rid, errors: &mut Vec<String>) {
    let res = &prob.residents[r as usize];
    if let Some(p) = res.matched {
        let prog = &prob.programs[p as usize];
        if !res.is_ranked(p) || !prog.is_ranked(r) {
            errors.push(format!("ERROR: Resident {} = {}. Don't rank each other", r, p));
        }
        if !prog.accepted.contains(&r) {
            errors.push(format!("ERROR: Resident {} = {}. Program did not accept", r, p));
        }
    }
    if let Some(p0) = single_better(prob, r) {
        let m = prob.residents[r as usize].matched.map_or(-1, |p| p as i64);
        errors.push(format!(
            "ERROR: Resident {} = {}. Resident would match to higher ranked program {}",
            r, m, p0
        ));
    }
}

fn check_couple(prob: &mut Problem, c: Cid, errors: &mut Vec<String>) {
    let cur = prob.couple_match(c);
    if cur == (None, None) {
        return;
    }
    if !prob.couples[c as usize].is_ranked(cur) {
        errors.push(format!("ERROR: Couple {} = {:?}. Doesn't rank program pair", c, cur));
    }
    let (r1, r2) = {
        let cpl = &prob.couples[c as usize];
        (cpl.r1, cpl.r2)
    };
    if cur.0.is_some() {
        check_couple_resident(prob, c, r1, errors);
    }
    if cur.1.is_some() {
        check_couple_resident(prob, c, r2, errors);
    }
    if let Some((_, pair)) = couple_better(prob, c) {
        errors.push(format!(
            "ERROR: Couple {} = {:?}. Couple would match to higher ranked pair {:?}",
            c, cur, pair
        ));
    }
}

fn check_couple_resident(prob: &Problem, c: Cid, r: Rid, errors: &mut Vec<String>) {
    let Some(p) = prob.residents[r as usize].matched else { return };
    let prog = &prob.programs[p as usize];
    if !prog.is_ranked(r) {
        errors.push(format!(
            "ERROR: Couple {} = {:?}. Program does not rank",
            c,
            prob.couple_match(c)
        ));
    }
    if !prog.accepted.contains(&r) {
        errors.push(format!(
            "ERROR: Couple {} = {:?}. Program did not accept",
            c,
            prob.couple_match(c)
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_stable_matching() {
        let mut prob = Problem::parse("r 0 0\nr 1 0\np 0 1 1 0\n").unwrap();
        let mf = MatchFile::parse("m 1\nr 0 -1\nr 1 0\n").unwrap();
        mf.apply(&mut prob).unwrap();
        assert!(check(&mut prob).is_empty());
    }

    #[test]
    fn flags_a_blocking_pair() {
        // r1 is ranked above the accepted r0, yet left unmatched
        let mut prob = Problem::parse("r 0 0\nr 1 0\np 0 1 1 0\n").unwrap();
        let mf = MatchFile::parse("m 1\nr 0 0\nr 1 -1\n").unwrap();
        mf.apply(&mut prob).unwrap();
        let errors = check(&mut prob);
        assert!(errors.iter().any(|e| e.contains("higher ranked program")));
    }

    #[test]
    fn flags_an_unranked_assignment() {
        let mut prob = Problem::parse("r 0 0\nr 1 0 1\np 0 2 0 1\np 1 1 1\n").unwrap();
        // resident 0 never ranked program 1
        prob.residents[0].matched = Some(1);
        prob.programs[1].accepted.push(0);
        let errors = check(&mut prob);
        assert!(errors.iter().any(|e| e.contains("Don't rank each other")));
    }

    #[test]
    fn flags_a_couple_improvement() {
        // couple sits on its second choice while its first is wide open
        let mut prob =
            Problem::parse("c 0 0 1 2 3 4 4\np 2 1 0\np 3 1 1\np 4 2 0 1\n").unwrap();
        let mf = MatchFile::parse("m 1\nr 0 4\nr 1 4\n").unwrap();
        mf.apply(&mut prob).unwrap();
        let errors = check(&mut prob);
        assert!(errors.iter().any(|e| e.contains("higher ranked pair")));
    }

    #[test]
    fn couple_improvement_sees_its_own_vacated_seats() {
        // the preferred pair reuses one of the couple's current programs;
        // only the withdrawn view finds it admissible
        let mut prob =
            Problem::parse("c 0 0 1 2 3 3 2\np 2 1 1 0\np 3 1 0 1\n").unwrap();
        let mf = MatchFile::parse("m 1\nr 0 3\nr 1 2\n").unwrap();
        mf.apply(&mut prob).unwrap();
        let errors = check(&mut prob);
        assert!(errors.iter().any(|e| e.contains("higher ranked pair")));
    }

    #[test]
    fn no_match_header_with_lines_is_an_error() {
        assert!(MatchFile::parse("r 0 0\n").is_err());
        assert!(MatchFile::parse("m 0\n").unwrap().assignment.is_empty());
    }
}
