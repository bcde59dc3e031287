pub mod generator;

use serde::{Deserialize, Serialize};

pub type Rid = u32;
pub type Pid = u32;
pub type Cid = u32;

/// A couple's preference entry: one program per member, `None` meaning the
/// member stays unmatched in that entry.
pub type RolPair = (Option<Pid>, Option<Pid>);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resident {
    pub rol: Vec<Pid>,
    pub couple: Option<Cid>,
    pub matched: Option<Pid>,
    pub declared: bool,
}

impl Resident {
    /// Position of `p` in the ROL. `None` ranks just past the end (the
    /// acceptable worst); an unranked program ranks at `usize::MAX`.
    pub fn rank_of(&self, p: Option<Pid>) -> usize {
        match p {
            None => self.rol.len(),
            Some(p) => self.rol.iter().position(|&x| x == p).unwrap_or(usize::MAX),
        }
    }

    pub fn prefers(&self, p1: Option<Pid>, p2: Option<Pid>) -> bool {
        self.rank_of(p1) < self.rank_of(p2)
    }

    pub fn is_ranked(&self, p: Pid) -> bool {
        self.rol.contains(&p)
    }

    /// Would this resident leave its current match (if any) for `p`?
    pub fn will_accept(&self, p: Pid) -> bool {
        self.rank_of(Some(p)) < self.rank_of(self.matched)
    }

    pub fn in_couple(&self) -> bool {
        self.couple.is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Couple {
    pub r1: Rid,
    pub r2: Rid,
    pub rol: Vec<RolPair>,
    pub declared: bool,
}

impl Couple {
    pub fn rank_of(&self, pair: RolPair) -> usize {
        if pair == (None, None) {
            return self.rol.len();
        }
        self.rol.iter().position(|&x| x == pair).unwrap_or(usize::MAX)
    }

    pub fn prefers(&self, p1: RolPair, p2: RolPair) -> bool {
        self.rank_of(p1) < self.rank_of(p2)
    }

    pub fn is_ranked(&self, pair: RolPair) -> bool {
        self.rank_of(pair) <= self.rol.len()
    }

    pub fn partner_of(&self, r: Rid) -> Rid {
        if r == self.r1 {
            self.r2
        } else {
            self.r1
        }
    }

    /// Does any entry place `p` in the slot belonging to `r`?
    pub fn ranks_in_slot(&self, p: Pid, r: Rid) -> bool {
        if r == self.r1 {
            self.rol.iter().any(|&(s1, _)| s1 == Some(p))
        } else {
            self.rol.iter().any(|&(_, s2)| s2 == Some(p))
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Program {
    pub quota: usize,
    pub rol: Vec<Rid>,
    /// Currently accepted residents, kept sorted by this program's ranking,
    /// best first.
    pub accepted: Vec<Rid>,
    pub declared: bool,
}

impl Program {
    pub fn rank_of(&self, r: Option<Rid>) -> usize {
        match r {
            None => self.rol.len(),
            Some(r) => self.rol.iter().position(|&x| x == r).unwrap_or(usize::MAX),
        }
    }

    pub fn prefers(&self, r1: Option<Rid>, r2: Option<Rid>) -> bool {
        self.rank_of(r1) < self.rank_of(r2)
    }

    pub fn is_ranked(&self, r: Rid) -> bool {
        self.rol.contains(&r)
    }

    /// The marginal occupant: the worst accepted resident once the quota is
    /// filled.
    pub fn min_res(&self) -> Option<Rid> {
        if self.quota == 0 || self.accepted.len() < self.quota {
            None
        } else {
            Some(self.accepted[self.quota - 1])
        }
    }

    /// The second-worst occupant once at most one free seat remains.
    pub fn min2nd_res(&self) -> Option<Rid> {
        if self.quota < 2 || self.accepted.len() + 1 < self.quota {
            None
        } else {
            Some(self.accepted[self.quota - 2])
        }
    }

    pub fn will_accept(&self, r: Rid) -> bool {
        if self.quota == 0 {
            return false;
        }
        self.rank_of(Some(r)) < self.rank_of(self.min_res())
    }

    pub fn will_accept_pair(&self, r1: Rid, r2: Rid) -> bool {
        if self.quota < 2 {
            return false;
        }
        let lim = self.rank_of(self.min2nd_res());
        self.rank_of(Some(r1)) < lim && self.rank_of(Some(r2)) < lim
    }

    /// Insert `r`, re-sort, then bump the worst occupants until the quota
    /// holds again. If the newcomer lands at the bottom of a full program
    /// the newcomer itself is bumped; callers handle that like any other
    /// displacement.
    pub fn accept(&mut self, r: Rid) -> Vec<Rid> {
        self.accepted.push(r);
        self.sort_accepted();
        let mut bumped = Vec::new();
        while self.accepted.len() > self.quota {
            if let Some(worst) = self.accepted.pop() {
                bumped.push(worst);
            }
        }
        bumped
    }

    /// Insert both members of a couple: bump from the bottom until two seats
    /// are free, then insert. The newcomers are not bump candidates.
    /// Callers guarantee `quota >= 2`.
    pub fn accept_pair(&mut self, r1: Rid, r2: Rid) -> Vec<Rid> {
        let keep = self.quota.saturating_sub(2);
        let mut bumped = Vec::new();
        while self.accepted.len() > keep {
            if let Some(worst) = self.accepted.pop() {
                bumped.push(worst);
            }
        }
        self.accepted.push(r1);
        self.accepted.push(r2);
        self.sort_accepted();
        bumped
    }

    /// Remove `r` from the accepted set; no-op if absent.
    pub fn remove(&mut self, r: Rid) {
        self.accepted.retain(|&x| x != r);
    }

    /// Insert without quota enforcement, used when loading an externally
    /// produced matching; the verifier reports quota violations itself.
    pub(crate) fn insert_raw(&mut self, r: Rid) {
        self.accepted.push(r);
        self.sort_accepted();
    }

    fn sort_accepted(&mut self) {
        let rol = &self.rol;
        self.accepted
            .sort_by_key(|&r| rol.iter().position(|&x| x == r).unwrap_or(usize::MAX));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(quota: usize, rol: Vec<Rid>) -> Program {
        Program { quota, rol, accepted: Vec::new(), declared: true }
    }

    #[test]
    fn rank_conventions() {
        let r = Resident { rol: vec![3, 1, 7], ..Default::default() };
        assert_eq!(r.rank_of(Some(3)), 0);
        assert_eq!(r.rank_of(Some(7)), 2);
        assert_eq!(r.rank_of(None), 3);
        assert_eq!(r.rank_of(Some(9)), usize::MAX);
        assert!(r.will_accept(1));
        let matched = Resident { matched: Some(1), ..r };
        assert!(matched.will_accept(3));
        assert!(!matched.will_accept(7));
    }

    #[test]
    fn accept_bumps_worst() {
        let mut p = program(1, vec![2, 0, 1]);
        assert!(p.accept(0).is_empty());
        // preferred newcomer displaces the occupant
        assert_eq!(p.accept(2), vec![0]);
        assert_eq!(p.accepted, vec![2]);
    }

    #[test]
    fn accept_bounces_unwanted_newcomer() {
        let mut p = program(1, vec![2, 0, 1]);
        assert!(p.accept(2).is_empty());
        // the newcomer itself comes back as the displacement
        assert_eq!(p.accept(1), vec![1]);
        assert_eq!(p.accepted, vec![2]);
    }

    #[test]
    fn accept_with_zero_quota_bounces() {
        let mut p = program(0, vec![0]);
        assert_eq!(p.accept(0), vec![0]);
        assert!(p.accepted.is_empty());
    }

    #[test]
    fn pair_accept_clears_two_seats() {
        let mut p = program(2, vec![4, 5, 0, 1]);
        p.accept(0);
        p.accept(1);
        let bumped = p.accept_pair(4, 5);
        assert_eq!(bumped.len(), 2);
        assert!(bumped.contains(&0) && bumped.contains(&1));
        assert_eq!(p.accepted, vec![4, 5]);
    }

    #[test]
    fn pair_acceptance_needs_two_better_seats() {
        let mut p = program(2, vec![0, 1, 2, 3]);
        p.accept(0);
        p.accept(2);
        // both newcomers must beat the second-worst occupant
        assert!(!p.will_accept_pair(1, 3));
        let mut q = program(2, vec![1, 3, 0, 2]);
        q.accept(0);
        q.accept(2);
        assert!(q.will_accept_pair(1, 3));
    }

    #[test]
    fn min_res_tracks_marginal_occupant() {
        let mut p = program(2, vec![0, 1, 2]);
        assert_eq!(p.min_res(), None);
        p.accept(2);
        assert_eq!(p.min_res(), None);
        p.accept(0);
        assert_eq!(p.min_res(), Some(2));
        assert_eq!(p.min2nd_res(), Some(0));
    }
}
