use crate::matcher::DEFAULT_VISIT_CAP;

/// Runtime options for a matching run.
#[derive(Debug, Clone)]
pub struct MatchOptions {
    /// 0 = Roth-Peranson. Other values name algorithms that are not built
    /// into this crate.
    pub algo: u32,
    /// Number of restart rounds with permuted couple orderings; 0 disables
    /// restarts.
    pub rnd: u32,
    /// Base seed for the per-round couple permutations.
    pub seed: u64,
    pub visit_cap: u32,
    /// Lower cap used when restarts are enabled, so doomed rounds fail fast.
    pub visit_cap_rnd: u32,
    pub verb: u32,
}

impl Default for MatchOptions {
    fn default() -> Self {
        MatchOptions {
            algo: 0,
            rnd: 0,
            seed: 20140413,
            visit_cap: DEFAULT_VISIT_CAP,
            visit_cap_rnd: 8 * 1024,
            verb: 0,
        }
    }
}
