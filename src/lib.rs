//! Roth-Peranson deferred acceptance for the residency match with couples,
//! together with an independent stability verifier and a random instance
//! generator.

pub mod driver;
pub mod matcher;
pub mod models;
pub mod parameters;
pub mod problem;
pub mod ranker;
pub mod verifier;

pub use matcher::{MatchStatus, Matcher, RpMatcher};
pub use parameters::MatchOptions;
pub use problem::{Problem, ProblemError};
