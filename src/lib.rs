//! # 🔮 Dafo: Double-Array Factor Oracle
//!
//! A fast factor oracle implemented with the compact double-array structure.
//!
//! A *factor oracle* is an automaton built online over a fixed text that recognizes every
//! substring (*factor*) of that text. Membership queries run in time linear in the pattern
//! length with memory linear in the text length, which makes the structure a core primitive
//! for substring and pattern-matching engines. The transition function is encoded in an
//! offset-indexed shared table (BASE/CHECK/NEXT arrays) instead of per-state edge maps, so a
//! state-to-state step is a single XOR and two array reads.
//!
//! Note that the oracle is *sound but not exact*: every factor of the text is accepted, while
//! a bounded number of non-factors (at most one extra word per length) may also be accepted.
//! This is the standard trade-off for linear-time, linear-space online construction. Bytes
//! that never occur in the text always reject.
//!
//! ## Examples
//!
//! ```
//! use dafo::FactorOracle;
//!
//! let oracle = FactorOracle::new("abracatabra").unwrap();
//!
//! assert!(oracle.is_factor("abra"));
//! assert!(oracle.is_factor("racat"));
//! assert!(oracle.is_factor(""));
//! assert!(!oracle.is_factor("xyz"));
//! ```
//!
//! Queries can also be fed byte by byte through a cursor:
//!
//! ```
//! use dafo::FactorOracle;
//!
//! let oracle = FactorOracle::new("abbbabaaab").unwrap();
//!
//! let mut acceptor = oracle.acceptor();
//! assert!(acceptor.feed(b'b'));
//! assert!(acceptor.feed(b'a'));
//! assert!(acceptor.feed(b'b'));
//! assert!(!acceptor.feed(b'x'));
//! assert!(!acceptor.is_alive());
//! ```

pub mod errors;
mod oracle;
mod utils;

pub use crate::oracle::{Acceptor, FactorOracle, FactorOracleBuilder};
