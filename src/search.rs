// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Brute-force search for the noun and verb that make a program leave a target value in memory.
//!
//! Every `(noun, verb)` pair in `[0, bound)²` is tried in order, noun first: `(0, 0)`, `(0, 1)`,
//! ... `(0, bound - 1)`, `(1, 0)` and so on. Each trial runs on a fresh copy of the initial
//! memory, so the first pair found is always the same for the same inputs.
//!
//! # Example
//!
//! ```
//! use gravity_assist::search::{ParamPair, SearchConfig, find_pair};
//!
//! let code = [1, 0, 0, 3, 2, 3, 11, 0, 99, 30, 40, 50];
//! assert_eq!(
//!     find_pair(&code, &SearchConfig::new(3500)).unwrap(),
//!     ParamPair::new(9, 10)
//! );
//! assert_eq!(
//!     find_pair(&code, &SearchConfig::new(-7).with_bound(10)).unwrap(),
//!     ParamPair::NOT_FOUND
//! );
//! ```

use std::error::Error;
use std::fmt::{self, Display};

use itertools::iproduct;

use super::{Interpreter, OpcodePolicy};

/// A noun and verb, written into memory before a program runs
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct ParamPair {
    /// The value written at the noun offset
    pub noun: i64,
    /// The value written at the verb offset
    pub verb: i64,
}

impl ParamPair {
    /// Returned by [`find_pair`] when no pair in the search domain produced the target
    pub const NOT_FOUND: Self = Self::new(-1, -1);

    /// Create a new pair
    pub const fn new(noun: i64, verb: i64) -> Self {
        Self { noun, verb }
    }

    /// Whether this is a real pair rather than [`ParamPair::NOT_FOUND`]
    pub fn is_found(self) -> bool {
        self != Self::NOT_FOUND
    }

    /// [`None`] for [`ParamPair::NOT_FOUND`], otherwise `Some(self)`
    pub fn found(self) -> Option<Self> {
        self.is_found().then_some(self)
    }

    /// Write the noun and verb into `memory` at the given offsets
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::OffsetOutOfBounds`] if either offset is past the end of `memory`,
    /// in which case `memory` is left unchanged.
    pub fn inject(
        self,
        memory: &mut [i64],
        noun_offset: usize,
        verb_offset: usize,
    ) -> Result<(), SearchError> {
        check_offsets(memory.len(), noun_offset, verb_offset)?;
        memory[noun_offset] = self.noun;
        memory[verb_offset] = self.verb;
        Ok(())
    }
}

impl Display for ParamPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "noun {}, verb {}", self.noun, self.verb)
    }
}

/// Parameters for [`find_pair`]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct SearchConfig {
    /// The value wanted at address 0 once the program stops
    pub target: i64,
    /// Nouns and verbs are both searched over `0..bound`
    pub bound: i64,
    /// The address the noun is written to
    pub noun_offset: usize,
    /// The address the verb is written to
    pub verb_offset: usize,
    /// How each trial treats unrecognized opcodes
    pub policy: OpcodePolicy,
}

impl SearchConfig {
    /// Search `0..100` for a noun and verb, written at addresses 1 and 2, producing `target`
    pub const fn new(target: i64) -> Self {
        Self {
            target,
            bound: 100,
            noun_offset: 1,
            verb_offset: 2,
            policy: OpcodePolicy::Strict,
        }
    }

    /// Search `0..bound` instead
    #[must_use]
    pub const fn with_bound(mut self, bound: i64) -> Self {
        self.bound = bound;
        self
    }

    /// Write the noun and verb to different addresses
    #[must_use]
    pub const fn with_offsets(mut self, noun_offset: usize, verb_offset: usize) -> Self {
        self.noun_offset = noun_offset;
        self.verb_offset = verb_offset;
        self
    }

    /// Use a different [`OpcodePolicy`] for each trial
    #[must_use]
    pub const fn with_policy(mut self, policy: OpcodePolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// How much work a search did
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct SearchStats {
    /// Number of pairs tried, including the one that matched
    pub trials: u64,
    /// Number of trials where the program failed with an error
    pub failed_trials: u64,
}

#[derive(Debug, PartialEq, Eq)]
/// An error that prevented a search from starting
pub enum SearchError {
    /// The noun or verb offset is not an address in the program's memory
    OffsetOutOfBounds {
        /// The offending offset
        offset: usize,
        /// The size of memory
        len: usize,
    },
}

impl Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OffsetOutOfBounds { offset, len } => write!(
                f,
                "parameter offset {offset} is out of bounds for memory of {len} ints"
            ),
        }
    }
}

impl Error for SearchError {}

fn check_offsets(len: usize, noun_offset: usize, verb_offset: usize) -> Result<(), SearchError> {
    match [noun_offset, verb_offset].into_iter().find(|&o| o >= len) {
        Some(offset) => Err(SearchError::OffsetOutOfBounds { offset, len }),
        None => Ok(()),
    }
}

/// Find the first noun and verb that leave `config.target` at address 0.
///
/// A trial that fails with an [`InterpreterError`](crate::InterpreterError) is counted as not
/// matching. If nothing matches, [`ParamPair::NOT_FOUND`] is returned.
///
/// # Errors
///
/// Returns [`SearchError::OffsetOutOfBounds`] if the noun or verb offset is not in
/// `initial_memory`.
pub fn find_pair(initial_memory: &[i64], config: &SearchConfig) -> Result<ParamPair, SearchError> {
    find_pair_with_stats(initial_memory, config).map(|(pair, _)| pair)
}

/// Like [`find_pair`], but also returns [`SearchStats`] for the search.
///
/// # Errors
///
/// See [`find_pair`].
pub fn find_pair_with_stats(
    initial_memory: &[i64],
    config: &SearchConfig,
) -> Result<(ParamPair, SearchStats), SearchError> {
    check_offsets(initial_memory.len(), config.noun_offset, config.verb_offset)?;
    let mut stats = SearchStats::default();
    for (noun, verb) in iproduct!(0..config.bound, 0..config.bound) {
        let pair = ParamPair::new(noun, verb);
        let mut memory = initial_memory.to_vec();
        pair.inject(&mut memory, config.noun_offset, config.verb_offset)?;
        stats.trials += 1;

        let mut interpreter = Interpreter::new(memory).with_policy(config.policy);
        match interpreter.run() {
            Ok(_) if interpreter.mem_get(0) == Ok(config.target) => return Ok((pair, stats)),
            Ok(_) => (),
            Err(_) => stats.failed_trials += 1,
        }
    }
    Ok((ParamPair::NOT_FOUND, stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: [i64; 12] = [1, 0, 0, 3, 2, 3, 11, 0, 99, 30, 40, 50];

    #[test]
    fn finds_sample_pair() {
        let (pair, stats) = find_pair_with_stats(&SAMPLE, &SearchConfig::new(3500)).unwrap();
        assert_eq!(pair, ParamPair::new(9, 10));
        assert_eq!(stats.trials, 9 * 100 + 11);
        assert!(stats.failed_trials > 0);
    }

    #[test]
    fn first_match_wins() {
        // ADD noun, verb -> 0, where several pairs produce 5
        let code = [1, 0, 0, 0, 99, 0, 1, 2, 3, 4];
        let config = SearchConfig::new(5).with_bound(10);
        assert_eq!(find_pair(&code, &config), Ok(ParamPair::new(0, 9)));

        let mut memory = code.to_vec();
        ParamPair::new(9, 0).inject(&mut memory, 1, 2).unwrap();
        assert_eq!(crate::execute(memory).unwrap()[0], 5);
    }

    #[test]
    fn unsatisfiable_target() {
        let (pair, stats) =
            find_pair_with_stats(&SAMPLE, &SearchConfig::new(-1).with_bound(20)).unwrap();
        assert_eq!(pair, ParamPair::NOT_FOUND);
        assert!(!pair.is_found());
        assert_eq!(pair.found(), None);
        assert_eq!(stats.trials, 400);
    }

    #[test]
    fn empty_domain() {
        let (pair, stats) =
            find_pair_with_stats(&SAMPLE, &SearchConfig::new(3500).with_bound(0)).unwrap();
        assert_eq!(pair, ParamPair::NOT_FOUND);
        assert_eq!(stats, SearchStats::default());
    }

    #[test]
    fn bad_offsets() {
        assert_eq!(
            find_pair(&[99], &SearchConfig::new(0)),
            Err(SearchError::OffsetOutOfBounds { offset: 1, len: 1 })
        );
        assert_eq!(
            find_pair(&SAMPLE, &SearchConfig::new(0).with_offsets(1, 12)),
            Err(SearchError::OffsetOutOfBounds {
                offset: 12,
                len: 12
            })
        );
    }

    #[test]
    fn custom_offsets() {
        // MUL 9, 10 -> 0, with the noun and verb written into the data cells
        let code = [2, 9, 10, 0, 99, 0, 0, 0, 0, 0, 0];
        let config = SearchConfig::new(42).with_bound(10).with_offsets(9, 10);
        assert_eq!(find_pair(&code, &config), Ok(ParamPair::new(6, 7)));
    }

    #[test]
    fn policy_applies_to_trials() {
        // opcode 5 is only passed over under the skip policy
        let code = [5, 0, 0, 0, 1, 1, 2, 0, 99];
        let strict = SearchConfig::new(3).with_bound(5);
        assert_eq!(find_pair(&code, &strict), Ok(ParamPair::NOT_FOUND));
        let skip = strict.with_policy(OpcodePolicy::Skip);
        assert_eq!(find_pair(&code, &skip), Ok(ParamPair::new(0, 3)));
    }

    #[test]
    fn inject_leaves_memory_on_error() {
        let mut memory = vec![1, 2];
        assert!(ParamPair::new(7, 8).inject(&mut memory, 1, 2).is_err());
        assert_eq!(memory, vec![1, 2]);
    }
}
