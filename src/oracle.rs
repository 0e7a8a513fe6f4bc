//! A factor oracle implemented with the compact double-array structure.

mod builder;

use core::mem;

use crate::errors::Result;
use crate::utils::FromU32;

pub use builder::FactorOracleBuilder;

// The root state id.
pub(crate) const ROOT_STATE_ID: u32 = 0;
// BASE value of a state that owns no table out-edges.
pub(crate) const BASE_INVALID: u32 = u32::MAX;
// NEXT value of a slot that holds no live transition.
pub(crate) const NEXT_INVALID: u32 = u32::MAX;

/// Substring-membership automaton over a fixed text, implemented with the compact
/// double-array structure.
///
/// [`FactorOracle`] indexes one byte sequence at construction time and afterwards answers
/// "is this a substring of the indexed text" in time linear in the query length. States are
/// numbered `0..=n` for a text of length `n`: state `0` is the initial state, and state `i`
/// is reached from state `i - 1` by consuming the text's `i`-th byte (the *spine*).
/// Additional *factor* edges inserted by the online construction are stored in a shared
/// XOR-addressed transition table, so each step costs a constant number of array reads.
///
/// Every state is accepting; a query is accepted iff all of its bytes can be consumed.
/// The automaton is immutable, and shared read-only queries from multiple threads are safe.
///
/// # Examples
///
/// ```
/// use dafo::FactorOracle;
///
/// let oracle = FactorOracle::new("abbbabaaab").unwrap();
///
/// assert!(oracle.is_factor("abbbab"));
/// assert!(oracle.is_factor("aaab"));
/// assert!(!oracle.is_factor("xyz"));
/// ```
pub struct FactorOracle {
    states: Vec<State>,
    text_len: u32,
}

impl FactorOracle {
    /// Creates a new [`FactorOracle`] over the given text.
    ///
    /// # Arguments
    ///
    /// * `text` - Byte sequence to index.
    ///
    /// # Errors
    ///
    /// [`DafoError`](crate::errors::DafoError) is returned when the scale of the resulting
    /// automaton exceeds the `u32` address space.
    ///
    /// # Examples
    ///
    /// ```
    /// use dafo::FactorOracle;
    ///
    /// let oracle = FactorOracle::new("abracatabra").unwrap();
    ///
    /// assert!(oracle.is_factor("cat"));
    /// ```
    pub fn new<T>(text: T) -> Result<Self>
    where
        T: AsRef<[u8]>,
    {
        FactorOracleBuilder::new().build(text)
    }

    /// Checks if the given pattern is recognized as a factor of the indexed text.
    ///
    /// Every substring of the text is accepted, including the empty one. The oracle may
    /// additionally accept a bounded number of non-substrings; patterns containing a byte
    /// absent from the text always reject.
    ///
    /// # Arguments
    ///
    /// * `pattern` - Byte sequence to test.
    ///
    /// # Examples
    ///
    /// ```
    /// use dafo::FactorOracle;
    ///
    /// let oracle = FactorOracle::new("abracatabra").unwrap();
    ///
    /// assert!(oracle.is_factor("tabra"));
    /// assert!(!oracle.is_factor("catx"));
    /// ```
    pub fn is_factor<P>(&self, pattern: P) -> bool
    where
        P: AsRef<[u8]>,
    {
        let mut acceptor = self.acceptor();
        pattern.as_ref().iter().all(|&c| acceptor.feed(c))
    }

    /// Creates a cursor that consumes a query byte by byte, starting at the initial state.
    ///
    /// # Examples
    ///
    /// ```
    /// use dafo::FactorOracle;
    ///
    /// let oracle = FactorOracle::new("abracatabra").unwrap();
    ///
    /// let mut acceptor = oracle.acceptor();
    /// assert!(acceptor.feed(b'b'));
    /// assert!(acceptor.feed(b'r'));
    /// assert!(acceptor.feed(b'a'));
    /// assert!(!acceptor.feed(b'z'));
    /// ```
    #[must_use]
    pub const fn acceptor(&self) -> Acceptor<'_> {
        Acceptor {
            oracle: self,
            state_id: Some(ROOT_STATE_ID),
        }
    }

    /// Returns the length of the indexed text in bytes.
    #[must_use]
    pub const fn text_len(&self) -> u32 {
        self.text_len
    }

    /// Returns the total number of states, i.e., the text length plus one.
    ///
    /// # Examples
    ///
    /// ```
    /// use dafo::FactorOracle;
    ///
    /// let oracle = FactorOracle::new("abracatabra").unwrap();
    ///
    /// assert_eq!(oracle.num_states(), 12);
    /// ```
    #[must_use]
    pub const fn num_states(&self) -> u32 {
        self.text_len + 1
    }

    /// Returns the total amount of heap used by this automaton in bytes.
    #[must_use]
    pub fn heap_bytes(&self) -> usize {
        self.states.len() * mem::size_of::<State>()
    }

    /// Returns the state reached from `state_id` with byte `c`, or [`None`] if no
    /// transition is defined.
    #[inline(always)]
    fn next_state(&self, state_id: u32, c: u8) -> Option<u32> {
        // Spine edges are located positionally and need no table lookup.
        if state_id < self.text_len {
            let spine_id = state_id + 1;
            if self.states[usize::from_u32(spine_id)].check() == c {
                return Some(spine_id);
            }
        }
        let base = self.states[usize::from_u32(state_id)].base()?;
        let slot_idx = base ^ u32::from(c);
        let dest_id = self.states.get(usize::from_u32(slot_idx))?.next()?;
        // All table edges point forward; stale or aliased slots never do so with a
        // matching check byte.
        (dest_id > state_id && self.states[usize::from_u32(dest_id)].check() == c)
            .then_some(dest_id)
    }
}

/// Stateful query cursor created by [`FactorOracle::acceptor()`].
///
/// The cursor starts at the initial state and applies one transition per fed byte. Once a
/// byte cannot be consumed, the cursor goes dead and all further feeds fail.
pub struct Acceptor<'a> {
    oracle: &'a FactorOracle,
    state_id: Option<u32>,
}

impl Acceptor<'_> {
    /// Consumes one byte, returning `true` if the prefix fed so far is still recognized.
    #[inline(always)]
    pub fn feed(&mut self, c: u8) -> bool {
        if let Some(state_id) = self.state_id {
            self.state_id = self.oracle.next_state(state_id, c);
        }
        self.state_id.is_some()
    }

    /// Checks if the cursor can still consume bytes.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.state_id.is_some()
    }

    /// Returns the current state id, or [`None`] if the cursor is dead.
    #[must_use]
    pub const fn state_id(&self) -> Option<u32> {
        self.state_id
    }

    /// Moves the cursor back to the initial state.
    pub fn reset(&mut self) {
        self.state_id = Some(ROOT_STATE_ID);
    }
}

/// One cell of the shared double-array table.
///
/// Each cell index plays two independent roles: as a *state*, it carries the `base` offset
/// of the state's out-edges and the `check` byte consumed to reach the state from its spine
/// predecessor; as a *slot*, it carries the `next` destination of the transition stored at
/// this table address. The two roles never interfere because states are addressed by
/// construction order while slots are addressed by `base ^ label`.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub(crate) struct State {
    base: u32,
    next: u32,
    check: u8,
}

impl Default for State {
    fn default() -> Self {
        Self {
            base: BASE_INVALID,
            next: NEXT_INVALID,
            check: 0,
        }
    }
}

impl State {
    #[inline(always)]
    pub(crate) const fn base(&self) -> Option<u32> {
        if self.base == BASE_INVALID {
            None
        } else {
            Some(self.base)
        }
    }

    #[inline(always)]
    pub(crate) const fn check(&self) -> u8 {
        self.check
    }

    #[inline(always)]
    pub(crate) const fn next(&self) -> Option<u32> {
        if self.next == NEXT_INVALID {
            None
        } else {
            Some(self.next)
        }
    }

    #[inline(always)]
    pub(crate) fn set_base(&mut self, x: u32) {
        self.base = x;
    }

    #[inline(always)]
    pub(crate) fn set_check(&mut self, x: u8) {
        self.check = x;
    }

    #[inline(always)]
    pub(crate) fn set_next(&mut self, x: u32) {
        self.next = x;
    }
}

impl core::fmt::Debug for State {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("State")
            .field("base", &self.base())
            .field("check", &self.check())
            .field("next", &self.next())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_substrings(text: &[u8]) -> Vec<&[u8]> {
        let mut subs = vec![];
        for i in 0..=text.len() {
            for j in i..=text.len() {
                subs.push(&text[i..j]);
            }
        }
        subs
    }

    #[test]
    fn test_empty_text() {
        let oracle = FactorOracle::new("").unwrap();
        assert_eq!(oracle.num_states(), 1);
        assert!(oracle.is_factor(""));
        assert!(!oracle.is_factor("a"));
    }

    #[test]
    fn test_fixed_scenarios() {
        let oracle = FactorOracle::new("abbbabaaab").unwrap();
        assert!(oracle.is_factor("abbb"));
        assert!(oracle.is_factor("aaab"));
        assert!(oracle.is_factor("abbbab"));
        assert!(oracle.is_factor("bab"));
        assert!(oracle.is_factor("abba"));
        assert!(oracle.is_factor("aba"));
    }

    #[test]
    fn test_all_substrings_accepted() {
        let texts: &[&[u8]] = &[
            b"abracatabra",
            b"abbbabaaab",
            b"aaaaaaaaaa",
            b"abcdefghij",
            b"mississippi",
        ];
        for &text in texts {
            let oracle = FactorOracle::new(text).unwrap();
            for sub in all_substrings(text) {
                assert!(oracle.is_factor(sub), "text={text:?} sub={sub:?}");
            }
        }
    }

    #[test]
    fn test_foreign_byte_rejects() {
        let oracle = FactorOracle::new("abracatabra").unwrap();
        assert!(!oracle.is_factor("xyz"));

        // The first byte already fails.
        let mut acceptor = oracle.acceptor();
        assert!(!acceptor.feed(b'x'));
        assert!(!acceptor.is_alive());
    }

    #[test]
    fn test_spine_traversal() {
        let text = b"abracatabra";
        let oracle = FactorOracle::new(text).unwrap();
        let mut state_id = ROOT_STATE_ID;
        for (i, &c) in text.iter().enumerate() {
            state_id = oracle.next_state(state_id, c).unwrap();
            assert_eq!(state_id, u32::try_from(i).unwrap() + 1);
        }
    }

    #[test]
    fn test_queries_do_not_mutate() {
        let oracle = FactorOracle::new("abracatabra").unwrap();
        for _ in 0..2 {
            assert!(oracle.is_factor("abra"));
            assert!(!oracle.is_factor("abraq"));
        }
    }

    #[test]
    fn test_deterministic_build() {
        let a = FactorOracle::new("abbbabaaab").unwrap();
        let b = FactorOracle::new("abbbabaaab").unwrap();
        assert_eq!(a.states, b.states);
        assert_eq!(a.text_len, b.text_len);
    }

    #[test]
    fn test_acceptor_reset() {
        let oracle = FactorOracle::new("abracatabra").unwrap();
        let mut acceptor = oracle.acceptor();
        assert!(!acceptor.feed(b'z'));
        acceptor.reset();
        assert_eq!(acceptor.state_id(), Some(ROOT_STATE_ID));
        assert!(acceptor.feed(b'c'));
        assert!(acceptor.feed(b'a'));
        assert!(acceptor.feed(b't'));
    }
}
