use fixedbitset::FixedBitSet;

use crate::errors::{DafoError, Result};
use crate::oracle::{FactorOracle, State, NEXT_INVALID, ROOT_STATE_ID};
use crate::utils::FromU32;

// The length of each double-array block.
const BLOCK_LEN: u32 = 256;
// Nil marker for longest-repeated-suffix pointers.
const STATE_INVALID: u32 = u32::MAX;

// Free-list links of one table cell. The list is circular and doubly linked, and all links
// are plain indices into the shared table.
#[derive(Clone, Copy, Default)]
struct Extra {
    next: u32,
    prev: u32,
}

impl Extra {
    #[inline(always)]
    const fn get_next(&self) -> u32 {
        self.next
    }

    #[inline(always)]
    const fn get_prev(&self) -> u32 {
        self.prev
    }

    #[inline(always)]
    fn set_next(&mut self, x: u32) {
        self.next = x;
    }

    #[inline(always)]
    fn set_prev(&mut self, x: u32) {
        self.prev = x;
    }
}

/// Builder of [`FactorOracle`].
///
/// The builder runs the online factor-oracle construction: it appends one spine state per
/// text byte and chases longest-repeated-suffix pointers backwards, inserting factor edges
/// into the shared double-array table. Vacant table slots are managed in a circular doubly
/// linked free list; when an edge insertion collides with an occupied slot, all out-edges of
/// the colliding state are relocated to a fresh BASE found by scanning that list.
pub struct FactorOracleBuilder {
    states: Vec<State>,
    extras: Vec<Extra>,
    used_bases: FixedBitSet,
    used_indices: FixedBitSet,
    head_idx: Option<u32>,
    text_len: u32,
}

impl Default for FactorOracleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FactorOracleBuilder {
    /// Creates a new [`FactorOracleBuilder`].
    ///
    /// # Examples
    ///
    /// ```
    /// use dafo::FactorOracleBuilder;
    ///
    /// let oracle = FactorOracleBuilder::new().build("abracatabra").unwrap();
    ///
    /// assert!(oracle.is_factor("acat"));
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self {
            states: vec![],
            extras: vec![],
            used_bases: FixedBitSet::new(),
            used_indices: FixedBitSet::new(),
            head_idx: None,
            text_len: 0,
        }
    }

    /// Builds and returns a new [`FactorOracle`] over the given text, consuming the builder.
    ///
    /// # Arguments
    ///
    /// * `text` - Byte sequence to index. The empty text is valid and yields a single-state
    ///   oracle accepting only the empty query.
    ///
    /// # Errors
    ///
    /// [`DafoError`] is returned when the scale of the resulting automaton exceeds the
    /// `u32` address space.
    ///
    /// # Examples
    ///
    /// ```
    /// use dafo::FactorOracleBuilder;
    ///
    /// let oracle = FactorOracleBuilder::new().build("abbbabaaab").unwrap();
    ///
    /// assert!(oracle.is_factor("bbab"));
    /// ```
    pub fn build<T>(mut self, text: T) -> Result<FactorOracle>
    where
        T: AsRef<[u8]>,
    {
        let text = text.as_ref();
        self.text_len = u32::try_from(text.len())
            .ok()
            .filter(|&n| n < u32::MAX - BLOCK_LEN)
            .ok_or(DafoError::automaton_scale("text.len()", u32::MAX - BLOCK_LEN))?;

        self.extend_array()?;

        // Longest-repeated-suffix pointers. One slot per state, used only while building
        // and discarded afterwards; STATE_INVALID is the nil pointer of the root.
        let mut lrs = vec![STATE_INVALID; text.len() + 1];

        for (i, &c) in text.iter().enumerate() {
            let new_state_id = u32::try_from(i).unwrap() + 1;
            if usize::from_u32(new_state_id) >= self.states.len() {
                self.extend_array()?;
            }
            self.states[usize::from_u32(new_state_id)].set_check(c);

            let mut k = lrs[i];
            let suffix_id = loop {
                if k == STATE_INVALID {
                    break ROOT_STATE_ID;
                }
                if let Some(dest_id) = self.transition(k, c) {
                    break dest_id;
                }
                self.insert_transition(k, new_state_id)?;
                k = lrs[usize::from_u32(k)];
            };
            lrs[usize::from_u32(new_state_id)] = suffix_id;
        }

        Ok(self.freeze())
    }

    /// Returns the state reached from `state_id` with byte `c`, or [`None`] if the
    /// transition has not been inserted yet.
    #[inline(always)]
    fn transition(&self, state_id: u32, c: u8) -> Option<u32> {
        let spine_id = state_id + 1;
        if self.states[usize::from_u32(spine_id)].check() == c {
            return Some(spine_id);
        }
        let base = self.states[usize::from_u32(state_id)].base()?;
        let slot_idx = base ^ u32::from(c);
        if !self.used_indices.contains(usize::from_u32(slot_idx)) {
            return None;
        }
        let dest_id = self.states[usize::from_u32(slot_idx)].next()?;
        (self.states[usize::from_u32(dest_id)].check() == c).then_some(dest_id)
    }

    /// Inserts the edge `state_id -> dest_id` labeled with the check byte of `dest_id`.
    fn insert_transition(&mut self, state_id: u32, dest_id: u32) -> Result<()> {
        let c = self.states[usize::from_u32(dest_id)].check();
        let Some(base) = self.states[usize::from_u32(state_id)].base() else {
            // The first table edge of this state.
            let base = self.find_base(&[c])?;
            self.states[usize::from_u32(state_id)].set_base(base);
            self.used_bases.insert(usize::from_u32(base));
            self.occupy_slot(base ^ u32::from(c), dest_id);
            return Ok(());
        };
        let slot_idx = base ^ u32::from(c);
        if self.used_indices.contains(usize::from_u32(slot_idx)) {
            self.relocate(state_id, base, c, dest_id)?;
        } else {
            self.occupy_slot(slot_idx, dest_id);
        }
        Ok(())
    }

    /// Moves all out-edges of the state to a fresh BASE that also admits the new label `c`.
    fn relocate(&mut self, state_id: u32, base: u32, c: u8, dest_id: u32) -> Result<()> {
        let mut labels = self.edge_labels(base);
        labels.push(c);

        let new_base = self.find_base(&labels)?;
        self.used_bases.set(usize::from_u32(base), false);
        self.used_bases.insert(usize::from_u32(new_base));

        // The new slots were all vacant when the BASE was found, so they are disjoint from
        // the old (occupied) slots and the edges can be moved one at a time.
        for &label in &labels[..labels.len() - 1] {
            let old_slot_idx = base ^ u32::from(label);
            let edge_dest_id = self.states[usize::from_u32(old_slot_idx)].next().unwrap();
            self.vacate_slot(old_slot_idx);
            self.occupy_slot(new_base ^ u32::from(label), edge_dest_id);
        }
        self.occupy_slot(new_base ^ u32::from(c), dest_id);
        self.states[usize::from_u32(state_id)].set_base(new_base);
        Ok(())
    }

    /// Collects the labels of all table out-edges addressed under the given BASE.
    ///
    /// Live states never share a BASE, so an occupied slot whose destination carries a
    /// matching check byte necessarily belongs to the state owning this BASE.
    fn edge_labels(&self, base: u32) -> Vec<u8> {
        let mut labels = vec![];
        for c in 0..=u8::MAX {
            let slot_idx = base ^ u32::from(c);
            if !self.used_indices.contains(usize::from_u32(slot_idx)) {
                continue;
            }
            if let Some(dest_id) = self.states[usize::from_u32(slot_idx)].next() {
                if self.states[usize::from_u32(dest_id)].check() == c {
                    labels.push(c);
                }
            }
        }
        labels
    }

    /// Searches for an unused BASE under which all the given labels address vacant slots,
    /// extending the table block by block until one is found.
    fn find_base(&mut self, labels: &[u8]) -> Result<u32> {
        debug_assert!(!labels.is_empty());
        let mut start_idx = self.head_idx;
        loop {
            if let Some(base) = self.scan_bases(start_idx, labels) {
                return Ok(base);
            }
            // A fresh block always admits a BASE: all of its slots are vacant, and label
            // offsets only flip the low byte, so they stay inside the 256-aligned block.
            start_idx = Some(u32::try_from(self.states.len()).unwrap());
            self.extend_array()?;
        }
    }

    /// Visits free slots in list order from `start_idx` and proposes a BASE per slot.
    fn scan_bases(&self, start_idx: Option<u32>, labels: &[u8]) -> Option<u32> {
        let start_idx = start_idx?;
        let mut idx = start_idx;
        loop {
            debug_assert!(!self.used_indices.contains(usize::from_u32(idx)));
            let base = idx ^ u32::from(labels[0]);
            if self.check_valid_base(base, labels) {
                return Some(base);
            }
            idx = self.extras[usize::from_u32(idx)].get_next();
            if idx == start_idx {
                return None;
            }
        }
    }

    #[inline(always)]
    fn check_valid_base(&self, base: u32, labels: &[u8]) -> bool {
        if self.used_bases.contains(usize::from_u32(base)) {
            return false;
        }
        for &c in labels {
            let slot_idx = base ^ u32::from(c);
            if self.used_indices.contains(usize::from_u32(slot_idx)) {
                return false;
            }
        }
        true
    }

    /// Claims a vacant slot for a live transition, unlinking it from the free list.
    #[inline(always)]
    fn occupy_slot(&mut self, slot_idx: u32, dest_id: u32) {
        debug_assert!(!self.used_indices.contains(usize::from_u32(slot_idx)));

        let next = self.extras[usize::from_u32(slot_idx)].get_next();
        let prev = self.extras[usize::from_u32(slot_idx)].get_prev();
        self.extras[usize::from_u32(prev)].set_next(next);
        self.extras[usize::from_u32(next)].set_prev(prev);

        if self.head_idx == Some(slot_idx) {
            self.head_idx = Some(next).filter(|&x| x != slot_idx);
        }

        self.used_indices.insert(usize::from_u32(slot_idx));
        self.states[usize::from_u32(slot_idx)].set_next(dest_id);
    }

    /// Releases an occupied slot, re-linking it immediately before the list front.
    #[inline(always)]
    fn vacate_slot(&mut self, slot_idx: u32) {
        debug_assert!(self.used_indices.contains(usize::from_u32(slot_idx)));

        self.used_indices.set(usize::from_u32(slot_idx), false);

        if let Some(head_idx) = self.head_idx {
            let tail_idx = self.extras[usize::from_u32(head_idx)].get_prev();
            self.extras[usize::from_u32(slot_idx)].set_prev(tail_idx);
            self.extras[usize::from_u32(slot_idx)].set_next(head_idx);
            self.extras[usize::from_u32(tail_idx)].set_next(slot_idx);
            self.extras[usize::from_u32(head_idx)].set_prev(slot_idx);
        } else {
            self.extras[usize::from_u32(slot_idx)].set_prev(slot_idx);
            self.extras[usize::from_u32(slot_idx)].set_next(slot_idx);
            self.head_idx = Some(slot_idx);
        }
    }

    /// Appends one block of vacant slots, splicing it into the free list as a circular
    /// sub-list and growing the membership sets in lock-step.
    fn extend_array(&mut self) -> Result<()> {
        let old_len = u32::try_from(self.states.len()).unwrap();
        if old_len > u32::MAX - BLOCK_LEN {
            return Err(DafoError::automaton_scale("states.len()", u32::MAX));
        }
        let new_len = old_len + BLOCK_LEN;

        self.states
            .resize(usize::from_u32(new_len), State::default());
        self.extras
            .resize(usize::from_u32(new_len), Extra::default());
        self.used_bases.grow(usize::from_u32(new_len));
        self.used_indices.grow(usize::from_u32(new_len));

        for idx in old_len..new_len {
            self.extras[usize::from_u32(idx)].set_next(idx + 1);
            self.extras[usize::from_u32(idx)].set_prev(idx.wrapping_sub(1));
        }

        if let Some(head_idx) = self.head_idx {
            let tail_idx = self.extras[usize::from_u32(head_idx)].get_prev();
            self.extras[usize::from_u32(old_len)].set_prev(tail_idx);
            self.extras[usize::from_u32(tail_idx)].set_next(old_len);
            self.extras[usize::from_u32(new_len - 1)].set_next(head_idx);
            self.extras[usize::from_u32(head_idx)].set_prev(new_len - 1);
        } else {
            self.extras[usize::from_u32(old_len)].set_prev(new_len - 1);
            self.extras[usize::from_u32(new_len - 1)].set_next(old_len);
            self.head_idx = Some(old_len);
        }

        Ok(())
    }

    /// Freezes the table into an immutable [`FactorOracle`], moving the arrays out of the
    /// builder. Slots that hold no live transition are normalized so that they never read
    /// as one.
    fn freeze(mut self) -> FactorOracle {
        for idx in 0..self.states.len() {
            if !self.used_indices.contains(idx) {
                self.states[idx].set_next(NEXT_INVALID);
            }
        }
        self.states.shrink_to_fit();
        FactorOracle {
            states: self.states,
            text_len: self.text_len,
        }
    }
}
