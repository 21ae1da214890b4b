//! Growable bitset over non-negative indices.
//!
//! [`BitSet`] is the substrate for both entity existence and the flattened
//! `(entity, slot)` occupancy map. Storage is a vector of `u64` words that
//! grows on demand when a bit is set; reads past the end report a clear bit.
//! Forward scans skip whole words, so walking every set bit in order costs
//! O(words + set bits).

const WORD_BITS: usize = u64::BITS as usize;

/// A growable set of `usize` indices backed by 64-bit words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitSet {
    words: Vec<u64>,
}

impl BitSet {
    /// Create an empty bitset.
    #[must_use]
    pub fn new() -> Self {
        Self { words: Vec::new() }
    }

    /// Create an empty bitset with room for `bits` indices before the first
    /// reallocation.
    #[must_use]
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            words: Vec::with_capacity(bits.div_ceil(WORD_BITS)),
        }
    }

    /// Number of indices addressable without growing.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.words.len() * WORD_BITS
    }

    /// Returns `true` if `index` is in the set.
    #[must_use]
    pub fn get(&self, index: usize) -> bool {
        match self.words.get(index / WORD_BITS) {
            Some(&word) => word & (1u64 << (index % WORD_BITS)) != 0,
            None => false,
        }
    }

    /// Set or clear `index`.
    pub fn set(&mut self, index: usize, value: bool) {
        if value {
            self.insert(index);
        } else {
            self.clear(index);
        }
    }

    /// Add `index` to the set, growing the backing storage if needed.
    pub fn insert(&mut self, index: usize) {
        let word = index / WORD_BITS;
        if word >= self.words.len() {
            self.grow(word + 1);
        }
        self.words[word] |= 1u64 << (index % WORD_BITS);
    }

    /// Remove `index` from the set. Indices past the end are already clear.
    pub fn clear(&mut self, index: usize) {
        if let Some(word) = self.words.get_mut(index / WORD_BITS) {
            *word &= !(1u64 << (index % WORD_BITS));
        }
    }

    /// Remove every index, keeping the allocation.
    pub fn reset(&mut self) {
        self.words.iter_mut().for_each(|w| *w = 0);
    }

    /// Returns `true` if no index is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Smallest set index `>= from`, if any.
    #[must_use]
    pub fn next_set_bit(&self, from: usize) -> Option<usize> {
        let mut word_index = from / WORD_BITS;
        let mut word = *self.words.get(word_index)? & (!0u64 << (from % WORD_BITS));
        loop {
            if word != 0 {
                return Some(word_index * WORD_BITS + word.trailing_zeros() as usize);
            }
            word_index += 1;
            word = *self.words.get(word_index)?;
        }
    }

    /// Smallest clear index `>= from`. Always exists since the set is
    /// unbounded.
    #[must_use]
    pub fn next_clear_bit(&self, from: usize) -> usize {
        let mut word_index = from / WORD_BITS;
        let Some(&first) = self.words.get(word_index) else {
            return from;
        };
        let mut free = !first & (!0u64 << (from % WORD_BITS));
        loop {
            if free != 0 {
                return word_index * WORD_BITS + free.trailing_zeros() as usize;
            }
            word_index += 1;
            match self.words.get(word_index) {
                Some(&word) => free = !word,
                None => return word_index * WORD_BITS,
            }
        }
    }

    /// Number of set indices.
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Number of set indices in `start..end`.
    #[must_use]
    pub fn count_ones_in(&self, start: usize, end: usize) -> usize {
        if start >= end {
            return 0;
        }
        let first = start / WORD_BITS;
        let last = (end - 1) / WORD_BITS;
        let mut total = 0;
        for word_index in first..=last {
            let Some(&word) = self.words.get(word_index) else {
                break;
            };
            let mut mask = !0u64;
            if word_index == first {
                mask &= !0u64 << (start % WORD_BITS);
            }
            if word_index == last {
                let used = end - last * WORD_BITS;
                if used < WORD_BITS {
                    mask &= (1u64 << used) - 1;
                }
            }
            total += (word & mask).count_ones() as usize;
        }
        total
    }

    /// Iterate set indices in increasing order.
    #[must_use]
    pub fn ones(&self) -> Ones<'_> {
        Ones {
            set: self,
            next: 0,
        }
    }

    fn grow(&mut self, min_words: usize) {
        let target = min_words.max(self.words.len() * 2);
        self.words.resize(target, 0);
    }
}

impl FromIterator<usize> for BitSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = BitSet::new();
        for index in iter {
            set.insert(index);
        }
        set
    }
}

/// Iterator over the set indices of a [`BitSet`], in increasing order.
#[derive(Debug, Clone)]
pub struct Ones<'a> {
    set: &'a BitSet,
    next: usize,
}

impl Iterator for Ones<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let index = self.set.next_set_bit(self.next)?;
        self.next = index + 1;
        Some(index)
    }
}
