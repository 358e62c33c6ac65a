//! Growable bitsets and the bitset-per-row dependency matrix.

use serde::{Serialize, Serializer};
use std::hash::{Hash, Hasher};
use std::ops::Range;

const WORD_BITS: usize = 64;

/// Dense bitset of 0-based row indexes.
///
/// Equality and hashing ignore trailing zero words, so sets grown by
/// different paths compare by membership.
#[derive(Debug, Clone, Default)]
pub struct SectionSet {
    words: Vec<u64>,
}

impl SectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty set with room for indexes below `bits`.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            words: Vec::with_capacity(bits.div_ceil(WORD_BITS)),
        }
    }

    /// Set containing only `index`.
    pub fn singleton(index: usize) -> Self {
        let mut set = Self::with_capacity(index + 1);
        set.insert(index);
        set
    }

    /// Returns whether the bit was newly set.
    pub fn insert(&mut self, index: usize) -> bool {
        let (word, mask) = locate(index);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        let fresh = self.words[word] & mask == 0;
        self.words[word] |= mask;
        fresh
    }

    pub fn contains(&self, index: usize) -> bool {
        let (word, mask) = locate(index);
        self.words.get(word).is_some_and(|w| w & mask != 0)
    }

    /// OR `other` into `self`; returns whether anything changed.
    pub fn union_with(&mut self, other: &SectionSet) -> bool {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        let mut changed = false;
        for (mine, theirs) in self.words.iter_mut().zip(&other.words) {
            let merged = *mine | theirs;
            changed |= merged != *mine;
            *mine = merged;
        }
        changed
    }

    pub fn is_subset(&self, other: &SectionSet) -> bool {
        self.words.iter().enumerate().all(|(i, word)| {
            let theirs = other.words.get(i).copied().unwrap_or(0);
            word & !theirs == 0
        })
    }

    /// First set index at or after `from`.
    pub fn next_set_bit(&self, from: usize) -> Option<usize> {
        let (mut word, _) = locate(from);
        let mut bits = self.words.get(word)? & (!0u64 << (from % WORD_BITS));
        loop {
            if bits != 0 {
                return Some(word * WORD_BITS + bits.trailing_zeros() as usize);
            }
            word += 1;
            bits = *self.words.get(word)?;
        }
    }

    /// Whether any index in `range` is set.
    pub fn intersects_range(&self, range: Range<usize>) -> bool {
        self.next_set_bit(range.start)
            .is_some_and(|index| index < range.end)
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// Set indexes in increasing order.
    pub fn iter(&self) -> SetBits<'_> {
        SetBits {
            words: &self.words,
            word: 0,
            bits: self.words.first().copied().unwrap_or(0),
        }
    }

    fn significant_words(&self) -> &[u64] {
        let len = self
            .words
            .iter()
            .rposition(|word| *word != 0)
            .map_or(0, |last| last + 1);
        &self.words[..len]
    }
}

impl PartialEq for SectionSet {
    fn eq(&self, other: &Self) -> bool {
        self.significant_words() == other.significant_words()
    }
}

impl Eq for SectionSet {}

impl Hash for SectionSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant_words().hash(state);
    }
}

fn locate(index: usize) -> (usize, u64) {
    (index / WORD_BITS, 1u64 << (index % WORD_BITS))
}

impl FromIterator<usize> for SectionSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = SectionSet::new();
        for index in iter {
            set.insert(index);
        }
        set
    }
}

impl<'a> IntoIterator for &'a SectionSet {
    type Item = usize;
    type IntoIter = SetBits<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Serialized as the sorted list of set indexes.
impl Serialize for SectionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// Iterator over the set bits of a [`SectionSet`].
#[derive(Debug, Clone)]
pub struct SetBits<'a> {
    words: &'a [u64],
    word: usize,
    bits: u64,
}

impl Iterator for SetBits<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.bits == 0 {
            self.word += 1;
            self.bits = *self.words.get(self.word)?;
        }
        let offset = self.bits.trailing_zeros() as usize;
        self.bits &= self.bits - 1;
        Some(self.word * WORD_BITS + offset)
    }
}

/// One [`SectionSet`] per row: row `i` holds every row `i` depends on.
///
/// Rows are 0-based. At section granularity row `k - 1` is input section
/// `k`; at chapter granularity row `c - 1` is chapter `c`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DependencyMatrix {
    rows: Vec<SectionSet>,
}

impl DependencyMatrix {
    /// `size` empty rows.
    pub fn empty(size: usize) -> Self {
        Self {
            rows: (0..size).map(|_| SectionSet::with_capacity(size)).collect(),
        }
    }

    /// `size` rows, each containing only itself.
    pub fn identity(size: usize) -> Self {
        Self {
            rows: (0..size).map(SectionSet::singleton).collect(),
        }
    }

    pub(crate) fn from_rows(rows: Vec<SectionSet>) -> Self {
        Self { rows }
    }

    pub(crate) fn into_rows(self) -> Vec<SectionSet> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, row: usize) -> Option<&SectionSet> {
        self.rows.get(row)
    }

    /// Whether row `from` depends on row `to`.
    pub fn depends_on(&self, from: usize, to: usize) -> bool {
        self.rows.get(from).is_some_and(|set| set.contains(to))
    }

    /// Record that row `from` depends on row `to`; out-of-range rows are ignored.
    pub fn insert(&mut self, from: usize, to: usize) {
        if let Some(set) = self.rows.get_mut(from) {
            set.insert(to);
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &SectionSet> {
        self.rows.iter()
    }
}
