//! Book structure: chapters, sections, and their numbering.
//!
//! One input section (a user-authored grouping) is materialized as four
//! category sections with consecutive numbers:
//!
//! ```text
//! input section k  →  sections 4(k-1)+1 .. 4(k-1)+4
//!                     Symbols, VarHyp, Syntax, Logic
//! ```
//!
//! Section numbers keep counting across chapter boundaries and are never
//! reused.

use crate::declaration::{Declaration, SectionAddress};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Title given to chapters and sections synthesized without a header.
pub const DEFAULT_TITLE: &str = "(untitled)";

/// Number of category sections making up one input section.
pub const SECTION_CATEGORIES: u32 = 4;

/// Content category of a section; the discriminant is the category code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionCategory {
    /// Constant and variable symbols.
    Symbols = 1,
    VarHyp = 2,
    Syntax = 3,
    /// Theorems, logic axioms, and logical hypotheses.
    Logic = 4,
}

impl SectionCategory {
    /// Categories in section-number order.
    pub const ALL: [SectionCategory; 4] = [
        SectionCategory::Symbols,
        SectionCategory::VarHyp,
        SectionCategory::Syntax,
        SectionCategory::Logic,
    ];

    /// Category code (1..=4).
    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SectionCategory::Symbols => "symbols",
            SectionCategory::VarHyp => "varHyp",
            SectionCategory::Syntax => "syntax",
            SectionCategory::Logic => "logic",
        }
    }
}

impl fmt::Display for SectionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Global 1-based section number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SectionNbr(u32);

impl SectionNbr {
    /// Returns `None` for 0, which is never a valid section number.
    pub fn new(nbr: u32) -> Option<Self> {
        (nbr > 0).then_some(Self(nbr))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// `((n - 1) mod 4) + 1`, as a category.
    pub fn category(self) -> SectionCategory {
        match (self.0 - 1) % SECTION_CATEGORIES {
            0 => SectionCategory::Symbols,
            1 => SectionCategory::VarHyp,
            2 => SectionCategory::Syntax,
            _ => SectionCategory::Logic,
        }
    }

    /// The input section this category section belongs to.
    pub fn input_section(self) -> InputSectionNbr {
        InputSectionNbr((self.0 - 1) / SECTION_CATEGORIES + 1)
    }

    /// The sibling section of `category` within the same input section.
    ///
    /// `None` when that sibling is past `u32::MAX`, which only happens in
    /// the last input section representable.
    pub fn with_category(self, category: SectionCategory) -> Option<SectionNbr> {
        let symbols = self.0 - (self.0 - 1) % SECTION_CATEGORIES;
        symbols.checked_add(category.code() - 1).map(Self)
    }

    /// 0-based position in the section list.
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl fmt::Display for SectionNbr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 1-based number of an input section (a quartet of category sections).
///
/// Dependency matrices at section granularity are indexed by
/// [`InputSectionNbr::row`], i.e. input section `k` is row `k - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct InputSectionNbr(u32);

impl InputSectionNbr {
    pub fn new(nbr: u32) -> Option<Self> {
        (nbr > 0).then_some(Self(nbr))
    }

    pub fn from_row(row: usize) -> Self {
        Self(row as u32 + 1)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn row(self) -> usize {
        (self.0 - 1) as usize
    }

    pub fn first_section(self) -> SectionNbr {
        SectionNbr((self.0 - 1) * SECTION_CATEGORIES + 1)
    }

    pub fn section(self, category: SectionCategory) -> SectionNbr {
        SectionNbr((self.0 - 1) * SECTION_CATEGORIES + category.code())
    }
}

impl fmt::Display for InputSectionNbr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Global 1-based chapter number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ChapterNbr(u32);

impl ChapterNbr {
    pub fn new(nbr: u32) -> Option<Self> {
        (nbr > 0).then_some(Self(nbr))
    }

    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32 + 1)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl fmt::Display for ChapterNbr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A titled run of consecutive input sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    nbr: ChapterNbr,
    title: String,
    first_section: SectionNbr,
    last_section: SectionNbr,
}

impl Chapter {
    pub(crate) fn new(nbr: ChapterNbr, title: String, first_section: SectionNbr) -> Self {
        Self {
            nbr,
            title,
            first_section,
            last_section: first_section,
        }
    }

    pub(crate) fn extend_to(&mut self, last_section: SectionNbr) {
        self.last_section = last_section;
    }

    pub fn nbr(&self) -> ChapterNbr {
        self.nbr
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn first_section(&self) -> SectionNbr {
        self.first_section
    }

    pub fn last_section(&self) -> SectionNbr {
        self.last_section
    }

    pub fn contains_section(&self, nbr: SectionNbr) -> bool {
        self.first_section <= nbr && nbr <= self.last_section
    }

    /// Input sections of this chapter, in order.
    pub fn input_sections(&self) -> impl Iterator<Item = InputSectionNbr> + use<> {
        let first = self.first_section.input_section().get();
        let last = self.last_section.input_section().get();
        (first..=last).map(InputSectionNbr)
    }

    /// Section-matrix rows covered by this chapter.
    pub fn rows(&self) -> Range<usize> {
        self.first_section.input_section().row()..self.last_section.input_section().row() + 1
    }
}

/// One category slot of an input section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    nbr: SectionNbr,
    category: SectionCategory,
    title: String,
    chapter: ChapterNbr,
    last_ordinal: u32,
    min_seq: Option<u64>,
    max_seq: Option<u64>,
}

impl Section {
    pub(crate) fn new(chapter: ChapterNbr, nbr: SectionNbr, title: String) -> Self {
        Self {
            nbr,
            category: nbr.category(),
            title,
            chapter,
            last_ordinal: 0,
            min_seq: None,
            max_seq: None,
        }
    }

    pub fn nbr(&self) -> SectionNbr {
        self.nbr
    }

    pub fn category(&self) -> SectionCategory {
        self.category
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn chapter(&self) -> ChapterNbr {
        self.chapter
    }

    /// Number of declarations placed here; ordinals run `1..=len()`.
    pub fn len(&self) -> u32 {
        self.last_ordinal
    }

    pub fn is_empty(&self) -> bool {
        self.last_ordinal == 0
    }

    /// Smallest and largest member sequence numbers.
    pub fn seq_bounds(&self) -> Option<(u64, u64)> {
        self.min_seq.zip(self.max_seq)
    }

    /// Give `decl` the next ordinal here.
    ///
    /// Returns `None` without touching anything when `decl` already has an
    /// address.
    pub(crate) fn assign(&mut self, decl: &mut Declaration) -> Option<SectionAddress> {
        if decl.address().is_some() {
            return None;
        }

        self.last_ordinal += 1;
        let address = SectionAddress {
            chapter: self.chapter,
            section: self.nbr,
            ordinal: self.last_ordinal,
        };
        decl.set_address(address);

        let seq = decl.seq;
        self.min_seq = Some(self.min_seq.map_or(seq, |min| min.min(seq)));
        self.max_seq = Some(self.max_seq.map_or(seq, |max| max.max(seq)));
        Some(address)
    }
}

/// Merge optional `(min, max)` seq pairs; `None` contributes nothing.
pub fn merge_bounds(
    acc: Option<(u64, u64)>,
    next: Option<(u64, u64)>,
) -> Option<(u64, u64)> {
    match (acc, next) {
        (Some((lo, hi)), Some((next_lo, next_hi))) => Some((lo.min(next_lo), hi.max(next_hi))),
        (acc, None) => acc,
        (None, next) => next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::DeclKind;

    #[test]
    fn category_cycles_every_four_sections() {
        let categories: Vec<_> = (1..=8)
            .map(|n| SectionNbr::new(n).expect("nonzero").category())
            .collect();
        assert_eq!(
            categories,
            [SectionCategory::ALL, SectionCategory::ALL].concat()
        );
    }

    #[test]
    fn with_category_stays_in_input_section() {
        let syntax = SectionNbr::new(7).expect("nonzero");
        assert_eq!(syntax.category(), SectionCategory::Syntax);
        assert_eq!(syntax.with_category(SectionCategory::Logic), SectionNbr::new(8));
        assert_eq!(syntax.with_category(SectionCategory::Symbols), SectionNbr::new(5));
        assert_eq!(syntax.input_section().get(), 2);
        assert_eq!(syntax.input_section().row(), 1);
    }

    #[test]
    fn with_category_does_not_wrap_at_the_top() {
        let top = SectionNbr::new(u32::MAX).expect("nonzero");
        assert_eq!(top.category(), SectionCategory::Syntax);
        assert_eq!(top.with_category(SectionCategory::Logic), None);
        assert_eq!(top.with_category(SectionCategory::Symbols), SectionNbr::new(u32::MAX - 2));
    }

    #[test]
    fn merge_bounds_skips_empty_sections() {
        let merged = [None, Some((20, 40)), None, Some((10, 30))]
            .into_iter()
            .fold(None, merge_bounds);
        assert_eq!(merged, Some((10, 40)));
        assert_eq!([None, None].into_iter().fold(None, merge_bounds), None);
    }

    #[test]
    fn zero_is_not_a_number() {
        assert!(SectionNbr::new(0).is_none());
        assert!(ChapterNbr::new(0).is_none());
        assert!(InputSectionNbr::new(0).is_none());
    }

    #[test]
    fn assign_tracks_ordinals_and_seq_bounds() {
        let chapter = ChapterNbr::new(1).expect("nonzero");
        let mut section = Section::new(chapter, SectionNbr::new(4).expect("nonzero"), "T".into());

        let mut late = Declaration::new(30, "th2", DeclKind::Theorem, "|-");
        let mut early = Declaration::new(10, "th1", DeclKind::Theorem, "|-");

        let first = section.assign(&mut late).expect("first assignment");
        let second = section.assign(&mut early).expect("second assignment");
        assert_eq!(first.ordinal, 1);
        assert_eq!(second.ordinal, 2);
        assert_eq!(section.seq_bounds(), Some((10, 30)));

        assert!(section.assign(&mut early).is_none());
        assert_eq!(section.len(), 2);
    }

    #[test]
    fn chapter_rows_cover_its_input_sections() {
        let mut chapter = Chapter::new(
            ChapterNbr::new(2).expect("nonzero"),
            "Sets".into(),
            SectionNbr::new(9).expect("nonzero"),
        );
        chapter.extend_to(SectionNbr::new(16).expect("nonzero"));

        assert_eq!(chapter.rows(), 2..4);
        let input: Vec<u32> = chapter.input_sections().map(InputSectionNbr::get).collect();
        assert_eq!(input, vec![3, 4]);
        assert!(chapter.contains_section(SectionNbr::new(12).expect("nonzero")));
        assert!(!chapter.contains_section(SectionNbr::new(17).expect("nonzero")));
    }
}
