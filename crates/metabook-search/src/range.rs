//! From/thru section ranges picked by chapter and section search indexes.

use metabook_core::{
    BookError, BookManager, Chapter, DeclId, Declarations, InputSectionNbr, SectionAddress,
    SectionCategory, SectionNbr, merge_bounds,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("chapter index {index} out of range (book has {chapters} chapters)")]
    ChapterIndex { index: usize, chapters: usize },

    #[error("section index {index} out of range for chapter {chapter} ({sections} sections)")]
    SectionIndex {
        chapter: usize,
        index: usize,
        sections: usize,
    },

    #[error("section index {index} given without a chapter")]
    SectionWithoutChapter { index: usize },

    #[error(transparent)]
    Book(#[from] BookError),
}

/// Indexes into [`BookManager::chapter_values_for_search`] and the matching
/// row of [`BookManager::section_values_for_search`]. Index 0 means "any".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RangeSelection {
    pub from_chapter: usize,
    pub from_section: usize,
    pub thru_chapter: usize,
    pub thru_section: usize,
}

impl RangeSelection {
    /// Within one chapter a thru section before the from section resets the
    /// from section to "any".
    pub fn fixed_up(mut self) -> Self {
        if self.from_chapter != 0
            && self.from_chapter == self.thru_chapter
            && self.thru_section != 0
            && self.from_section > self.thru_section
        {
            self.from_section = 0;
        }
        self
    }
}

/// A contiguous run of input sections, with the seq bounds of what it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRange {
    first: InputSectionNbr,
    last: InputSectionNbr,
    seq_bounds: Option<(u64, u64)>,
}

impl SectionRange {
    /// Resolve a selection against the book.
    ///
    /// `Ok(None)` when the range is empty: a disabled or empty book, or a
    /// thru chapter before the from chapter.
    pub fn resolve(
        book: &BookManager,
        selection: RangeSelection,
    ) -> Result<Option<Self>, SearchError> {
        let selection = selection.fixed_up();
        let chapters = book.chapters();

        let from_chapter = chapter_at(chapters, selection.from_chapter)?;
        let thru_chapter = chapter_at(chapters, selection.thru_chapter)?;
        let from = endpoint(
            from_chapter,
            selection.from_chapter,
            selection.from_section,
            End::First,
        )?;
        let thru = endpoint(
            thru_chapter,
            selection.thru_chapter,
            selection.thru_section,
            End::Last,
        )?;

        let count = book.input_section_count() as u32;
        let first = from.or_else(|| InputSectionNbr::new(1));
        let last = thru.or_else(|| InputSectionNbr::new(count));
        let (Some(first), Some(last)) = (first, last) else {
            return Ok(None);
        };
        if first > last {
            return Ok(None);
        }

        let seq_bounds = (first.get()..=last.get())
            .filter_map(InputSectionNbr::new)
            .map(|input| book.section_seq_bounds(input.first_section().get()))
            .fold(None, merge_bounds);

        debug!(
            first = first.get(),
            last = last.get(),
            "resolved section range"
        );
        Ok(Some(Self {
            first,
            last,
            seq_bounds,
        }))
    }

    pub fn first(&self) -> InputSectionNbr {
        self.first
    }

    pub fn last(&self) -> InputSectionNbr {
        self.last
    }

    /// First section number of the range (Symbols of the first input section).
    pub fn first_section(&self) -> SectionNbr {
        self.first.first_section()
    }

    /// Last section number of the range (Logic of the last input section).
    pub fn last_section(&self) -> SectionNbr {
        self.last.section(SectionCategory::Logic)
    }

    /// Smallest and largest seq of any declaration in range.
    pub fn seq_bounds(&self) -> Option<(u64, u64)> {
        self.seq_bounds
    }

    pub fn contains(&self, address: SectionAddress) -> bool {
        let input = address.section.input_section();
        self.first <= input && input <= self.last
    }

    /// Declarations in range, ordered by (section, ordinal).
    pub fn declarations_in_range(
        &self,
        book: &BookManager,
        decls: &Declarations,
    ) -> Result<Vec<DeclId>, SearchError> {
        let grid = book.section_grid(decls)?;
        let ids = (self.first_section().get()..=self.last_section().get())
            .filter_map(SectionNbr::new)
            .flat_map(|nbr| grid.section(nbr).iter().copied())
            .collect();
        Ok(ids)
    }
}

#[derive(Clone, Copy)]
enum End {
    First,
    Last,
}

fn chapter_at(chapters: &[Chapter], index: usize) -> Result<Option<&Chapter>, SearchError> {
    match index {
        0 => Ok(None),
        _ => chapters
            .get(index - 1)
            .map(Some)
            .ok_or(SearchError::ChapterIndex {
                index,
                chapters: chapters.len(),
            }),
    }
}

/// Input section selected at one end of the range; `None` means "any".
fn endpoint(
    chapter: Option<&Chapter>,
    chapter_index: usize,
    section_index: usize,
    end: End,
) -> Result<Option<InputSectionNbr>, SearchError> {
    let Some(chapter) = chapter else {
        return match section_index {
            0 => Ok(None),
            index => Err(SearchError::SectionWithoutChapter { index }),
        };
    };

    let inputs: Vec<InputSectionNbr> = chapter.input_sections().collect();
    let picked = match (section_index, end) {
        (0, End::First) => inputs.first(),
        (0, End::Last) => inputs.last(),
        (index, _) => inputs.get(index - 1),
    };
    picked
        .copied()
        .map(Some)
        .ok_or(SearchError::SectionIndex {
            chapter: chapter_index,
            index: section_index,
            sections: inputs.len(),
        })
}
