//! Streaming numbering state.
//!
//! Chapter and section headers only record pending titles. The next
//! declaration materializes them: [`NumberingState::advance`] decides whether
//! a new chapter, a new input section, or the current input section receives
//! it, and the book applies that step and reports the new cursor back with
//! [`NumberingState::enter`].

use crate::book::{ChapterNbr, DEFAULT_TITLE, InputSectionNbr};

/// The chapter and input section currently open for declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub chapter: ChapterNbr,
    pub input_section: InputSectionNbr,
}

/// What the next declaration requires before it can be filed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    NewChapter {
        chapter_title: String,
        section_title: String,
    },
    NewSection {
        title: String,
    },
    Current(Cursor),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberingState {
    pending_chapter: Option<String>,
    pending_section: Option<String>,
    current: Option<Cursor>,
}

impl Default for NumberingState {
    fn default() -> Self {
        Self::new()
    }
}

impl NumberingState {
    /// Starts with a pending default chapter, so declarations arriving before
    /// any header land in a synthesized chapter and section.
    pub fn new() -> Self {
        Self {
            pending_chapter: Some(DEFAULT_TITLE.to_string()),
            pending_section: Some(DEFAULT_TITLE.to_string()),
            current: None,
        }
    }

    pub fn begin_chapter(&mut self, title: impl Into<String>) {
        self.pending_chapter = Some(title.into());
        self.pending_section = None;
    }

    pub fn begin_section(&mut self, title: impl Into<String>) {
        self.pending_section = Some(title.into());
    }

    pub fn current(&self) -> Option<Cursor> {
        self.current
    }

    /// Consume pending titles and report the step the next declaration needs.
    ///
    /// A section header without a chapter header falls under the current
    /// chapter; a chapter header without a section header names its first
    /// section after the chapter.
    pub fn advance(&mut self) -> Step {
        let chapter_title = match (self.pending_chapter.take(), self.current) {
            (Some(title), _) => title,
            (None, None) => DEFAULT_TITLE.to_string(),
            (None, Some(cursor)) => {
                return match self.pending_section.take() {
                    Some(title) => Step::NewSection { title },
                    None => Step::Current(cursor),
                };
            }
        };

        let section_title = self
            .pending_section
            .take()
            .unwrap_or_else(|| chapter_title.clone());
        Step::NewChapter {
            chapter_title,
            section_title,
        }
    }

    /// Record the input section the book opened for the last step.
    pub fn enter(&mut self, cursor: Cursor) {
        self.current = Some(cursor);
    }
}
