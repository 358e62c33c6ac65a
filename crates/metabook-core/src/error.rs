//! Error types for book operations.

use crate::declaration::DeclId;

/// Errors raised by the book.
///
/// A disabled book never produces these; it answers every query with an
/// empty result instead.
#[derive(Debug, thiserror::Error)]
pub enum BookError {
    /// A late insertion names a section the book does not have.
    #[error("insert section {section} not found for theorem {label}")]
    InsertSectionNotFound { section: u32, label: String },

    /// A theorem group or proof refers outside the declaration arena.
    #[error("unknown declaration {0}")]
    UnknownDeclaration(DeclId),

    /// A late-insertion batch stopped partway; earlier groups stay committed.
    #[error(
        "late insertion aborted after {committed} committed group(s); \
         reload the database to restore consistent section numbering: {source}"
    )]
    CommitAborted {
        committed: usize,
        #[source]
        source: Box<BookError>,
    },

    /// A section ordinal was never filled by any declaration.
    #[error("section {section} has no declaration at ordinal {ordinal}")]
    GridHole { section: u32, ordinal: u32 },

    /// A declaration carries an address outside the book.
    #[error("declaration {label} addressed at section {section} ordinal {ordinal}, outside the book")]
    GridOverflow {
        label: String,
        section: u32,
        ordinal: u32,
    },
}

impl BookError {
    /// The error a late-insertion batch stopped on.
    pub fn root_cause(&self) -> &BookError {
        match self {
            BookError::CommitAborted { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
