//! # metabook-core
//!
//! Book structure for a stream of formal-logic declarations.
//!
//! Comment headers in the source divide declarations into chapters and
//! sections. Each input section is split four ways by declaration category,
//! so a declaration's address is `(chapter, section, ordinal)` and section
//! numbers encode their category: input section `k` owns sections
//! `4(k-1)+1 ..= 4k` in the order symbols, variable hypotheses, syntax,
//! logic.
//!
//! On top of the addresses the crate derives proof dependencies between
//! input sections and between chapters, plus their transitive closures.
//!
//! ## Architecture
//!
//! ```text
//! Header                ← "#*#*" chapter / "=-=-" section comments
//!     │
//! NumberingState        ← Pending titles, materialized on first declaration
//!     │
//! BookManager           ← Chapters, sections, addresses, search values
//!     │            ╲
//! commit             DependencyCache
//! (late insertion)   ← Direct/transitive matrices, retired per generation
//!     │
//! SectionGrid           ← Declarations in (section, ordinal) order
//! ```
//!
//! The book never owns declarations: the load pipeline keeps them in a
//! [`Declarations`] arena and the book writes addresses onto them.

pub mod book;
pub mod commit;
pub mod config;
pub mod declaration;
pub mod dependency;
pub mod error;
pub mod grid;
pub mod header;
pub mod manager;
pub mod numbering;
pub mod section_set;

pub use book::{
    Chapter, ChapterNbr, DEFAULT_TITLE, InputSectionNbr, SECTION_CATEGORIES, Section,
    SectionCategory, SectionNbr, merge_bounds,
};
pub use commit::{CommitSummary, TheoremGroup};
pub use config::{BookConfig, ConfigError, DEFAULT_PROVABLE_TYPE};
pub use declaration::{DeclId, DeclKind, Declaration, Declarations, SectionAddress};
pub use dependency::{aggregate_by_chapter, dependents, direct_dependencies, transitive_closure};
pub use error::BookError;
pub use grid::SectionGrid;
pub use header::{CHAPTER_PREFIX, Header, SECTION_PREFIX};
pub use manager::BookManager;
pub use numbering::{Cursor, NumberingState, Step};
pub use section_set::{DependencyMatrix, SectionSet, SetBits};
