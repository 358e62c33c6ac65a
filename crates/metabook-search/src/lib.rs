//! Search and impact projections over a metabook.
//!
//! This crate reads a [`metabook_core::BookManager`] and answers consumer
//! questions: which sections a from/thru selection covers, which parts of the
//! book depend on a section, and which provable assertions nothing cites.
//!
//! It does not own the book or the declarations (that's `metabook-core`) and
//! does not render anything; the projections are plain data.

mod impact;
mod range;
mod usage;

pub use impact::ImpactIndex;
pub use range::{RangeSelection, SearchError, SectionRange};
pub use usage::{UnusedAssertion, UsageReport};
