//! Chapter and section header comments.
//!
//! A comment whose first token starts with `#*#*` opens a chapter; one whose
//! first token starts with `=-=-` opens a section. The title is the comment's
//! remaining tokens, minus decoration tokens carrying the same prefix.

use crate::book::DEFAULT_TITLE;

pub const CHAPTER_PREFIX: &str = "#*#*";
pub const SECTION_PREFIX: &str = "=-=-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    Chapter(String),
    Section(String),
}

impl Header {
    /// Recognize a header in the text of a comment; `None` for ordinary comments.
    pub fn parse(comment: &str) -> Option<Header> {
        let first = comment.split_whitespace().next()?;
        if first.starts_with(CHAPTER_PREFIX) {
            Some(Header::Chapter(title_of(comment, CHAPTER_PREFIX)))
        } else if first.starts_with(SECTION_PREFIX) {
            Some(Header::Section(title_of(comment, SECTION_PREFIX)))
        } else {
            None
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Header::Chapter(title) | Header::Section(title) => title,
        }
    }
}

fn title_of(comment: &str, prefix: &str) -> String {
    let title = comment
        .split_whitespace()
        .filter(|token| !token.starts_with(prefix))
        .collect::<Vec<_>>()
        .join(" ");
    if title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chapter_banner_yields_title() {
        let comment = "\n#*#*#*#*#*#*#*#*#*#*\n   Propositional   calculus\n#*#*#*#*#*#*#*#*#*#*\n";
        assert_eq!(
            Header::parse(comment),
            Some(Header::Chapter("Propositional calculus".to_string()))
        );
    }

    #[test]
    fn section_banner_yields_title() {
        let comment = "=-=-=-=-=-=-\n  Logical implication\n=-=-=-=-=-=-";
        let header = Header::parse(comment).expect("section header");
        assert!(matches!(header, Header::Section(_)));
        assert_eq!(header.title(), "Logical implication");
    }

    #[test]
    fn banner_without_words_gets_default_title() {
        assert_eq!(
            Header::parse("#*#*#*#* #*#*"),
            Some(Header::Chapter(DEFAULT_TITLE.to_string()))
        );
    }

    #[test]
    fn ordinary_comment_is_not_a_header() {
        assert_eq!(Header::parse("Axiom of simplification. #*#*"), None);
        assert_eq!(Header::parse("   "), None);
    }
}
