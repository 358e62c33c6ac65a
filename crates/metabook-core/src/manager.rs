//! The book manager: chapter/section registry and streaming classifier.
//!
//! The load pipeline calls [`BookManager::begin_chapter`] and
//! [`BookManager::begin_section`] as headers go by and
//! [`BookManager::classify`] for every declaration, in creation order.
//! Every assignment and every new chapter or input section bumps the
//! book's generation, which retires any cached dependency matrices.

use crate::book::{
    Chapter, ChapterNbr, InputSectionNbr, Section, SectionCategory, SectionNbr, merge_bounds,
};
use crate::config::BookConfig;
use crate::declaration::{DeclKind, Declaration, Declarations, SectionAddress};
use crate::dependency::DependencyCache;
use crate::error::BookError;
use crate::grid::SectionGrid;
use crate::header::Header;
use crate::numbering::{Cursor, NumberingState, Step};
use tracing::debug;

/// Chapter and section title lists for search filters.
///
/// Index 0 of the chapter list and of each section row is the empty
/// "any" entry; chapter `c` is at index `c`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SearchValues {
    chapters: Vec<String>,
    sections: Vec<Vec<String>>,
}

impl SearchValues {
    fn build(chapters: &[Chapter], sections: &[Section]) -> Self {
        let mut chapter_values = vec![String::new()];
        let mut section_values = vec![vec![String::new()]];

        for chapter in chapters {
            chapter_values.push(chapter.title().to_string());

            let mut row = vec![String::new()];
            row.extend(chapter.input_sections().filter_map(|input| {
                sections
                    .get(input.first_section().index())
                    .map(|section| section.title().to_string())
            }));
            section_values.push(row);
        }

        Self {
            chapters: chapter_values,
            sections: section_values,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BookManager {
    pub(crate) config: BookConfig,
    pub(crate) chapters: Vec<Chapter>,
    pub(crate) sections: Vec<Section>,
    numbering: NumberingState,
    total_declarations: usize,
    generation: u64,
    search_values: Option<SearchValues>,
    pub(crate) dependencies: DependencyCache,
}

impl Default for BookManager {
    fn default() -> Self {
        Self::new(BookConfig::default())
    }
}

impl BookManager {
    pub fn new(config: BookConfig) -> Self {
        Self {
            config,
            chapters: Vec::new(),
            sections: Vec::new(),
            numbering: NumberingState::new(),
            total_declarations: 0,
            generation: 0,
            search_values: None,
            dependencies: DependencyCache::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    /// Number of declarations given an address so far.
    pub fn total_declarations(&self) -> usize {
        self.total_declarations
    }

    /// Incremented on every assignment and every new input section; cached
    /// derived data is stamped with it.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Note a chapter header. Nothing is created until the next declaration.
    pub fn begin_chapter(&mut self, title: impl Into<String>) {
        if self.is_enabled() {
            self.numbering.begin_chapter(title);
        }
    }

    /// Note a section header within the current chapter.
    pub fn begin_section(&mut self, title: impl Into<String>) {
        if self.is_enabled() {
            self.numbering.begin_section(title);
        }
    }

    pub fn apply_header(&mut self, header: &Header) {
        match header {
            Header::Chapter(title) => self.begin_chapter(title.as_str()),
            Header::Section(title) => self.begin_section(title.as_str()),
        }
    }

    /// File `decl` into the current input section.
    ///
    /// Returns the new address, or `None` when the book is disabled or `decl`
    /// already has an address (re-declared variables come through twice).
    pub fn classify(&mut self, decl: &mut Declaration) -> Option<SectionAddress> {
        if !self.is_enabled() {
            return None;
        }

        let cursor = self.materialize();
        let nbr = cursor.input_section.section(self.category_for(decl));
        let address = self.sections.get_mut(nbr.index())?.assign(decl)?;
        self.record_assignment();
        Some(address)
    }

    /// The category section `decl` belongs in.
    ///
    /// Axioms whose type is the provable type go to Logic, other axioms to
    /// Syntax. Theorems and logical hypotheses always go to Logic.
    pub fn category_for(&self, decl: &Declaration) -> SectionCategory {
        match decl.kind {
            DeclKind::Constant | DeclKind::Variable => SectionCategory::Symbols,
            DeclKind::VariableHypothesis => SectionCategory::VarHyp,
            DeclKind::SyntaxAxiom | DeclKind::LogicAxiom => {
                if decl.type_code == self.config.provable_type {
                    SectionCategory::Logic
                } else {
                    SectionCategory::Syntax
                }
            }
            DeclKind::LogicalHypothesis | DeclKind::Theorem => SectionCategory::Logic,
        }
    }

    pub(crate) fn record_assignment(&mut self) {
        self.total_declarations += 1;
        self.generation += 1;
    }

    fn materialize(&mut self) -> Cursor {
        let cursor = match self.numbering.advance() {
            Step::Current(cursor) => return cursor,
            Step::NewChapter {
                chapter_title,
                section_title,
            } => {
                let chapter = ChapterNbr::from_index(self.chapters.len());
                let input_section = self.next_input_section();
                self.chapters.push(Chapter::new(
                    chapter,
                    chapter_title,
                    input_section.first_section(),
                ));
                debug!(chapter = chapter.get(), "opened chapter");
                self.push_quartet(chapter, input_section, section_title)
            }
            Step::NewSection { title } => {
                let chapter = self
                    .numbering
                    .current()
                    .map_or(ChapterNbr::from_index(0), |cursor| cursor.chapter);
                let input_section = self.next_input_section();
                self.push_quartet(chapter, input_section, title)
            }
        };
        self.numbering.enter(cursor);
        cursor
    }

    fn next_input_section(&self) -> InputSectionNbr {
        InputSectionNbr::from_row(self.sections.len() / SectionCategory::ALL.len())
    }

    fn push_quartet(
        &mut self,
        chapter: ChapterNbr,
        input_section: InputSectionNbr,
        title: String,
    ) -> Cursor {
        for category in SectionCategory::ALL {
            self.sections.push(Section::new(
                chapter,
                input_section.section(category),
                title.clone(),
            ));
        }
        if let Some(record) = self.chapters.get_mut(chapter.index()) {
            record.extend_to(input_section.section(SectionCategory::Logic));
        }
        self.search_values = None;
        self.generation += 1;
        debug!(
            chapter = chapter.get(),
            input_section = input_section.get(),
            first_section = input_section.first_section().get(),
            "opened input section"
        );
        Cursor {
            chapter,
            input_section,
        }
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Number of input sections (section count / 4).
    pub fn input_section_count(&self) -> usize {
        self.sections.len() / SectionCategory::ALL.len()
    }

    pub fn chapter(&self, nbr: u32) -> Option<&Chapter> {
        ChapterNbr::new(nbr).and_then(|nbr| self.chapters.get(nbr.index()))
    }

    pub fn section(&self, nbr: u32) -> Option<&Section> {
        SectionNbr::new(nbr).and_then(|nbr| self.sections.get(nbr.index()))
    }

    pub fn chapter_for_section(&self, nbr: u32) -> Option<&Chapter> {
        self.section(nbr)
            .and_then(|section| self.chapters.get(section.chapter().index()))
    }

    /// First chapter with exactly this title.
    pub fn chapter_by_title(&self, title: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|chapter| chapter.title() == title)
    }

    /// First section of `chapter` with this title and category.
    pub fn section_by_chapter_and_title(
        &self,
        chapter: &Chapter,
        title: &str,
        category: SectionCategory,
    ) -> Option<&Section> {
        let range = chapter.first_section().index()..chapter.last_section().index() + 1;
        self.sections
            .get(range)?
            .iter()
            .find(|section| section.category() == category && section.title() == title)
    }

    /// `(min, max)` declaration seq over the whole input section containing `nbr`.
    pub fn section_seq_bounds(&self, nbr: u32) -> Option<(u64, u64)> {
        let input = SectionNbr::new(nbr)?.input_section();
        SectionCategory::ALL
            .into_iter()
            .filter_map(|category| self.sections.get(input.section(category).index()))
            .map(Section::seq_bounds)
            .fold(None, merge_bounds)
    }

    /// `(min, max)` declaration seq over every section of chapter `nbr`.
    pub fn chapter_seq_bounds(&self, nbr: u32) -> Option<(u64, u64)> {
        let chapter = self.chapter(nbr)?;
        let range = chapter.first_section().index()..chapter.last_section().index() + 1;
        self.sections
            .get(range)?
            .iter()
            .map(Section::seq_bounds)
            .fold(None, merge_bounds)
    }

    /// Lay out every addressed declaration by (section, ordinal).
    ///
    /// Fails if some ordinal was handed out but no declaration in `decls`
    /// carries it, or if a declaration carries an address outside the book.
    pub fn section_grid(&self, decls: &Declarations) -> Result<SectionGrid, BookError> {
        SectionGrid::build(&self.sections, decls)
    }

    fn search_values(&mut self) -> &SearchValues {
        let (chapters, sections) = (&self.chapters, &self.sections);
        self.search_values
            .get_or_insert_with(|| SearchValues::build(chapters, sections))
    }

    /// Chapter titles, with the "any" entry `""` at index 0.
    pub fn chapter_values_for_search(&mut self) -> &[String] {
        &self.search_values().chapters
    }

    /// Per-chapter input-section titles; row 0 and index 0 of each row are `""`.
    pub fn section_values_for_search(&mut self) -> &[Vec<String>] {
        &self.search_values().sections
    }

    pub fn invalidate_search_values(&mut self) {
        self.search_values = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::DEFAULT_TITLE;

    fn decl(seq: u64, label: &str, kind: DeclKind, type_code: &str) -> Declaration {
        Declaration::new(seq, label, kind, type_code)
    }

    #[test]
    fn one_declaration_per_category_without_headers() {
        let mut book = BookManager::default();
        let mut decls = vec![
            decl(1, "(", DeclKind::Constant, "$c"),
            decl(2, "wph", DeclKind::VariableHypothesis, "wff"),
            decl(3, "wi", DeclKind::SyntaxAxiom, "wff"),
            decl(4, "ax-1", DeclKind::LogicAxiom, "|-"),
        ];
        let sections: Vec<u32> = decls
            .iter_mut()
            .map(|d| book.classify(d).expect("assigned").section.get())
            .collect();

        assert_eq!(sections, vec![1, 2, 3, 4]);
        assert_eq!(book.chapters().len(), 1);
        assert_eq!(book.chapters()[0].title(), DEFAULT_TITLE);
        let categories: Vec<_> = book.sections().iter().map(Section::category).collect();
        assert_eq!(categories, SectionCategory::ALL.to_vec());
        assert!(book.sections().iter().all(|s| s.title() == DEFAULT_TITLE));
    }

    #[test]
    fn reclassifying_is_a_no_op() {
        let mut book = BookManager::default();
        let mut var = decl(1, "ph", DeclKind::Variable, "$v");
        assert!(book.classify(&mut var).is_some());
        let generation = book.generation();

        assert!(book.classify(&mut var).is_none());
        assert_eq!(book.total_declarations(), 1);
        assert_eq!(book.generation(), generation);
        assert_eq!(book.sections()[0].len(), 1);
    }

    #[test]
    fn reclassify_under_new_chapter_retires_cached_matrices() {
        let mut book = BookManager::default();
        let mut decls = Declarations::new();
        let var = decls.push(decl(1, "x", DeclKind::Variable, "$v"));
        book.classify(decls.get_mut(var).expect("pushed"));
        assert_eq!(book.direct_chapter_dependencies(&decls).len(), 1);
        let generation = book.generation();

        book.begin_chapter("B");
        assert!(book.classify(decls.get_mut(var).expect("pushed")).is_none());

        assert_eq!(book.chapters().len(), 2);
        assert_eq!(book.total_declarations(), 1);
        assert!(book.generation() > generation);
        assert_eq!(book.direct_chapter_dependencies(&decls).len(), 2);
        assert_eq!(book.direct_section_dependencies(&decls).len(), 2);
    }

    #[test]
    fn axiom_routing_follows_type_code() {
        let book = BookManager::default();
        let logic_typed_syntax = decl(1, "odd", DeclKind::SyntaxAxiom, "|-");
        let wff_typed_logic = decl(2, "odd2", DeclKind::LogicAxiom, "wff");
        let hyp = decl(3, "min", DeclKind::LogicalHypothesis, "|-");

        assert_eq!(book.category_for(&logic_typed_syntax), SectionCategory::Logic);
        assert_eq!(book.category_for(&wff_typed_logic), SectionCategory::Syntax);
        assert_eq!(book.category_for(&hyp), SectionCategory::Logic);
    }

    #[test]
    fn headers_apply_lazily() {
        let mut book = BookManager::default();
        book.apply_header(&Header::Chapter("Logic".into()));
        book.apply_header(&Header::Section("Axioms".into()));
        assert!(book.chapters().is_empty());

        let mut axiom = decl(1, "ax-1", DeclKind::LogicAxiom, "|-");
        book.classify(&mut axiom);
        book.begin_section("Theorems");
        let mut theorem = decl(2, "id", DeclKind::Theorem, "|-");
        let address = book.classify(&mut theorem).expect("assigned");

        assert_eq!(address.section.get(), 8);
        assert_eq!(address.chapter.get(), 1);
        assert_eq!(book.chapters()[0].last_section().get(), 8);
        let chapter = book.chapter_by_title("Logic").expect("chapter");
        let section = book
            .section_by_chapter_and_title(chapter, "Theorems", SectionCategory::Logic)
            .expect("section");
        assert_eq!(section.nbr().get(), 8);
        assert!(
            book.section_by_chapter_and_title(chapter, "Theorems", SectionCategory::VarHyp)
                .is_some_and(|s| s.nbr().get() == 6)
        );
        assert_eq!(book.chapter_for_section(5).map(Chapter::title), Some("Logic"));
    }

    #[test]
    fn disabled_book_ignores_everything() {
        let mut book = BookManager::new(BookConfig::disabled());
        book.begin_chapter("Logic");
        let mut theorem = decl(1, "id", DeclKind::Theorem, "|-");

        assert!(book.classify(&mut theorem).is_none());
        assert!(theorem.address().is_none());
        assert!(book.sections().is_empty());
        assert!(book.chapter(1).is_none());
        assert_eq!(book.total_declarations(), 0);
        assert_eq!(book.chapter_values_for_search(), [String::new()]);
    }

    #[test]
    fn seq_bounds_aggregate_quartets_and_chapters() {
        let mut book = BookManager::default();
        book.begin_chapter("A");
        let mut sym = decl(5, "x", DeclKind::Variable, "$v");
        let mut thm = decl(9, "t", DeclKind::Theorem, "|-");
        book.classify(&mut sym);
        book.classify(&mut thm);
        book.begin_section("A2");
        let mut late = decl(12, "u", DeclKind::Theorem, "|-");
        book.classify(&mut late);

        assert_eq!(book.section_seq_bounds(2), Some((5, 9)));
        assert_eq!(book.section_seq_bounds(8), Some((12, 12)));
        assert_eq!(book.chapter_seq_bounds(1), Some((5, 12)));
        assert_eq!(book.section_seq_bounds(9), None);
        assert_eq!(book.section_seq_bounds(0), None);
    }

    #[test]
    fn search_values_refresh_after_new_sections() {
        let mut book = BookManager::default();
        book.begin_chapter("Logic");
        book.begin_section("Axioms");
        let mut a = decl(1, "ax-1", DeclKind::LogicAxiom, "|-");
        book.classify(&mut a);

        assert_eq!(book.chapter_values_for_search(), ["", "Logic"]);
        assert_eq!(book.section_values_for_search()[1], ["", "Axioms"]);

        book.begin_section("Theorems");
        let mut t = decl(2, "id", DeclKind::Theorem, "|-");
        book.classify(&mut t);
        assert_eq!(
            book.section_values_for_search(),
            [vec![""], vec!["", "Axioms", "Theorems"]]
        );
    }

    #[test]
    fn grid_orders_by_section_then_ordinal() {
        let mut book = BookManager::default();
        let mut decls = Declarations::new();
        let theorem = decls.push(decl(1, "t", DeclKind::Theorem, "|-"));
        let constant = decls.push(decl(2, "c", DeclKind::Constant, "$c"));
        let var_hyp = decls.push(decl(3, "wph", DeclKind::VariableHypothesis, "wff"));
        for id in [theorem, constant, var_hyp] {
            let d = decls.get_mut(id).expect("pushed");
            book.classify(d);
        }

        let grid = book.section_grid(&decls).expect("grid");
        assert_eq!(grid.iter().collect::<Vec<_>>(), vec![constant, var_hyp, theorem]);
        let labels: Vec<&str> = grid.declarations(&decls).map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["c", "wph", "t"]);
        assert_eq!(grid.iter().count(), 3);
    }

    #[test]
    fn grid_reports_missing_ordinal() {
        let mut book = BookManager::default();
        let mut orphan = decl(1, "t", DeclKind::Theorem, "|-");
        book.classify(&mut orphan);

        let err = book
            .section_grid(&Declarations::new())
            .expect_err("ordinal 1 of section 4 has no declaration");
        assert!(matches!(
            err,
            BookError::GridHole {
                section: 4,
                ordinal: 1
            }
        ));
    }
}
