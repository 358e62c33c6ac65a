//! Impact analysis over the book's dependency matrices.
//!
//! The index is a snapshot: it copies the matrices at one book generation
//! and answers forward and reverse lookups without touching the book again.

use metabook_core::{
    BookManager, ChapterNbr, Declarations, DependencyMatrix, InputSectionNbr, dependents,
};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct ImpactIndex {
    generation: u64,
    direct: DependencyMatrix,
    transitive: DependencyMatrix,
    /// Row `i` holds every input section whose closure reaches `i`.
    reverse: DependencyMatrix,
    chapters: DependencyMatrix,
    reverse_chapters: DependencyMatrix,
}

impl ImpactIndex {
    /// Snapshot the book's matrices, building any that are stale.
    pub fn hydrate(book: &mut BookManager, decls: &Declarations) -> Self {
        let direct = book.direct_section_dependencies(decls).clone();
        let transitive = book.transitive_section_dependencies(decls).clone();
        let chapters = book.transitive_chapter_dependencies(decls).clone();

        let reverse = transpose(&transitive);
        let reverse_chapters = transpose(&chapters);
        debug!(
            generation = book.generation(),
            input_sections = transitive.len(),
            chapters = chapters.len(),
            "hydrated impact index"
        );

        Self {
            generation: book.generation(),
            direct,
            transitive,
            reverse,
            chapters,
            reverse_chapters,
        }
    }

    /// Whether the book has assigned declarations since this snapshot.
    pub fn is_stale(&self, book: &BookManager) -> bool {
        self.generation != book.generation()
    }

    /// Input sections cited directly by theorems in `section`.
    pub fn direct_dependencies_of(&self, section: InputSectionNbr) -> Vec<InputSectionNbr> {
        others(&self.direct, section.row())
    }

    /// Input sections `section` reaches through proof citations.
    pub fn dependencies_of(&self, section: InputSectionNbr) -> Vec<InputSectionNbr> {
        others(&self.transitive, section.row())
    }

    /// Input sections whose proofs reach `section`.
    pub fn dependents_of(&self, section: InputSectionNbr) -> Vec<InputSectionNbr> {
        others(&self.reverse, section.row())
    }

    pub fn chapter_dependencies_of(&self, chapter: ChapterNbr) -> Vec<ChapterNbr> {
        other_chapters(&self.chapters, chapter.index())
    }

    pub fn chapter_dependents_of(&self, chapter: ChapterNbr) -> Vec<ChapterNbr> {
        other_chapters(&self.reverse_chapters, chapter.index())
    }

    /// Whether the contents of input section `from` could be renumbered to
    /// sit at `to` without a proof citing something that comes after it.
    ///
    /// Moving earlier requires every dependency to stay before `to`; moving
    /// later requires every dependent to stay after `to`.
    pub fn can_move(&self, from: InputSectionNbr, to: InputSectionNbr) -> bool {
        if from.row() >= self.transitive.len() || to.row() >= self.transitive.len() {
            return false;
        }
        if to < from {
            self.dependencies_of(from).iter().all(|dep| *dep < to)
        } else {
            self.dependents_of(from).iter().all(|dep| *dep > to)
        }
    }
}

fn transpose(matrix: &DependencyMatrix) -> DependencyMatrix {
    let mut reverse = DependencyMatrix::empty(matrix.len());
    for to in 0..matrix.len() {
        for from in dependents(matrix, to).iter() {
            reverse.insert(to, from);
        }
    }
    reverse
}

/// Members of `row` other than `row` itself, as input sections.
fn others(matrix: &DependencyMatrix, row: usize) -> Vec<InputSectionNbr> {
    matrix
        .row(row)
        .into_iter()
        .flatten()
        .filter(|&other| other != row)
        .map(InputSectionNbr::from_row)
        .collect()
}

fn other_chapters(matrix: &DependencyMatrix, row: usize) -> Vec<ChapterNbr> {
    matrix
        .row(row)
        .into_iter()
        .flatten()
        .filter(|&other| other != row)
        .filter_map(|other| u32::try_from(other + 1).ok().and_then(ChapterNbr::new))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use metabook_core::{DeclId, DeclKind, Declaration};

    struct Book {
        book: BookManager,
        decls: Declarations,
    }

    impl Book {
        fn theorem(&mut self, label: &str, cites: &[&str]) {
            let proof: Vec<DeclId> = cites
                .iter()
                .map(|cite| self.decls.id_of(cite).expect("cited earlier"))
                .collect();
            let seq = self.decls.len() as u64 + 1;
            let id = self.decls.push(
                Declaration::new(seq, label, DeclKind::Theorem, "|-").with_proof(proof),
            );
            self.book.classify(self.decls.get_mut(id).expect("pushed"));
        }
    }

    fn input(nbr: u32) -> InputSectionNbr {
        InputSectionNbr::new(nbr).expect("nonzero")
    }

    /// Input sections 1..=4; 2 cites 1, 4 cites 2, 3 stands alone.
    /// Chapter 1 holds 1 and 2, chapter 2 holds 3 and 4.
    fn fixture() -> Book {
        let mut book = Book {
            book: BookManager::default(),
            decls: Declarations::new(),
        };
        book.book.begin_chapter("Logic");
        book.theorem("a", &[]);
        book.book.begin_section("More logic");
        book.theorem("b", &["a"]);
        book.book.begin_chapter("Sets");
        book.theorem("c", &[]);
        book.book.begin_section("More sets");
        book.theorem("d", &["b"]);
        book
    }

    #[test]
    fn forward_and_reverse_lookups() {
        let mut fx = fixture();
        let index = ImpactIndex::hydrate(&mut fx.book, &fx.decls);

        assert_eq!(index.direct_dependencies_of(input(4)), vec![input(2)]);
        assert_eq!(index.dependencies_of(input(4)), vec![input(1), input(2)]);
        assert_eq!(index.dependents_of(input(1)), vec![input(2), input(4)]);
        assert!(index.dependents_of(input(3)).is_empty());

        let logic = ChapterNbr::new(1).expect("nonzero");
        let sets = ChapterNbr::new(2).expect("nonzero");
        assert_eq!(index.chapter_dependents_of(logic), vec![sets]);
        assert_eq!(index.chapter_dependencies_of(sets), vec![logic]);
        assert!(index.chapter_dependencies_of(logic).is_empty());
    }

    #[test]
    fn move_safety_respects_both_directions() {
        let mut fx = fixture();
        let index = ImpactIndex::hydrate(&mut fx.book, &fx.decls);

        assert!(index.can_move(input(3), input(1)));
        assert!(!index.can_move(input(4), input(2)));
        assert!(index.can_move(input(4), input(3)));
        assert!(!index.can_move(input(1), input(2)));
        assert!(index.can_move(input(2), input(3)));
        assert!(!index.can_move(input(2), input(4)));
        assert!(!index.can_move(input(1), input(9)));
    }

    #[test]
    fn snapshot_goes_stale_after_new_declarations() {
        let mut fx = fixture();
        let index = ImpactIndex::hydrate(&mut fx.book, &fx.decls);
        assert!(!index.is_stale(&fx.book));

        fx.theorem("e", &["c"]);
        assert!(index.is_stale(&fx.book));
        let fresh = ImpactIndex::hydrate(&mut fx.book, &fx.decls);
        assert_eq!(fresh.dependents_of(input(3)), vec![input(4)]);
    }
}
