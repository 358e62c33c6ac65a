//! Provable assertions that no proof cites.

use metabook_core::{BookManager, ChapterNbr, DeclId, Declarations, SectionAddress};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnusedAssertion {
    pub id: DeclId,
    pub label: String,
    pub address: SectionAddress,
}

/// Addressed provable assertions with zero proof references, in book order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    unused: Vec<UnusedAssertion>,
    /// Provable assertions examined.
    examined: usize,
}

impl UsageReport {
    pub fn build(book: &mut BookManager, decls: &Declarations) -> Self {
        let provable_type = book.config().provable_type.clone();
        let counts = book.proof_ref_counts(decls);

        let mut examined = 0;
        let mut unused: Vec<UnusedAssertion> = decls
            .iter()
            .filter(|(_, decl)| decl.is_provable_assertion(&provable_type))
            .filter_map(|(id, decl)| {
                let address = decl.address()?;
                examined += 1;
                let cited = counts.get(id.index()).copied().unwrap_or(0);
                (cited == 0).then(|| UnusedAssertion {
                    id,
                    label: decl.label.clone(),
                    address,
                })
            })
            .collect();
        unused.sort_by_key(|entry| (entry.address.section, entry.address.ordinal));

        Self { unused, examined }
    }

    pub fn unused(&self) -> &[UnusedAssertion] {
        &self.unused
    }

    pub fn examined(&self) -> usize {
        self.examined
    }

    pub fn is_empty(&self) -> bool {
        self.unused.is_empty()
    }

    pub fn in_chapter(&self, chapter: ChapterNbr) -> impl Iterator<Item = &UnusedAssertion> {
        self.unused
            .iter()
            .filter(move |entry| entry.address.chapter == chapter)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.unused.iter().map(|entry| entry.label.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metabook_core::{DeclKind, Declaration};

    fn add(
        book: &mut BookManager,
        decls: &mut Declarations,
        label: &str,
        kind: DeclKind,
        type_code: &str,
        cites: &[&str],
    ) {
        let proof = cites
            .iter()
            .map(|cite| decls.id_of(cite).expect("cited earlier"))
            .collect();
        let seq = decls.len() as u64 + 1;
        let id = decls.push(Declaration::new(seq, label, kind, type_code).with_proof(proof));
        book.classify(decls.get_mut(id).expect("pushed"));
    }

    #[test]
    fn reports_uncited_provable_assertions_in_book_order() {
        let mut book = BookManager::default();
        let mut decls = Declarations::new();

        book.begin_chapter("Logic");
        add(&mut book, &mut decls, "wi", DeclKind::SyntaxAxiom, "wff", &[]);
        add(&mut book, &mut decls, "ax-1", DeclKind::LogicAxiom, "|-", &[]);
        add(&mut book, &mut decls, "ax-2", DeclKind::LogicAxiom, "|-", &[]);
        add(&mut book, &mut decls, "a1i", DeclKind::Theorem, "|-", &["wi", "ax-1"]);
        book.begin_chapter("Sets");
        add(&mut book, &mut decls, "ax-ext", DeclKind::LogicAxiom, "|-", &[]);
        add(&mut book, &mut decls, "eqid", DeclKind::Theorem, "|-", &["a1i"]);

        let report = UsageReport::build(&mut book, &decls);
        insta::assert_snapshot!(report.labels().join(" "), @"ax-2 ax-ext eqid");
        assert_eq!(report.examined(), 5);

        let sets = ChapterNbr::new(2).expect("nonzero");
        let in_sets: Vec<&str> = report
            .in_chapter(sets)
            .map(|entry| entry.label.as_str())
            .collect();
        assert_eq!(in_sets, ["ax-ext", "eqid"]);
    }

    #[test]
    fn disabled_book_reports_nothing() {
        let mut book = BookManager::new(metabook_core::BookConfig::disabled());
        let mut decls = Declarations::new();
        add(&mut book, &mut decls, "ax-1", DeclKind::LogicAxiom, "|-", &[]);

        let report = UsageReport::build(&mut book, &decls);
        assert!(report.is_empty());
        assert_eq!(report.examined(), 0);
    }
}
