//! Proof dependencies between input sections and chapters.
//!
//! Row `i` of a section matrix holds every input section that some theorem
//! in input section `i` cites in its proof (direct), or can reach through
//! such citations (transitive). Every row contains itself. Chapter matrices
//! aggregate section rows over each chapter's range.
//!
//! Matrices are built on demand and cached against the book's generation;
//! a cache built at an older generation is dropped before it can be read.

use crate::book::Chapter;
use crate::declaration::{DeclId, DeclKind, Declarations};
use crate::manager::BookManager;
use crate::section_set::{DependencyMatrix, SectionSet};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub(crate) struct DependencyCache {
    generation: Option<u64>,
    direct_sections: Option<DependencyMatrix>,
    transitive_sections: Option<DependencyMatrix>,
    direct_chapters: Option<DependencyMatrix>,
    transitive_chapters: Option<DependencyMatrix>,
    proof_refs: Vec<u32>,
}

/// What the cache needs from the book to build matrices.
struct Inputs<'a, 'd> {
    decls: &'d Declarations,
    provable_type: &'a str,
    chapters: &'a [Chapter],
    rows: usize,
    generation: u64,
}

impl DependencyCache {
    fn clear(&mut self) {
        *self = Self::default();
    }

    /// Drop everything built at another generation.
    fn sync(&mut self, generation: u64) {
        if self.generation != Some(generation) {
            self.clear();
            self.generation = Some(generation);
        }
    }

    fn direct_sections(&mut self, inputs: &Inputs<'_, '_>) -> &DependencyMatrix {
        self.sync(inputs.generation);
        let matrix = match self.direct_sections.take() {
            Some(matrix) => matrix,
            None => {
                let (matrix, proof_refs) =
                    direct_dependencies(inputs.decls, inputs.provable_type, inputs.rows);
                debug!(
                    rows = inputs.rows,
                    generation = inputs.generation,
                    "built direct section dependencies"
                );
                self.proof_refs = proof_refs;
                matrix
            }
        };
        self.direct_sections.insert(matrix)
    }

    fn transitive_sections(&mut self, inputs: &Inputs<'_, '_>) -> &DependencyMatrix {
        self.sync(inputs.generation);
        let matrix = match self.transitive_sections.take() {
            Some(matrix) => matrix,
            None => {
                let closure = transitive_closure(self.direct_sections(inputs));
                debug!(
                    rows = closure.len(),
                    generation = inputs.generation,
                    "built transitive section dependencies"
                );
                closure
            }
        };
        self.transitive_sections.insert(matrix)
    }

    fn direct_chapters(&mut self, inputs: &Inputs<'_, '_>) -> &DependencyMatrix {
        self.sync(inputs.generation);
        let matrix = match self.direct_chapters.take() {
            Some(matrix) => matrix,
            None => aggregate_by_chapter(inputs.chapters, self.direct_sections(inputs)),
        };
        self.direct_chapters.insert(matrix)
    }

    fn transitive_chapters(&mut self, inputs: &Inputs<'_, '_>) -> &DependencyMatrix {
        self.sync(inputs.generation);
        let matrix = match self.transitive_chapters.take() {
            Some(matrix) => matrix,
            None => aggregate_by_chapter(inputs.chapters, self.transitive_sections(inputs)),
        };
        self.transitive_chapters.insert(matrix)
    }
}

/// Direct section matrix over `rows` input sections, plus how many proof
/// steps cite each declaration.
///
/// Only theorems contribute edges, and only citations of provable
/// assertions become edges; every citation counts as a reference.
pub fn direct_dependencies(
    decls: &Declarations,
    provable_type: &str,
    rows: usize,
) -> (DependencyMatrix, Vec<u32>) {
    let mut matrix = DependencyMatrix::identity(rows);
    let mut proof_refs = vec![0u32; decls.len()];

    for (_, decl) in decls.iter() {
        if decl.kind != DeclKind::Theorem {
            continue;
        }
        let home = decl
            .address()
            .map(|address| address.section.input_section().row());

        for &step in &decl.proof {
            let Some(cited) = decls.get(step) else {
                continue;
            };
            if let Some(count) = proof_refs.get_mut(step.index()) {
                *count += 1;
            }
            if !cited.is_provable_assertion(provable_type) {
                continue;
            }
            if let (Some(from), Some(address)) = (home, cited.address()) {
                matrix.insert(from, address.section.input_section().row());
            }
        }
    }

    (matrix, proof_refs)
}

/// Reachability closure of a direct matrix.
///
/// Rows are resolved in increasing order, so a citation of an earlier row
/// merges that row's finished closure. Citations of later rows can only come
/// from late insertions into historical sections; when present, unions are
/// repeated until nothing changes.
pub fn transitive_closure(direct: &DependencyMatrix) -> DependencyMatrix {
    let mut rows = direct.clone().into_rows();
    let mut forward = false;

    for i in 0..rows.len() {
        let (done, rest) = rows.split_at_mut(i);
        let Some(current) = rest.first_mut() else {
            break;
        };
        for j in direct.row(i).into_iter().flatten() {
            match done.get(j) {
                Some(resolved) => {
                    current.union_with(resolved);
                }
                None if j != i => forward = true,
                None => {}
            }
        }
    }

    if forward {
        let mut changed = true;
        while changed {
            changed = false;
            for i in 0..rows.len() {
                let targets: Vec<usize> = rows[i].iter().filter(|&j| j != i).collect();
                for j in targets {
                    if let Some(reached) = rows.get(j).cloned() {
                        changed |= rows[i].union_with(&reached);
                    }
                }
            }
        }
    }

    DependencyMatrix::from_rows(rows)
}

/// Chapter `a` depends on chapter `b` iff some row of `a` has a bit in
/// `b`'s row range.
pub fn aggregate_by_chapter(chapters: &[Chapter], sections: &DependencyMatrix) -> DependencyMatrix {
    let mut matrix = DependencyMatrix::empty(chapters.len());
    for (a, from) in chapters.iter().enumerate() {
        for (b, to) in chapters.iter().enumerate() {
            let hit = from.rows().any(|row| {
                sections
                    .row(row)
                    .is_some_and(|set| set.intersects_range(to.rows()))
            });
            if hit {
                matrix.insert(a, b);
            }
        }
    }
    matrix
}

impl BookManager {
    fn dependency_parts<'a, 'd>(
        &'a mut self,
        decls: &'d Declarations,
    ) -> (&'a mut DependencyCache, Inputs<'a, 'd>) {
        let rows = self.input_section_count();
        let generation = self.generation();
        let inputs = Inputs {
            decls,
            provable_type: &self.config.provable_type,
            chapters: &self.chapters,
            rows,
            generation,
        };
        (&mut self.dependencies, inputs)
    }

    /// Direct input-section dependencies (row `k - 1` is input section `k`).
    pub fn direct_section_dependencies(&mut self, decls: &Declarations) -> &DependencyMatrix {
        let (cache, inputs) = self.dependency_parts(decls);
        cache.direct_sections(&inputs)
    }

    /// Transitive input-section dependencies.
    pub fn transitive_section_dependencies(&mut self, decls: &Declarations) -> &DependencyMatrix {
        let (cache, inputs) = self.dependency_parts(decls);
        cache.transitive_sections(&inputs)
    }

    /// Direct chapter dependencies (row `c - 1` is chapter `c`).
    pub fn direct_chapter_dependencies(&mut self, decls: &Declarations) -> &DependencyMatrix {
        let (cache, inputs) = self.dependency_parts(decls);
        cache.direct_chapters(&inputs)
    }

    /// Transitive chapter dependencies.
    pub fn transitive_chapter_dependencies(&mut self, decls: &Declarations) -> &DependencyMatrix {
        let (cache, inputs) = self.dependency_parts(decls);
        cache.transitive_chapters(&inputs)
    }

    /// Proof-step citations of every declaration, indexed by [`DeclId::index`].
    ///
    /// Recounted from scratch whenever the direct matrix is rebuilt.
    pub fn proof_ref_counts(&mut self, decls: &Declarations) -> &[u32] {
        let (cache, inputs) = self.dependency_parts(decls);
        cache.direct_sections(&inputs);
        &cache.proof_refs
    }

    pub fn proof_ref_count(&mut self, decls: &Declarations, id: DeclId) -> u32 {
        self.proof_ref_counts(decls)
            .get(id.index())
            .copied()
            .unwrap_or(0)
    }

    /// Drop all cached matrices and reference counts.
    pub fn invalidate_dependencies(&mut self) {
        self.dependencies.clear();
    }

    /// Whether a direct section matrix is cached for the current generation.
    pub fn has_cached_dependencies(&self) -> bool {
        self.dependencies.generation == Some(self.generation())
            && self.dependencies.direct_sections.is_some()
    }
}

/// Rows of `matrix` that reach `target` (including `target` itself when set).
pub fn dependents(matrix: &DependencyMatrix, target: usize) -> SectionSet {
    matrix
        .rows()
        .enumerate()
        .filter(|(_, set)| set.contains(target))
        .map(|(row, _)| row)
        .collect()
}
