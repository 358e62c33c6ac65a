//! Declarations: the units being placed into the book.
//!
//! The load pipeline creates and owns declarations; the book only writes a
//! [`SectionAddress`] onto each one. Proof bodies refer to other declarations
//! by [`DeclId`], the declaration's slot in the [`Declarations`] arena.

use crate::book::{ChapterNbr, SectionNbr};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Index of a declaration in its [`Declarations`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclId(usize);

impl DeclId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Declaration kind as reported by the load pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeclKind {
    Constant,
    Variable,
    VariableHypothesis,
    SyntaxAxiom,
    LogicAxiom,
    LogicalHypothesis,
    Theorem,
}

impl DeclKind {
    pub fn is_axiom(self) -> bool {
        matches!(self, DeclKind::SyntaxAxiom | DeclKind::LogicAxiom)
    }

    /// Axioms and theorems: the statements a proof step can cite as a rule.
    pub fn is_assertion(self) -> bool {
        self.is_axiom() || self == DeclKind::Theorem
    }

    pub fn is_symbol(self) -> bool {
        matches!(self, DeclKind::Constant | DeclKind::Variable)
    }
}

/// Where a declaration sits in the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionAddress {
    pub chapter: ChapterNbr,
    pub section: SectionNbr,
    /// 1-based position within the section.
    pub ordinal: u32,
}

/// A declaration from the input stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    /// Global creation order. Late insertions carry their final position.
    pub seq: u64,
    pub label: String,
    pub kind: DeclKind,
    /// Statement type marker, e.g. `|-` or `wff`.
    pub type_code: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub proof: Vec<DeclId>,
    #[serde(skip)]
    address: Option<SectionAddress>,
}

impl Declaration {
    pub fn new(
        seq: u64,
        label: impl Into<String>,
        kind: DeclKind,
        type_code: impl Into<String>,
    ) -> Self {
        Self {
            seq,
            label: label.into(),
            kind,
            type_code: type_code.into(),
            proof: Vec::new(),
            address: None,
        }
    }

    pub fn with_proof(mut self, proof: Vec<DeclId>) -> Self {
        self.proof = proof;
        self
    }

    /// Address assigned by the book, if any.
    pub fn address(&self) -> Option<SectionAddress> {
        self.address
    }

    pub(crate) fn set_address(&mut self, address: SectionAddress) {
        self.address = Some(address);
    }

    /// Whether `provable_type` marks this as a provable assertion.
    pub fn is_provable_assertion(&self, provable_type: &str) -> bool {
        self.kind.is_assertion() && self.type_code == provable_type
    }
}

/// Arena of declarations in creation order.
///
/// Labels index the most recent declaration pushed under that label.
#[derive(Debug, Clone, Default)]
pub struct Declarations {
    decls: Vec<Declaration>,
    by_label: BTreeMap<String, DeclId>,
}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, decl: Declaration) -> DeclId {
        let id = DeclId(self.decls.len());
        self.by_label.insert(decl.label.clone(), id);
        self.decls.push(decl);
        id
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn get(&self, id: DeclId) -> Option<&Declaration> {
        self.decls.get(id.0)
    }

    pub fn get_mut(&mut self, id: DeclId) -> Option<&mut Declaration> {
        self.decls.get_mut(id.0)
    }

    pub fn contains(&self, id: DeclId) -> bool {
        id.0 < self.decls.len()
    }

    pub fn id_of(&self, label: &str) -> Option<DeclId> {
        self.by_label.get(label).copied()
    }

    pub fn by_label(&self, label: &str) -> Option<&Declaration> {
        self.id_of(label).and_then(|id| self.get(id))
    }

    /// Iterate in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (DeclId, &Declaration)> {
        self.decls
            .iter()
            .enumerate()
            .map(|(index, decl)| (DeclId(index), decl))
    }
}
