//! Late insertion of theorem groups after the initial load.
//!
//! A group either names a section to insert into, and lands in the Logic
//! section of that input section, or is appended to whatever input section
//! is open. Groups already committed stay committed when a later group
//! fails: section ordinals cannot be taken back, so the caller is told to
//! reload instead.

use crate::book::{SectionCategory, SectionNbr};
use crate::declaration::{DeclId, Declarations};
use crate::error::BookError;
use crate::manager::BookManager;
use serde::{Deserialize, Serialize};
use std::iter;
use tracing::{info, warn};

/// A theorem and its logical hypotheses, produced outside the initial load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TheoremGroup {
    /// Intended final sequence position; groups commit in this order.
    pub seq: u64,
    /// Section to insert into; any category maps to that input section's
    /// Logic section. `None` and `Some(0)` append.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert_section: Option<u32>,
    #[serde(default)]
    pub hypotheses: Vec<DeclId>,
    pub theorem: DeclId,
}

impl TheoremGroup {
    pub fn append(seq: u64, hypotheses: Vec<DeclId>, theorem: DeclId) -> Self {
        Self {
            seq,
            insert_section: None,
            hypotheses,
            theorem,
        }
    }

    pub fn insert(seq: u64, section: u32, hypotheses: Vec<DeclId>, theorem: DeclId) -> Self {
        Self {
            seq,
            insert_section: Some(section),
            hypotheses,
            theorem,
        }
    }

    /// The section asked for, with 0 read as "no section".
    fn target(&self) -> Option<u32> {
        self.insert_section.filter(|nbr| *nbr > 0)
    }

    /// Hypotheses first, then the theorem.
    fn members(&self) -> impl Iterator<Item = DeclId> + '_ {
        self.hypotheses
            .iter()
            .copied()
            .chain(iter::once(self.theorem))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitSummary {
    pub appended: usize,
    pub inserted: usize,
    /// Declarations that received a new address.
    pub assigned: usize,
}

impl CommitSummary {
    pub fn groups(&self) -> usize {
        self.appended + self.inserted
    }
}

impl BookManager {
    /// Commit late-inserted theorem groups in `seq` order.
    ///
    /// Stops at the first failing group with [`BookError::CommitAborted`].
    pub fn commit(
        &mut self,
        decls: &mut Declarations,
        mut groups: Vec<TheoremGroup>,
    ) -> Result<CommitSummary, BookError> {
        let mut summary = CommitSummary::default();
        if !self.is_enabled() || groups.is_empty() {
            return Ok(summary);
        }

        groups.sort_by_key(|group| group.seq);
        for group in &groups {
            let before = self.total_declarations();
            let outcome = match group.target() {
                Some(section) => self.commit_insert(decls, group, section),
                None => self.commit_append(decls, group),
            };
            if let Err(error) = outcome {
                warn!(
                    committed = summary.groups(),
                    error = %error,
                    "late insertion aborted"
                );
                return Err(BookError::CommitAborted {
                    committed: summary.groups(),
                    source: Box::new(error),
                });
            }

            match group.target() {
                Some(_) => summary.inserted += 1,
                None => summary.appended += 1,
            }
            summary.assigned += self.total_declarations() - before;
        }

        info!(
            appended = summary.appended,
            inserted = summary.inserted,
            assigned = summary.assigned,
            "committed late insertions"
        );
        Ok(summary)
    }

    fn check_members(decls: &Declarations, group: &TheoremGroup) -> Result<(), BookError> {
        match group.members().find(|id| !decls.contains(*id)) {
            Some(missing) => Err(BookError::UnknownDeclaration(missing)),
            None => Ok(()),
        }
    }

    fn commit_append(
        &mut self,
        decls: &mut Declarations,
        group: &TheoremGroup,
    ) -> Result<(), BookError> {
        Self::check_members(decls, group)?;
        for id in group.members() {
            let decl = decls.get_mut(id).ok_or(BookError::UnknownDeclaration(id))?;
            self.classify(decl);
        }
        Ok(())
    }

    fn commit_insert(
        &mut self,
        decls: &mut Declarations,
        group: &TheoremGroup,
        section: u32,
    ) -> Result<(), BookError> {
        Self::check_members(decls, group)?;

        let logic = SectionNbr::new(section)
            .and_then(|nbr| nbr.with_category(SectionCategory::Logic));
        let Some(target) = logic.filter(|nbr| nbr.index() < self.sections.len()) else {
            let label = decls
                .get(group.theorem)
                .map(|theorem| theorem.label.clone())
                .unwrap_or_default();
            return Err(BookError::InsertSectionNotFound {
                section: logic.map_or(section, SectionNbr::get),
                label,
            });
        };

        for id in group.members() {
            let decl = decls.get_mut(id).ok_or(BookError::UnknownDeclaration(id))?;
            let assigned = self
                .sections
                .get_mut(target.index())
                .and_then(|section| section.assign(decl));
            if assigned.is_some() {
                self.record_assignment();
            }
        }
        Ok(())
    }
}
