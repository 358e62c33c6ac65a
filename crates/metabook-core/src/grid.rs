//! Declarations laid out by (section, ordinal).

use crate::book::{Section, SectionNbr};
use crate::declaration::{DeclId, Declaration, Declarations};
use crate::error::BookError;

/// Every addressed declaration, one row per section, ordered by ordinal.
///
/// Built by [`crate::BookManager::section_grid`]. Each call to
/// [`SectionGrid::iter`] starts a fresh pass from the first section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionGrid {
    rows: Vec<Vec<DeclId>>,
}

impl SectionGrid {
    pub(crate) fn build(sections: &[Section], decls: &Declarations) -> Result<Self, BookError> {
        let mut slots: Vec<Vec<Option<DeclId>>> = sections
            .iter()
            .map(|section| vec![None; section.len() as usize])
            .collect();

        for (id, decl) in decls.iter() {
            let Some(address) = decl.address() else {
                continue;
            };
            let slot = address
                .ordinal
                .checked_sub(1)
                .and_then(|ordinal| {
                    slots
                        .get_mut(address.section.index())?
                        .get_mut(ordinal as usize)
                })
                .ok_or_else(|| BookError::GridOverflow {
                    label: decl.label.clone(),
                    section: address.section.get(),
                    ordinal: address.ordinal,
                })?;
            *slot = Some(id);
        }

        let rows = slots
            .into_iter()
            .zip(sections)
            .map(|(row, section)| {
                row.into_iter()
                    .zip(1u32..)
                    .map(|(slot, ordinal)| {
                        slot.ok_or(BookError::GridHole {
                            section: section.nbr().get(),
                            ordinal,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rows })
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Declarations of one section in ordinal order.
    pub fn section(&self, nbr: SectionNbr) -> &[DeclId] {
        self.rows
            .get(nbr.index())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// All declarations ordered by (section number, ordinal).
    pub fn iter(&self) -> impl Iterator<Item = DeclId> + '_ {
        self.rows.iter().flatten().copied()
    }

    /// Like [`SectionGrid::iter`], resolved against the arena.
    pub fn declarations<'a>(
        &'a self,
        decls: &'a Declarations,
    ) -> impl Iterator<Item = &'a Declaration> + 'a {
        self.iter().filter_map(move |id| decls.get(id))
    }
}
