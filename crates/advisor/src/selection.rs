//! Selected records, keyed by entry id so filter changes never re-target them

use std::collections::BTreeSet;

use crate::store::EntryId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
  ids: BTreeSet<EntryId>,
}

impl Selection {
  pub fn new() -> Self {
    Self::default()
  }

  /// Flip membership of one record; returns whether it is now selected
  pub fn toggle(&mut self, id: EntryId) -> bool {
    if self.ids.remove(&id) {
      false
    } else {
      self.ids.insert(id);
      true
    }
  }

  /// Bulk toggle against the current view: when every visible record is
  /// already selected the whole selection is cleared, otherwise the selection
  /// becomes exactly the visible records.
  pub fn select_all(&mut self, view: &[EntryId]) {
    if self.all_selected(view) {
      self.ids.clear();
    } else {
      self.ids = view.iter().copied().collect();
    }
  }

  pub fn all_selected(&self, view: &[EntryId]) -> bool {
    !view.is_empty() && view.iter().all(|id| self.ids.contains(id))
  }

  pub fn contains(&self, id: EntryId) -> bool {
    self.ids.contains(&id)
  }

  pub fn clear(&mut self) {
    self.ids.clear();
  }

  pub fn len(&self) -> usize {
    self.ids.len()
  }

  pub fn is_empty(&self) -> bool {
    self.ids.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = EntryId> + '_ {
    self.ids.iter().copied()
  }
}
