//! Ordered in-memory recommendation store

use std::fmt;

use uuid::Uuid;

use crate::model::Recommendation;
use crate::normalize::{normalize, Normalized};

/// Store-assigned identity of a record. Never reused within a process,
/// including across refetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(u64);

impl fmt::Display for EntryId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

#[derive(Debug, Clone)]
pub struct Entry {
  id: EntryId,
  pub recommendation: Recommendation,
  pub normalized: Normalized,
}

impl Entry {
  pub fn id(&self) -> EntryId {
    self.id
  }
}

#[derive(Debug, Default)]
pub struct Store {
  entries: Vec<Entry>,
  next_id: u64,
}

impl Store {
  pub fn new() -> Self {
    Self::default()
  }

  /// Drop every record. Ids keep counting up.
  pub fn clear(&mut self) {
    self.entries.clear();
  }

  /// Replace the contents with a freshly fetched batch, normalizing each record
  pub fn replace(&mut self, recommendations: Vec<Recommendation>) {
    self.entries.clear();
    for recommendation in recommendations {
      let id = EntryId(self.next_id);
      self.next_id += 1;
      let normalized = normalize(&recommendation);
      self.entries.push(Entry { id, recommendation, normalized });
    }
  }

  pub fn entries(&self) -> &[Entry] {
    &self.entries
  }

  pub fn entries_mut(&mut self) -> impl Iterator<Item = &mut Entry> {
    self.entries.iter_mut()
  }

  pub fn get(&self, id: EntryId) -> Option<&Entry> {
    self.entries.iter().find(|e| e.id == id)
  }

  pub fn get_mut(&mut self, id: EntryId) -> Option<&mut Entry> {
    self.entries.iter_mut().find(|e| e.id == id)
  }

  /// Return the record's uuid, generating one first if it has none
  pub fn ensure_uuid(&mut self, id: EntryId) -> Option<String> {
    let entry = self.get_mut(id)?;
    let uuid = entry.recommendation.uuid.get_or_insert_with(|| Uuid::new_v4().to_string());
    Some(uuid.clone())
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}
