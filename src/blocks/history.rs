//! Bounded undo/redo over full snapshots of the edited state.

use std::collections::VecDeque;

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Clone, Debug)]
pub struct EditHistory<T> {
  past: VecDeque<T>,
  present: T,
  future: Vec<T>,
  limit: usize,
}

impl<T: Clone + PartialEq> EditHistory<T> {
  /// `limit` is the number of undo steps kept; the oldest are discarded first.
  pub fn new(initial: T, limit: usize) -> Self {
    Self { past: VecDeque::new(), present: initial, future: Vec::new(), limit: limit.max(1) }
  }

  pub fn present(&self) -> &T {
    &self.present
  }

  /// Record a new state. Returns false (and records nothing) when it equals the current one.
  pub fn push(&mut self, next: T) -> bool {
    if next == self.present {
      return false;
    }
    let previous = std::mem::replace(&mut self.present, next);
    self.past.push_back(previous);
    while self.past.len() > self.limit {
      self.past.pop_front();
    }
    self.future.clear();
    true
  }

  pub fn undo(&mut self) -> bool {
    let Some(previous) = self.past.pop_back() else { return false };
    let current = std::mem::replace(&mut self.present, previous);
    self.future.push(current);
    true
  }

  pub fn redo(&mut self) -> bool {
    let Some(next) = self.future.pop() else { return false };
    let current = std::mem::replace(&mut self.present, next);
    self.past.push_back(current);
    true
  }

  pub fn can_undo(&self) -> bool {
    !self.past.is_empty()
  }

  pub fn can_redo(&self) -> bool {
    !self.future.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn undo_redo_walks_snapshots() {
    let mut h = EditHistory::new(0, 10);
    assert!(h.push(1));
    assert!(h.push(2));
    assert!(h.undo());
    assert_eq!(*h.present(), 1);
    assert!(h.undo());
    assert_eq!(*h.present(), 0);
    assert!(!h.undo());
    assert!(h.redo());
    assert_eq!(*h.present(), 1);
    assert!(h.can_redo());
  }

  #[test]
  fn new_edit_clears_redo() {
    let mut h = EditHistory::new("a", 10);
    h.push("b");
    h.undo();
    h.push("c");
    assert!(!h.can_redo());
    assert_eq!(*h.present(), "c");
  }

  #[test]
  fn identical_state_is_not_recorded() {
    let mut h = EditHistory::new(vec![1], 10);
    assert!(!h.push(vec![1]));
    assert!(!h.can_undo());
  }

  #[test]
  fn limit_drops_oldest() {
    let mut h = EditHistory::new(0, 2);
    for n in 1..=5 {
      h.push(n);
    }
    assert!(h.undo());
    assert!(h.undo());
    assert!(!h.undo());
    assert_eq!(*h.present(), 3);
  }
}
