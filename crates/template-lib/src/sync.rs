//! Field-array synchronization
//!
//! Keeps dynamic-length arrays consistent with their companion count
//! fields. Arrays grow by appending default elements and shrink by removing
//! from the tail one index at a time, so elements that are not affected by a
//! count change keep their in-flight values.

use serde::{Deserialize, Serialize};

/// Maximum number of GPUs a training event may request
pub const MAX_GPUS: i64 = 16;

/// Minimum number of training events per session
pub const MIN_TRAINING_EVENTS: i64 = 0;

/// Largest training-event count a single edit may request for one session
pub const MAX_TRAINING_EVENTS: usize = 100_000;

/// Largest session count a single edit may request
pub const MAX_SESSIONS: usize = 100_000;

/// Resize `items` to `new_len` in place
///
/// Returns the number of elements appended (positive) or removed (negative).
pub fn resize<T, F>(items: &mut Vec<T>, new_len: usize, mut factory: F) -> isize
where
    F: FnMut() -> T,
{
    let old_len = items.len();

    while items.len() < new_len {
        items.push(factory());
    }
    while items.len() > new_len {
        items.remove(items.len() - 1);
    }

    new_len as isize - old_len as isize
}

/// Clamp a requested GPU count to the valid array length
pub fn clamp_gpu_count(requested: i64) -> usize {
    requested.clamp(0, MAX_GPUS) as usize
}

/// Clamp a requested training-event count to the valid array length
pub fn clamp_training_count(requested: i64) -> usize {
    requested.max(MIN_TRAINING_EVENTS) as usize
}

/// Re-point a cursor at a valid index after the array changed length
///
/// Cursors past the end are moved to the last element; an empty array
/// leaves the cursor at 0.
pub fn clamp_cursor(cursor: usize, len: usize) -> usize {
    cursor.min(len.saturating_sub(1))
}

/// Tab bookkeeping for the session editor
///
/// One tab per session, in session order. Tab names are never reused
/// while the form is open: `next_number` only grows until the tabs are
/// rebuilt from a new tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTabs {
    names: Vec<String>,
    active: usize,
    next_number: usize,
}

impl SessionTabs {
    /// Tabs for a tree with `count` sessions
    pub fn new(count: usize) -> Self {
        Self {
            names: (1..=count).map(tab_name).collect(),
            active: 0,
            next_number: count + 1,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn next_number(&self) -> usize {
        self.next_number
    }

    /// Append a tab and make it active
    pub fn push(&mut self) -> usize {
        self.names.push(tab_name(self.next_number));
        self.next_number += 1;
        self.active = self.names.len() - 1;
        self.active
    }

    /// Remove the tab at `index`; the active index is clamped to the new length
    pub fn remove(&mut self, index: usize) {
        if index < self.names.len() {
            self.names.remove(index);
        }
        self.active = clamp_cursor(self.active, self.names.len());
    }

    /// Remove tabs from the tail until `len` remain
    pub fn truncate(&mut self, len: usize) {
        while self.names.len() > len {
            self.names.remove(self.names.len() - 1);
        }
        self.active = clamp_cursor(self.active, self.names.len());
    }

    /// Select a tab; out-of-range selections are ignored
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.names.len() {
            self.active = index;
            true
        } else {
            false
        }
    }

    /// Rebuild tab names for a freshly imported tree of `count` sessions
    ///
    /// The active tab is kept unless it now points past the end.
    pub fn rebuild(&mut self, count: usize) {
        self.names = (1..=count).map(tab_name).collect();
        self.next_number = count + 1;
        if self.active >= count {
            self.active = count.saturating_sub(1);
        }
    }
}

impl Default for SessionTabs {
    fn default() -> Self {
        Self::new(1)
    }
}

fn tab_name(number: usize) -> String {
    format!("Session {}", number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_grows_with_defaults() {
        let mut items = vec![1, 2];
        let delta = resize(&mut items, 5, || 9);

        assert_eq!(delta, 3);
        assert_eq!(items, vec![1, 2, 9, 9, 9]);
    }

    #[test]
    fn test_resize_shrinks_from_tail() {
        let mut items = vec![1, 2, 3, 4, 5];
        let delta = resize(&mut items, 2, || 0);

        assert_eq!(delta, -3);
        assert_eq!(items, vec![1, 2]);
    }

    #[test]
    fn test_resize_same_length_is_noop() {
        let mut items = vec![7, 8];
        assert_eq!(resize(&mut items, 2, || 0), 0);
        assert_eq!(items, vec![7, 8]);
    }

    #[test]
    fn test_count_clamping() {
        assert_eq!(clamp_gpu_count(-3), 0);
        assert_eq!(clamp_gpu_count(8), 8);
        assert_eq!(clamp_gpu_count(17), 16);
        assert_eq!(clamp_training_count(-1), 0);
        assert_eq!(clamp_training_count(12), 12);
    }

    #[test]
    fn test_clamp_cursor() {
        assert_eq!(clamp_cursor(3, 5), 3);
        assert_eq!(clamp_cursor(3, 2), 1);
        assert_eq!(clamp_cursor(3, 0), 0);
    }

    #[test]
    fn test_tabs_push_activates_new_tab() {
        let mut tabs = SessionTabs::new(1);
        let idx = tabs.push();

        assert_eq!(idx, 1);
        assert_eq!(tabs.active(), 1);
        assert_eq!(tabs.names(), &["Session 1".to_string(), "Session 2".to_string()]);
    }

    #[test]
    fn test_tabs_remove_clamps_active() {
        let mut tabs = SessionTabs::new(3);
        tabs.select(2);
        tabs.remove(2);
        assert_eq!(tabs.active(), 1);

        // Removing a tab before the active one keeps the numeric index when valid
        let mut tabs = SessionTabs::new(3);
        tabs.select(1);
        tabs.remove(0);
        assert_eq!(tabs.active(), 1);
        assert_eq!(tabs.names(), &["Session 2".to_string(), "Session 3".to_string()]);
    }

    #[test]
    fn test_tab_numbers_not_reused() {
        let mut tabs = SessionTabs::new(2);
        tabs.remove(1);
        tabs.push();
        assert_eq!(tabs.names()[1], "Session 3");
    }

    #[test]
    fn test_rebuild_clamps_active_past_end() {
        let mut tabs = SessionTabs::new(4);
        tabs.select(3);
        tabs.rebuild(2);

        assert_eq!(tabs.active(), 1);
        assert_eq!(tabs.next_number(), 3);
        assert_eq!(tabs.len(), 2);
    }
}
