//! Marked-frame selection.
//!
//! [`FrameSelection`] is the set of frame indices the user has marked for
//! export. It is independent of cache residency, and every listing is in
//! ascending frame order regardless of the order frames were marked in.

use std::collections::BTreeSet;

/// A set of marked frame indices.
///
/// # Example
///
/// ```
/// use framepick::FrameSelection;
///
/// let mut selection = FrameSelection::new();
/// selection.toggle(5);
/// selection.toggle(0);
/// selection.toggle(2);
/// assert_eq!(selection.sorted(), vec![0, 2, 5]);
///
/// selection.toggle(2);
/// assert_eq!(selection.sorted(), vec![0, 5]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameSelection {
    frames: BTreeSet<u64>,
}

impl FrameSelection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `frame_index` if unmarked, unmark it otherwise.
    ///
    /// Returns `true` if the frame is marked afterwards.
    pub fn toggle(&mut self, frame_index: u64) -> bool {
        if self.frames.remove(&frame_index) {
            false
        } else {
            self.frames.insert(frame_index);
            true
        }
    }

    /// Mark `frame_index`. Returns `false` if it was already marked.
    pub fn add(&mut self, frame_index: u64) -> bool {
        self.frames.insert(frame_index)
    }

    /// Unmark `frame_index`. Returns `false` if it was not marked.
    pub fn remove(&mut self, frame_index: u64) -> bool {
        self.frames.remove(&frame_index)
    }

    /// Unmark everything.
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Whether `frame_index` is marked.
    pub fn contains(&self, frame_index: u64) -> bool {
        self.frames.contains(&frame_index)
    }

    /// Number of marked frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether nothing is marked.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Marked frames in ascending order.
    pub fn sorted(&self) -> Vec<u64> {
        self.frames.iter().copied().collect()
    }

    /// Iterate over marked frames in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.frames.iter().copied()
    }

    /// The marked frame at `position` in ascending order, as shown in a
    /// sorted listing.
    pub fn nth(&self, position: usize) -> Option<u64> {
        self.frames.iter().nth(position).copied()
    }
}

impl Extend<u64> for FrameSelection {
    fn extend<I: IntoIterator<Item = u64>>(&mut self, frames: I) {
        self.frames.extend(frames);
    }
}

impl FromIterator<u64> for FrameSelection {
    fn from_iter<I: IntoIterator<Item = u64>>(frames: I) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }
}
