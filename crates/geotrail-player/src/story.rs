//! Narrative entries attached to a player.

use geotrail_types::StoryItem;

/// A player's story: narrative items in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Story {
    items: Vec<StoryItem>,
}

impl Story {
    /// Create an empty story.
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append an item.
    pub fn add(&mut self, item: StoryItem) {
        self.items.push(item);
    }

    /// Drop every item.
    pub fn reset(&mut self) {
        self.items.clear();
    }

    pub(crate) fn replace(&mut self, items: Vec<StoryItem>) {
        self.items = items;
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the story has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &StoryItem> {
        self.items.iter()
    }

    /// All items as a slice.
    pub fn as_slice(&self) -> &[StoryItem] {
        &self.items
    }
}
