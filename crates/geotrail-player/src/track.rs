//! Append-only sequence of recorded positions.
//!
//! Insertion order is arrival order. Positions are never reordered or
//! deduplicated: two readings with identical coordinates and timestamp are
//! kept as two entries. The only way to shrink a track is [`Track::reset`].

use geotrail_types::Position;

/// A player's recorded positions in arrival order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    positions: Vec<Position>,
}

impl Track {
    /// Create an empty track.
    pub const fn new() -> Self {
        Self {
            positions: Vec::new(),
        }
    }

    /// Append a position at the end of the track.
    pub fn add(&mut self, position: Position) {
        self.positions.push(position);
    }

    /// Drop every position.
    pub fn reset(&mut self) {
        self.positions.clear();
    }

    /// Replace the whole track, keeping the given order.
    pub(crate) fn replace(&mut self, positions: Vec<Position>) {
        self.positions = positions;
    }

    /// Number of recorded positions.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// The most recent position.
    pub fn last(&self) -> Option<&Position> {
        self.positions.last()
    }

    /// The position at `index`, oldest first.
    pub fn get(&self, index: usize) -> Option<&Position> {
        self.positions.get(index)
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter()
    }

    /// All positions as a slice.
    pub fn as_slice(&self) -> &[Position] {
        &self.positions
    }
}

impl Extend<Position> for Track {
    fn extend<I: IntoIterator<Item = Position>>(&mut self, iter: I) {
        self.positions.extend(iter);
    }
}
