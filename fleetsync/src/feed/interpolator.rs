//! Frame interpolation between two snapshots.
//!
//! [`interpolate`] returns a lazy [`Frames`] iterator of `frame_count + 1`
//! snapshots moving every entity of `next` from its previous position to its
//! new one in equal steps:
//!
//! ```text
//! position(k) = previous + (next - previous) * k / frame_count,  k in 0..=frame_count
//! ```
//!
//! - Entities only in `next` sit at their `next` position in every frame.
//! - Entities only in `previous` are dropped from every frame.
//! - Frame `frame_count` equals `next` exactly.
//!
//! The interpolator knows nothing about time; pacing belongs to the caller.

use std::collections::HashMap;

use super::snapshot::{EntityId, Position, Snapshot};

/// Build the frame sequence from `previous` to `next`.
///
/// With `frame_count == 0` the sequence is the single snapshot `next`.
pub fn interpolate(previous: Option<&Snapshot>, next: &Snapshot, frame_count: usize) -> Frames {
    let lookup: HashMap<&EntityId, Position> = previous
        .map(|p| p.iter().map(|e| (&e.id, e.position)).collect())
        .unwrap_or_default();

    let origins = next
        .iter()
        .map(|e| lookup.get(&e.id).copied())
        .collect();

    Frames {
        origins,
        target: next.clone(),
        frame_count,
        index: 0,
    }
}

/// Lazy, finite sequence of interpolated frames.
///
/// Not restartable: each call to [`interpolate`] produces a fresh sequence.
#[derive(Debug, Clone)]
pub struct Frames {
    /// Starting position of each entity of `target`, aligned by index.
    /// `None` for entities with no previous position.
    origins: Vec<Option<Position>>,
    target: Snapshot,
    frame_count: usize,
    index: usize,
}

impl Frames {
    fn frame_at(&self, k: usize) -> Snapshot {
        if self.frame_count == 0 || k >= self.frame_count {
            return self.target.clone();
        }

        let t = k as f64 / self.frame_count as f64;
        let entities = self
            .target
            .iter()
            .zip(&self.origins)
            .map(|(entity, origin)| match origin {
                Some(from) => entity.moved_to(from.lerp(&entity.position, t)),
                None => entity.clone(),
            })
            .collect();

        Snapshot::new(entities)
    }
}

impl Iterator for Frames {
    type Item = Snapshot;

    fn next(&mut self) -> Option<Snapshot> {
        if self.index > self.frame_count {
            return None;
        }
        let frame = self.frame_at(self.index);
        self.index += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.frame_count + 1).saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Frames {}

impl std::iter::FusedIterator for Frames {}
