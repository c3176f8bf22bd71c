//! Animation frame expansion.
//!
//! Every frame of an animated tile becomes its own face in the exported mesh. The
//! frames are stacked along Z so the consumer can pick the visible one without a
//! runtime script: the first frame sits at `+unique_id`, every later frame at
//! `-unique_id`.

use crate::error::ExportError;
use crate::model::{Frame, Map, Tile};

/// A tile to draw together with its signed depth.
#[derive(Debug, Clone, Copy)]
pub struct TileFrame<'m> {
    pub tile: &'m Tile,
    pub depth: i64,
}

/// Lazy, finite iterator over the frames of one tile.
///
/// Call [`expand_frames`] again to restart from the first frame.
#[derive(Debug, Clone)]
pub struct TileFrames<'m> {
    map: &'m Map,
    tile: &'m Tile,
    next: usize,
}

/// Expand a tile into its frames.
///
/// Static tiles yield a single frame at depth 0. Animated tiles yield one frame per
/// animation frame, resolving each frame's tile through the map registry; an
/// unresolvable frame yields [`ExportError::UnknownFrameTile`].
pub fn expand_frames<'m>(map: &'m Map, tile: &'m Tile) -> TileFrames<'m> {
    TileFrames { map, tile, next: 0 }
}

impl<'m> TileFrames<'m> {
    fn frames(&self) -> Option<&'m [Frame]> {
        self.tile
            .animation
            .as_ref()
            .map(|animation| animation.frames.as_slice())
            .filter(|frames| !frames.is_empty())
    }

    fn frame_count(&self) -> usize {
        self.frames().map_or(1, <[Frame]>::len)
    }
}

impl<'m> Iterator for TileFrames<'m> {
    type Item = Result<TileFrame<'m>, ExportError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.frame_count() {
            return None;
        }
        let index = self.next;
        self.next += 1;

        let Some(frames) = self.frames() else {
            return Some(Ok(TileFrame {
                tile: self.tile,
                depth: 0,
            }));
        };

        let frame = frames[index];
        let Some(resolved) = self.map.tiles.get(&frame.gid) else {
            return Some(Err(ExportError::UnknownFrameTile {
                owner: self.tile.gid,
                gid: frame.gid,
            }));
        };

        let id = i64::from(frame.unique_id);
        let depth = if index == 0 { id } else { -id };
        Some(Ok(TileFrame {
            tile: resolved,
            depth,
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.frame_count() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TileFrames<'_> {}

/// Hands out the export-wide unique frame identifiers.
///
/// Identifiers start at 1 and increase by one per allocated frame. A fresh
/// allocator is owned by whoever builds the map model.
#[derive(Debug, Clone)]
pub struct FrameIdAllocator {
    next: u32,
}

impl Default for FrameIdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl FrameIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a [`Frame`] with the next identifier.
    pub fn frame(&mut self, gid: u32, duration_ms: u32) -> Frame {
        let unique_id = self.next;
        self.next += 1;
        Frame {
            gid,
            unique_id,
            duration_ms,
        }
    }
}
