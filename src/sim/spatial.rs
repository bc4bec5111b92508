//! Uniform-grid spatial index over number entities
//!
//! Buckets entity ids by world-space cell so visibility culling and capture
//! broad-phase run against O(visible) candidates instead of the whole grid.
//! The index stores ids only; entity attributes stay with the world model,
//! which is the single source of truth.

use std::collections::HashMap;

use glam::Vec2;

use super::geom::Rect;

/// Fallback cell size when a caller hands us a non-positive one
const MIN_CELL_SIZE: f32 = 1.0;

/// Inclusive range of grid cells an entity footprint covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellSpan {
    min: (i32, i32),
    max: (i32, i32),
}

impl CellSpan {
    fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let (x0, y0) = self.min;
        let (x1, y1) = self.max;
        (y0..=y1).flat_map(move |cy| (x0..=x1).map(move |cx| (cx, cy)))
    }
}

/// Uniform grid bucketing of entity ids
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    /// Half-extent of an entity footprint; entities spanning a cell boundary
    /// land in every overlapped bucket
    half_extent: f32,
    buckets: HashMap<(i32, i32), Vec<u32>>,
    spans: HashMap<u32, CellSpan>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32, half_extent: f32) -> Self {
        let cell_size = if cell_size > 0.0 {
            cell_size
        } else {
            log::warn!("spatial cell size {cell_size} out of range, clamping to {MIN_CELL_SIZE}");
            MIN_CELL_SIZE
        };
        Self {
            cell_size,
            half_extent: half_extent.max(0.0),
            buckets: HashMap::new(),
            spans: HashMap::new(),
        }
    }

    fn cell_of(&self, p: Vec2) -> (i32, i32) {
        (
            (p.x / self.cell_size).floor() as i32,
            (p.y / self.cell_size).floor() as i32,
        )
    }

    fn span_of(&self, center: Vec2) -> CellSpan {
        let h = Vec2::splat(self.half_extent);
        CellSpan {
            min: self.cell_of(center - h),
            max: self.cell_of(center + h),
        }
    }

    fn span_of_rect(&self, rect: &Rect) -> CellSpan {
        CellSpan {
            min: self.cell_of(rect.min),
            max: self.cell_of(rect.max),
        }
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of indexed entities
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
        self.spans.clear();
    }

    /// Insert an id at a position. Re-inserting an existing id moves it.
    pub fn insert(&mut self, id: u32, center: Vec2) {
        if self.spans.contains_key(&id) {
            self.remove(id);
        }
        let span = self.span_of(center);
        for cell in span.cells() {
            self.buckets.entry(cell).or_default().push(id);
        }
        self.spans.insert(id, span);
    }

    /// Remove an id; unknown ids are a no-op
    pub fn remove(&mut self, id: u32) {
        let Some(span) = self.spans.remove(&id) else {
            return;
        };
        for cell in span.cells() {
            if let Some(bucket) = self.buckets.get_mut(&cell) {
                bucket.retain(|&e| e != id);
                if bucket.is_empty() {
                    self.buckets.remove(&cell);
                }
            }
        }
    }

    /// Move an id to a new position, short-circuiting when cell membership
    /// is unchanged (the common case for sub-cell motion)
    pub fn update(&mut self, id: u32, center: Vec2) {
        let new_span = self.span_of(center);
        if self.spans.get(&id) == Some(&new_span) {
            return;
        }
        self.remove(id);
        for cell in new_span.cells() {
            self.buckets.entry(cell).or_default().push(id);
        }
        self.spans.insert(id, new_span);
    }

    /// All ids whose buckets overlap `rect`, deduplicated and sorted.
    /// Querying an empty index returns an empty vec.
    pub fn query_rect(&self, rect: &Rect) -> Vec<u32> {
        let mut out = Vec::new();
        for cell in self.span_of_rect(rect).cells() {
            if let Some(bucket) = self.buckets.get(&cell) {
                out.extend_from_slice(bucket);
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Ids bucketed around a single point
    pub fn query_point(&self, p: Vec2) -> Vec<u32> {
        self.query_rect(&Rect::from_origin_size(p, Vec2::ZERO))
    }
}
