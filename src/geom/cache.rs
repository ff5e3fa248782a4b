//! Per-extraction cache of crossing vertices on lattice edges.
//!
//! Neighbouring cubes share lattice edges. Keying the cache by the lattice
//! edge itself, rather than by `(cube, local edge)`, makes every cube that
//! touches an edge resolve to the same vertex index.

use std::collections::HashMap;

use super::marching_cubes::tables::{CORNER_OFFSETS, EDGE_CORNERS};

/// A lattice edge: its lower endpoint and the axis it runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    pub x: usize,
    pub y: usize,
    pub z: usize,
    pub axis: u8,
}

impl EdgeKey {
    /// Canonical key of local edge `edge` (0..12) of cube `(i, j, k)`.
    #[must_use]
    pub fn for_cube_edge(i: usize, j: usize, k: usize, edge: usize) -> Self {
        let [a, b] = EDGE_CORNERS[edge];
        let (oa, ob) = (CORNER_OFFSETS[a], CORNER_OFFSETS[b]);
        let axis = if oa[0] != ob[0] {
            0
        } else if oa[1] != ob[1] {
            1
        } else {
            2
        };
        Self {
            x: i + oa[0].min(ob[0]),
            y: j + oa[1].min(ob[1]),
            z: k + oa[2].min(ob[2]),
            axis,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeCacheStats {
    pub entries: usize,
    pub hits: usize,
    pub misses: usize,
}

impl EdgeCacheStats {
    /// Returns 0.0 if the cache was never queried.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Maps lattice edges to emitted vertex indices for a single extraction.
#[derive(Debug, Default)]
pub struct EdgeVertexCache {
    vertices: HashMap<EdgeKey, u32>,
    hits: usize,
    misses: usize,
}

impl EdgeVertexCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the vertex cached for `key`, calling `emit` on first use.
    pub fn get_or_insert_with(&mut self, key: EdgeKey, emit: impl FnOnce() -> u32) -> u32 {
        if let Some(&index) = self.vertices.get(&key) {
            self.hits += 1;
            return index;
        }
        self.misses += 1;
        let index = emit();
        self.vertices.insert(key, index);
        index
    }

    #[must_use]
    pub fn stats(&self) -> EdgeCacheStats {
        EdgeCacheStats {
            entries: self.vertices.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}
