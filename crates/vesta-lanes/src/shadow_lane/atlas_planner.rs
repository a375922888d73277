// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Shadow atlas tile planner.
//!
//! Packs one square, power-of-two tile per shadow-casting light into a single
//! square atlas. Placements are kept stable across frames when a light keeps
//! its tile size, and lights that are no longer requested are evicted
//! least-recently-visible first when space runs out.
//!
//! The planner is a pure function: the caller owns the atlas state and feeds
//! it back every frame (see [`ShadowAtlasPlan::carry_forward`]).

use std::collections::{BTreeSet, HashMap, HashSet};

use vesta_core::renderer::shadow::{
    normalize_atlas_size, normalize_tile_size, Allocation, ExistingAllocation, ShadowTileRequest,
    MIN_TILE_SIZE,
};
use vesta_core::telemetry::Diagnostic;

/// Code of the warning raised for every request dropped from a full atlas.
pub const TILE_DROPPED_CODE: &str = "SHADOW_ATLAS_TILE_DROPPED";

/// The outcome of one planning run.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowAtlasPlan {
    /// The normalized atlas edge, in pixels.
    pub atlas_size: u32,
    /// Every tile in the atlas after planning, sorted by tile size
    /// (descending) then id.
    pub allocations: Vec<Allocation>,
    /// Ids of existing allocations evicted to make room, in eviction order.
    pub evicted_ids: Vec<String>,
    /// Ids of requests that could not be placed even after eviction.
    pub dropped_ids: Vec<String>,
    /// Covered fraction of the atlas area, in `[0, 1]`.
    pub utilization: f32,
}

impl ShadowAtlasPlan {
    /// Returns the tile owned by `id`, if any.
    pub fn lookup(&self, id: &str) -> Option<&Allocation> {
        self.allocations.iter().find(|a| a.id == id)
    }

    /// One warning per dropped request.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.dropped_ids
            .iter()
            .map(|id| {
                Diagnostic::warning(
                    TILE_DROPPED_CODE,
                    format!(
                        "shadow tile '{}' dropped: {}px atlas is full",
                        id, self.atlas_size
                    ),
                )
            })
            .collect()
    }

    /// Builds the existing-allocation list to feed into the next frame.
    ///
    /// The last-visible frame comes from this frame's request when the light
    /// was requested, otherwise from its entry in `previous`.
    pub fn carry_forward(
        &self,
        requests: &[ShadowTileRequest],
        previous: &[ExistingAllocation],
    ) -> Vec<ExistingAllocation> {
        let mut last_visible: HashMap<&str, u64> = HashMap::new();
        for entry in previous {
            last_visible.entry(entry.id.as_str()).or_insert(entry.last_visible_frame);
        }
        let mut requested = HashSet::new();
        for request in requests {
            if requested.insert(request.id.as_str()) {
                last_visible.insert(request.id.as_str(), request.last_visible_frame);
            }
        }

        self.allocations
            .iter()
            .map(|a| ExistingAllocation {
                id: a.id.clone(),
                x: a.x,
                y: a.y,
                tile_size: a.tile_size,
                last_visible_frame: last_visible.get(a.id.as_str()).copied().unwrap_or(0),
            })
            .collect()
    }
}

/// Dense occupancy grid in `MIN_TILE_SIZE` cells.
struct OccupancyGrid {
    cells_per_side: usize,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    fn new(atlas_size: u32) -> Self {
        let cells_per_side = (atlas_size / MIN_TILE_SIZE) as usize;
        Self {
            cells_per_side,
            cells: vec![false; cells_per_side * cells_per_side],
        }
    }

    fn cell_range(tile: &Allocation) -> (usize, usize, usize) {
        (
            (tile.x / MIN_TILE_SIZE) as usize,
            (tile.y / MIN_TILE_SIZE) as usize,
            (tile.tile_size / MIN_TILE_SIZE) as usize,
        )
    }

    fn is_free(&self, tile: &Allocation) -> bool {
        let (cx, cy, span) = Self::cell_range(tile);
        (cy..cy + span).all(|row| {
            let start = row * self.cells_per_side + cx;
            self.cells[start..start + span].iter().all(|used| !used)
        })
    }

    fn set(&mut self, tile: &Allocation, used: bool) {
        let (cx, cy, span) = Self::cell_range(tile);
        for row in cy..cy + span {
            let start = row * self.cells_per_side + cx;
            self.cells[start..start + span].fill(used);
        }
    }

    /// First free tile-aligned position, scanning rows top to bottom.
    fn first_fit(&self, id: &str, tile_size: u32, atlas_size: u32) -> Option<Allocation> {
        (0..atlas_size)
            .step_by(tile_size as usize)
            .flat_map(|y| {
                (0..atlas_size)
                    .step_by(tile_size as usize)
                    .map(move |x| (x, y))
            })
            .map(|(x, y)| Allocation::new(id, x, y, tile_size))
            .find(|candidate| self.is_free(candidate))
    }
}

/// An existing allocation that survived validation.
struct Seeded {
    tile: Allocation,
    last_visible_frame: u64,
}

fn is_valid_existing(existing: &ExistingAllocation, atlas_size: u32) -> bool {
    let size = existing.tile_size;
    !existing.id.trim().is_empty()
        && size >= MIN_TILE_SIZE
        && size <= atlas_size
        && size.is_power_of_two()
        && existing.x % size == 0
        && existing.y % size == 0
        && Allocation::new(existing.id.as_str(), existing.x, existing.y, size).fits_within(atlas_size)
}

/// Plans the shadow atlas for one frame.
///
/// * `atlas_size_request` is clamped to `[256, 4096]` and rounded up to a power of two.
/// * Requests with blank ids are ignored; repeated ids keep their first occurrence.
/// * Existing allocations that no longer fit the atlas are discarded silently.
/// * A request that cannot be placed, even after evicting every non-requested
///   tile, is dropped and listed in [`ShadowAtlasPlan::dropped_ids`].
pub fn plan(
    atlas_size_request: u32,
    requests: &[ShadowTileRequest],
    existing: &[ExistingAllocation],
) -> ShadowAtlasPlan {
    let atlas_size = normalize_atlas_size(atlas_size_request);

    // 1. Normalize requests.
    let mut seen_requests = HashSet::new();
    let mut candidates: Vec<(String, u32)> = requests
        .iter()
        .filter(|r| !r.id.trim().is_empty())
        .filter(|r| seen_requests.insert(r.id.as_str()))
        .map(|r| (r.id.clone(), normalize_tile_size(r.tile_size, atlas_size)))
        .collect();
    candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let requested: HashSet<&str> = candidates.iter().map(|(id, _)| id.as_str()).collect();

    // 2. Seed the grid from the previous frame.
    let mut grid = OccupancyGrid::new(atlas_size);
    let mut seeded: HashMap<String, Seeded> = HashMap::new();
    for entry in existing {
        if seeded.contains_key(&entry.id) || !is_valid_existing(entry, atlas_size) {
            continue;
        }
        let tile = Allocation::new(entry.id.as_str(), entry.x, entry.y, entry.tile_size);
        if !grid.is_free(&tile) {
            continue;
        }
        grid.set(&tile, true);
        seeded.insert(
            entry.id.clone(),
            Seeded {
                tile,
                last_visible_frame: entry.last_visible_frame,
            },
        );
    }

    // 3. Release tiles whose light changed size.
    for (id, tile_size) in &candidates {
        if let Some(previous) = seeded.get(id) {
            if previous.tile.tile_size != *tile_size {
                grid.set(&previous.tile, false);
                seeded.remove(id);
            }
        }
    }

    // Non-requested tiles, oldest first.
    let mut eviction_queue: Vec<(u64, String)> = seeded
        .iter()
        .filter(|(id, _)| !requested.contains(id.as_str()))
        .map(|(id, s)| (s.last_visible_frame, id.clone()))
        .collect();
    eviction_queue.sort();
    let mut eviction_queue = eviction_queue.into_iter();

    // 4. Place requests.
    let mut placed = Vec::with_capacity(candidates.len());
    let mut evicted_ids = Vec::new();
    let mut dropped_ids = Vec::new();
    for (id, tile_size) in &candidates {
        if let Some(previous) = seeded.get(id) {
            placed.push(previous.tile.clone());
            continue;
        }

        let mut fit = grid.first_fit(id, *tile_size, atlas_size);
        while fit.is_none() {
            let Some((_, victim)) = eviction_queue.next() else {
                break;
            };
            if let Some(removed) = seeded.remove(&victim) {
                grid.set(&removed.tile, false);
                evicted_ids.push(victim);
            }
            fit = grid.first_fit(id, *tile_size, atlas_size);
        }

        match fit {
            Some(tile) => {
                grid.set(&tile, true);
                placed.push(tile);
            }
            None => {
                log::warn!(
                    "Shadow atlas {}x{} is full: dropping tile '{}' ({}px)",
                    atlas_size,
                    atlas_size,
                    id,
                    tile_size
                );
                dropped_ids.push(id.clone());
            }
        }
    }

    // 5. Assemble the output.
    let mut allocations: Vec<Allocation> = seeded
        .into_values()
        .filter(|s| !requested.contains(s.tile.id.as_str()))
        .map(|s| s.tile)
        .chain(placed)
        .collect();
    allocations.sort_by(|a, b| b.tile_size.cmp(&a.tile_size).then_with(|| a.id.cmp(&b.id)));

    let mut unique = BTreeSet::new();
    evicted_ids.retain(|id| unique.insert(id.clone()));

    let covered: u64 = allocations
        .iter()
        .map(|a| u64::from(a.tile_size) * u64::from(a.tile_size))
        .sum();
    let total = u64::from(atlas_size) * u64::from(atlas_size);
    let utilization = (covered as f64 / total as f64).clamp(0.0, 1.0) as f32;

    log::debug!(
        "Shadow atlas planned: {} tiles, {} evicted, {} dropped, {:.1}% used",
        allocations.len(),
        evicted_ids.len(),
        dropped_ids.len(),
        utilization * 100.0
    );

    ShadowAtlasPlan {
        atlas_size,
        allocations,
        evicted_ids,
        dropped_ids,
        utilization,
    }
}
