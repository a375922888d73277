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

//! Defines the shadow atlas value types.
//!
//! The shadow atlas is a single square depth texture shared by every
//! shadow-casting local light. Each light owns one square, power-of-two tile.
//! The caller keeps the atlas state across frames as a list of
//! [`ExistingAllocation`]s; the planner in `vesta-lanes` is stateless and
//! returns fresh [`Allocation`]s every frame.

use serde::{Deserialize, Serialize};

/// Smallest atlas edge, in pixels.
pub const MIN_ATLAS_SIZE: u32 = 256;
/// Largest atlas edge, in pixels.
pub const MAX_ATLAS_SIZE: u32 = 4096;
/// Smallest tile edge, in pixels. Also the occupancy grid cell size.
pub const MIN_TILE_SIZE: u32 = 64;

/// A light's request for a shadow tile this frame.
///
/// # Examples
///
/// ```
/// use vesta_core::renderer::shadow::ShadowTileRequest;
///
/// let request = ShadowTileRequest::new("spotA", 512, 120);
/// assert_eq!(request.tile_size, 512);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShadowTileRequest {
    /// The light id. Blank ids are ignored by the planner.
    pub id: String,
    /// Requested tile edge in pixels, before normalization.
    pub tile_size: u32,
    /// The last frame index at which the light was visible.
    pub last_visible_frame: u64,
}

impl ShadowTileRequest {
    /// Creates a new request.
    pub fn new(id: impl Into<String>, tile_size: u32, last_visible_frame: u64) -> Self {
        Self {
            id: id.into(),
            tile_size,
            last_visible_frame,
        }
    }
}

/// A tile placement carried over from a previous frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExistingAllocation {
    /// The light id owning the tile.
    pub id: String,
    /// Left edge of the tile, in pixels.
    pub x: u32,
    /// Top edge of the tile, in pixels.
    pub y: u32,
    /// Tile edge, in pixels.
    pub tile_size: u32,
    /// The last frame index at which the light was visible.
    pub last_visible_frame: u64,
}

impl ExistingAllocation {
    /// Creates a new existing allocation.
    pub fn new(
        id: impl Into<String>,
        x: u32,
        y: u32,
        tile_size: u32,
        last_visible_frame: u64,
    ) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            tile_size,
            last_visible_frame,
        }
    }
}

/// A tile placement produced by the planner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Allocation {
    /// The light id owning the tile.
    pub id: String,
    /// Left edge of the tile, in pixels.
    pub x: u32,
    /// Top edge of the tile, in pixels.
    pub y: u32,
    /// Tile edge, in pixels.
    pub tile_size: u32,
}

impl Allocation {
    /// Creates a new allocation.
    pub fn new(id: impl Into<String>, x: u32, y: u32, tile_size: u32) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            tile_size,
        }
    }

    /// Returns `true` if the two tiles share at least one pixel.
    pub fn overlaps(&self, other: &Allocation) -> bool {
        self.x < other.x + other.tile_size
            && other.x < self.x + self.tile_size
            && self.y < other.y + other.tile_size
            && other.y < self.y + self.tile_size
    }

    /// Returns `true` if the tile lies fully inside an atlas of the given edge.
    pub fn fits_within(&self, atlas_size: u32) -> bool {
        self.x
            .checked_add(self.tile_size)
            .is_some_and(|right| right <= atlas_size)
            && self
                .y
                .checked_add(self.tile_size)
                .is_some_and(|bottom| bottom <= atlas_size)
    }

    /// Normalized `[u0, v0, u1, v1]` sampling rectangle inside the atlas.
    pub fn uv_rect(&self, atlas_size: u32) -> [f32; 4] {
        let size = atlas_size.max(1) as f32;
        [
            self.x as f32 / size,
            self.y as f32 / size,
            (self.x + self.tile_size) as f32 / size,
            (self.y + self.tile_size) as f32 / size,
        ]
    }
}

/// Clamps a requested atlas edge to `[256, 4096]` and rounds it up to a power of two.
pub fn normalize_atlas_size(requested: u32) -> u32 {
    requested
        .clamp(MIN_ATLAS_SIZE, MAX_ATLAS_SIZE)
        .next_power_of_two()
}

/// Clamps a requested tile edge to `[64, atlas_size]` and rounds it up to a power of two.
///
/// `atlas_size` is expected to be normalized already.
pub fn normalize_tile_size(requested: u32, atlas_size: u32) -> u32 {
    requested
        .clamp(MIN_TILE_SIZE, atlas_size.max(MIN_TILE_SIZE))
        .next_power_of_two()
        .min(atlas_size.max(MIN_TILE_SIZE))
}
