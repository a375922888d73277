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

//! Raw per-frame signals consumed by the control policies.

use crate::lighting_envelope::LightingSignal;

/// Capability availability observed by the scene/runtime layer this frame.
///
/// These are raw booleans: they may flicker from one frame to the next, which
/// is why every policy routes them through a promotion gate.
#[derive(Debug, Clone, Default)]
pub struct FrameSignals {
    /// Monotonic frame index.
    pub frame_index: u64,
    /// Ray-tracing hardware is present and the device exposes it.
    pub ray_tracing_available: bool,
    /// GI resources (probe volumes, history buffers) are resident.
    pub gi_resources_resident: bool,
    /// Physically based light units are supported by the current exposure setup.
    pub physical_units_supported: bool,
    /// Emissive surfaces are requested by the scene.
    pub emissive_requested: bool,
    /// Emissive surfaces are actually injected as lights.
    pub emissive_active: bool,
    /// Number of local (point/spot) lights in the frame.
    pub local_light_count: u32,
    /// Extra lighting signals supplied directly by the host.
    pub lighting: Vec<LightingSignal>,
}

impl FrameSignals {
    /// Creates signals for the given frame with every capability unavailable.
    pub fn new(frame_index: u64) -> Self {
        Self {
            frame_index,
            ..Default::default()
        }
    }

    /// Returns `true` if the local light count exceeds the given budget.
    pub fn exceeds_light_budget(&self, budget: u32) -> bool {
        self.local_light_count > budget
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_signals_have_nothing_available() {
        let signals = FrameSignals::new(42);
        assert_eq!(signals.frame_index, 42);
        assert!(!signals.ray_tracing_available);
        assert!(!signals.gi_resources_resident);
        assert!(signals.lighting.is_empty());
    }

    #[test]
    fn test_light_budget_is_strictly_exceeded() {
        let mut signals = FrameSignals::new(0);
        signals.local_light_count = 16;
        assert!(!signals.exceeds_light_budget(16));
        signals.local_light_count = 17;
        assert!(signals.exceeds_light_budget(16));
    }
}
