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

//! Global illumination promotion policy.

use crate::context::FrameSignals;
use crate::gate::{GateSnapshot, GatedFeature, PromotionGate};
use vesta_core::renderer::{GateThresholds, GiMode};
use vesta_core::telemetry::Diagnostic;

/// The outcome of one GI policy update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GiPromotionSnapshot {
    /// The configured GI mode.
    pub requested: GiMode,
    /// The mode that can actually run this frame.
    pub effective: GiMode,
    /// The gate decision.
    pub gate: GateSnapshot,
}

impl GiPromotionSnapshot {
    /// Diagnostics raised by this update.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.gate.diagnostics()
    }
}

/// Watches whether the configured GI mode is actually running.
///
/// The feature is expected whenever configuration requests any GI mode. It
/// is active when the mode's requirements are met this frame: resident GI
/// resources for every mode, plus enabled and available ray tracing for
/// [`GiMode::RayTraced`].
#[derive(Debug, Clone)]
pub struct GiPromotionPolicy {
    gate: PromotionGate,
    thresholds: GateThresholds,
}

impl GiPromotionPolicy {
    /// Creates a policy with a fresh gate.
    pub fn new(thresholds: GateThresholds) -> Self {
        Self {
            gate: PromotionGate::new(GatedFeature::GlobalIllumination),
            thresholds,
        }
    }

    /// Replaces the thresholds without touching gate state.
    pub fn set_thresholds(&mut self, thresholds: GateThresholds) {
        self.thresholds = thresholds;
    }

    /// The mode that can run given this frame's signals.
    pub fn effective_mode(
        requested: GiMode,
        signals: &FrameSignals,
        ray_tracing_enabled: bool,
    ) -> GiMode {
        if !signals.gi_resources_resident {
            return GiMode::Off;
        }
        match requested {
            GiMode::RayTraced if ray_tracing_enabled && signals.ray_tracing_available => {
                GiMode::RayTraced
            }
            GiMode::RayTraced => GiMode::ScreenSpace,
            other => other,
        }
    }

    /// Advances the gate by one frame.
    pub fn update(
        &mut self,
        requested: GiMode,
        signals: &FrameSignals,
        ray_tracing_enabled: bool,
    ) -> GiPromotionSnapshot {
        let effective = Self::effective_mode(requested, signals, ray_tracing_enabled);
        let expected = requested != GiMode::Off;
        let active = expected && effective == requested;
        let gate = self.gate.update(expected, active, &self.thresholds);
        GiPromotionSnapshot {
            requested,
            effective,
            gate,
        }
    }

    /// Resets the gate (backend reinitialization).
    pub fn reset(&mut self) {
        self.gate.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resident(rt: bool) -> FrameSignals {
        FrameSignals {
            gi_resources_resident: true,
            ray_tracing_available: rt,
            ..FrameSignals::new(0)
        }
    }

    #[test]
    fn off_is_never_expected() {
        let mut policy = GiPromotionPolicy::new(GateThresholds::new(1, 5, 1));
        let snap = policy.update(GiMode::Off, &resident(true), true);
        assert!(!snap.gate.expected);
        assert!(!snap.gate.breached);
        assert_eq!(snap.effective, GiMode::Off);
    }

    #[test]
    fn ray_traced_without_hardware_falls_back_and_breaches() {
        let mut policy = GiPromotionPolicy::new(GateThresholds::new(2, 5, 1));
        let first = policy.update(GiMode::RayTraced, &resident(false), true);
        assert_eq!(first.effective, GiMode::ScreenSpace);
        assert!(!first.gate.breached);
        let second = policy.update(GiMode::RayTraced, &resident(false), true);
        assert!(second.gate.breached);
        assert_eq!(
            second.diagnostics()[0].code,
            "GI_PROMOTION_ENVELOPE_BREACH"
        );
    }

    #[test]
    fn ray_traced_with_hardware_becomes_promotion_ready() {
        let mut policy = GiPromotionPolicy::new(GateThresholds::new(2, 5, 2));
        assert!(!policy.update(GiMode::RayTraced, &resident(true), true).gate.promotion_ready);
        let snap = policy.update(GiMode::RayTraced, &resident(true), true);
        assert!(snap.gate.promotion_ready);
        assert_eq!(snap.effective, GiMode::RayTraced);
    }

    #[test]
    fn missing_resources_disable_every_mode() {
        let signals = FrameSignals::new(0);
        assert_eq!(
            GiPromotionPolicy::effective_mode(GiMode::Probe, &signals, true),
            GiMode::Off
        );
    }

    #[test]
    fn disabled_ray_tracing_counts_as_inactive() {
        let mut policy = GiPromotionPolicy::new(GateThresholds::new(1, 5, 1));
        let snap = policy.update(GiMode::RayTraced, &resident(true), false);
        assert!(snap.gate.breached);
    }
}
