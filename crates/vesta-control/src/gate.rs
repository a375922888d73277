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

//! The capability promotion gate.
//!
//! A promotion gate converts a noisy per-frame pair of booleans
//! (`expected`, `active`) into two stable decisions:
//!
//! - **breach**: the feature was expected but inactive for at least
//!   `warn_min_frames` consecutive frames, and no cooldown is running;
//! - **promotion-ready**: the feature was expected and active for at least
//!   `promotion_ready_min_frames` consecutive frames.
//!
//! The same state machine backs every adaptive feature. What differs per
//! feature is only its [`GatedFeature`] key, which supplies the name and the
//! warning-code prefix.

use serde::{Deserialize, Serialize};
use vesta_core::renderer::GateThresholds;
use vesta_core::telemetry::Diagnostic;

/// The feature a gate guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GatedFeature {
    /// Global illumination promotion.
    GlobalIllumination,
    /// One guarded capability of the lighting envelope.
    Lighting(LightingCapability),
}

impl GatedFeature {
    /// Human-readable feature name.
    pub fn name(&self) -> &'static str {
        match self {
            GatedFeature::GlobalIllumination => "global_illumination",
            GatedFeature::Lighting(capability) => capability.name(),
        }
    }

    /// Prefix of every warning code emitted for this feature.
    pub fn warning_prefix(&self) -> &'static str {
        match self {
            GatedFeature::GlobalIllumination => "GI_PROMOTION",
            GatedFeature::Lighting(capability) => capability.warning_prefix(),
        }
    }
}

/// A lighting capability whose runtime behavior is checked against configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LightingCapability {
    /// Shadowed local lights received an atlas tile.
    LocalShadows,
    /// Physically based light units are in effect.
    PhysicalUnits,
    /// Emissive surfaces contribute as lights.
    EmissiveLights,
    /// The local light count fits inside the configured budget.
    BudgetHeadroom,
}

impl LightingCapability {
    /// Every guarded capability, in evaluation order.
    pub const ALL: [LightingCapability; 4] = [
        LightingCapability::LocalShadows,
        LightingCapability::PhysicalUnits,
        LightingCapability::EmissiveLights,
        LightingCapability::BudgetHeadroom,
    ];

    /// Human-readable capability name.
    pub fn name(&self) -> &'static str {
        match self {
            LightingCapability::LocalShadows => "lighting.local_shadows",
            LightingCapability::PhysicalUnits => "lighting.physical_units",
            LightingCapability::EmissiveLights => "lighting.emissive_lights",
            LightingCapability::BudgetHeadroom => "lighting.budget_headroom",
        }
    }

    /// Prefix of every warning code emitted for this capability.
    pub fn warning_prefix(&self) -> &'static str {
        match self {
            LightingCapability::LocalShadows => "LIGHTING_LOCAL_SHADOWS",
            LightingCapability::PhysicalUnits => "LIGHTING_PHYSICAL_UNITS",
            LightingCapability::EmissiveLights => "LIGHTING_EMISSIVE_LIGHTS",
            LightingCapability::BudgetHeadroom => "LIGHTING_BUDGET_HEADROOM",
        }
    }
}

/// The mutable hysteresis state of one gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GateState {
    /// Consecutive frames with the feature expected but inactive.
    pub mismatch_streak: u32,
    /// Consecutive frames with the feature expected and active.
    pub stable_streak: u32,
    /// Frames left before another breach may be raised.
    pub cooldown_remaining: u32,
    /// `expected` of the last update.
    pub last_expected: bool,
    /// `active` of the last update.
    pub last_active: bool,
    /// Whether the last update raised a breach.
    pub last_breached: bool,
    /// Whether the last update reported promotion-ready.
    pub last_promotion_ready: bool,
}

/// The outcome of one gate update, returned by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSnapshot {
    /// The feature the gate guards.
    pub feature: GatedFeature,
    /// Whether the feature was expected this frame.
    pub expected: bool,
    /// Whether the feature was active this frame.
    pub active: bool,
    /// Mismatch streak after this update.
    pub mismatch_streak: u32,
    /// Stable streak after this update.
    pub stable_streak: u32,
    /// Cooldown frames left after this update.
    pub cooldown_remaining: u32,
    /// `true` if this update raised a breach.
    pub breached: bool,
    /// `true` if the feature is promotion-ready after this update.
    pub promotion_ready: bool,
    /// `true` if promotion-ready flipped from `false` to `true` on this update.
    pub newly_promotion_ready: bool,
}

impl GateSnapshot {
    /// Code of the breach warning for this feature.
    pub fn breach_code(&self) -> String {
        format!("{}_ENVELOPE_BREACH", self.feature.warning_prefix())
    }

    /// Code of the promotion-ready notice for this feature.
    pub fn promotion_code(&self) -> String {
        format!("{}_PROMOTION_READY", self.feature.warning_prefix())
    }

    /// Diagnostics raised by this update: a warning on breach and a notice
    /// when the feature becomes promotion-ready.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        if self.breached {
            out.push(Diagnostic::warning(
                self.breach_code(),
                format!(
                    "{} expected but inactive for {} consecutive frames",
                    self.feature.name(),
                    self.mismatch_streak
                ),
            ));
        }
        if self.newly_promotion_ready {
            out.push(Diagnostic::info(
                self.promotion_code(),
                format!(
                    "{} stable for {} consecutive frames",
                    self.feature.name(),
                    self.stable_streak
                ),
            ));
        }
        out
    }
}

/// A hysteresis state machine guarding one adaptive feature.
///
/// Updated exactly once per frame; [`reset`](Self::reset) on backend
/// reinitialization.
#[derive(Debug, Clone)]
pub struct PromotionGate {
    feature: GatedFeature,
    state: GateState,
}

impl PromotionGate {
    /// Creates a gate in its initial state.
    pub fn new(feature: GatedFeature) -> Self {
        Self {
            feature,
            state: GateState::default(),
        }
    }

    /// The feature this gate guards.
    pub fn feature(&self) -> GatedFeature {
        self.feature
    }

    /// The current hysteresis state.
    pub fn state(&self) -> &GateState {
        &self.state
    }

    /// Restores the initial state.
    pub fn reset(&mut self) {
        self.state = GateState::default();
    }

    /// Advances the gate by one frame.
    pub fn update(
        &mut self,
        expected: bool,
        active: bool,
        thresholds: &GateThresholds,
    ) -> GateSnapshot {
        let state = &mut self.state;
        let warn_min = thresholds.warn_min_frames.max(1);
        let promotion_min = thresholds.promotion_ready_min_frames.max(1);

        match (expected, active) {
            (true, false) => {
                state.mismatch_streak = state.mismatch_streak.saturating_add(1);
                state.stable_streak = 0;
            }
            (true, true) => {
                state.mismatch_streak = 0;
                state.stable_streak = state.stable_streak.saturating_add(1);
            }
            (false, _) => {
                state.mismatch_streak = 0;
                state.stable_streak = 0;
            }
        }

        state.cooldown_remaining = state.cooldown_remaining.saturating_sub(1);

        let breached = expected
            && !active
            && state.mismatch_streak >= warn_min
            && state.cooldown_remaining == 0;
        if breached {
            state.cooldown_remaining = thresholds.cooldown_frames;
            log::warn!(
                "PromotionGate[{}]: expected but inactive for {} frames (cooldown {}).",
                self.feature.name(),
                state.mismatch_streak,
                thresholds.cooldown_frames
            );
        }

        let promotion_ready = expected && active && state.stable_streak >= promotion_min;
        let newly_promotion_ready = promotion_ready && !state.last_promotion_ready;
        if newly_promotion_ready {
            log::debug!(
                "PromotionGate[{}]: promotion-ready after {} stable frames.",
                self.feature.name(),
                state.stable_streak
            );
        }

        state.last_expected = expected;
        state.last_active = active;
        state.last_breached = breached;
        state.last_promotion_ready = promotion_ready;

        GateSnapshot {
            feature: self.feature,
            expected,
            active,
            mismatch_streak: state.mismatch_streak,
            stable_streak: state.stable_streak,
            cooldown_remaining: state.cooldown_remaining,
            breached,
            promotion_ready,
            newly_promotion_ready,
        }
    }
}
