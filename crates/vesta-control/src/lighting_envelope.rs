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

//! Lighting envelope enforcement: one promotion gate per guarded capability.

pub use crate::gate::LightingCapability;
use crate::gate::{GateSnapshot, GatedFeature, PromotionGate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vesta_core::renderer::GateThresholds;
use vesta_core::telemetry::Diagnostic;

/// The raw per-frame availability of one lighting capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightingSignal {
    /// The capability the signal describes.
    pub capability: LightingCapability,
    /// Whether configuration expects the capability this frame.
    pub expected: bool,
    /// Whether the runtime actually provides it this frame.
    pub active: bool,
}

impl LightingSignal {
    /// Creates a new signal.
    pub fn new(capability: LightingCapability, expected: bool, active: bool) -> Self {
        Self {
            capability,
            expected,
            active,
        }
    }
}

/// The outcome of one lighting envelope update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightingEnvelopeSnapshot {
    /// One snapshot per capability, in [`LightingCapability::ALL`] order.
    pub gates: Vec<GateSnapshot>,
}

impl LightingEnvelopeSnapshot {
    /// `true` if any capability breached this frame.
    pub fn any_breach(&self) -> bool {
        self.gates.iter().any(|g| g.breached)
    }

    /// `true` if every expected capability is promotion-ready.
    pub fn all_promotion_ready(&self) -> bool {
        self.gates
            .iter()
            .filter(|g| g.expected)
            .all(|g| g.promotion_ready)
    }

    /// The snapshot of one capability.
    pub fn get(&self, capability: LightingCapability) -> Option<&GateSnapshot> {
        self.gates
            .iter()
            .find(|g| g.feature == GatedFeature::Lighting(capability))
    }

    /// Diagnostics of every capability, in capability order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.gates.iter().flat_map(|g| g.diagnostics()).collect()
    }
}

/// Holds one promotion gate per guarded lighting capability.
#[derive(Debug, Clone)]
pub struct LightingEnvelopePolicy {
    gates: BTreeMap<LightingCapability, PromotionGate>,
    thresholds: GateThresholds,
    overrides: BTreeMap<LightingCapability, GateThresholds>,
}

impl LightingEnvelopePolicy {
    /// Creates a policy with a fresh gate for every capability.
    pub fn new(thresholds: GateThresholds) -> Self {
        Self {
            gates: LightingCapability::ALL
                .iter()
                .map(|c| (*c, PromotionGate::new(GatedFeature::Lighting(*c))))
                .collect(),
            thresholds,
            overrides: BTreeMap::new(),
        }
    }

    /// The thresholds shared by every gate.
    pub fn thresholds(&self) -> &GateThresholds {
        &self.thresholds
    }

    /// Replaces the thresholds without touching gate state.
    pub fn set_thresholds(&mut self, thresholds: GateThresholds) {
        self.thresholds = thresholds;
    }

    /// Gives one capability its own thresholds, or restores the shared ones with `None`.
    pub fn set_capability_thresholds(
        &mut self,
        capability: LightingCapability,
        thresholds: Option<GateThresholds>,
    ) {
        match thresholds {
            Some(thresholds) => {
                self.overrides.insert(capability, thresholds);
            }
            None => {
                self.overrides.remove(&capability);
            }
        }
    }

    /// The thresholds the gate of `capability` runs with.
    pub fn thresholds_for(&self, capability: LightingCapability) -> &GateThresholds {
        self.overrides.get(&capability).unwrap_or(&self.thresholds)
    }

    /// Advances every gate by one frame.
    ///
    /// Capabilities without a signal this frame are treated as not expected.
    /// When a capability is signaled more than once, the last signal wins.
    pub fn update(&mut self, signals: &[LightingSignal]) -> LightingEnvelopeSnapshot {
        let latest: BTreeMap<LightingCapability, &LightingSignal> =
            signals.iter().map(|s| (s.capability, s)).collect();

        let gates = self
            .gates
            .iter_mut()
            .map(|(capability, gate)| {
                let (expected, active) = latest
                    .get(capability)
                    .map(|s| (s.expected, s.active))
                    .unwrap_or((false, false));
                let thresholds = self.overrides.get(capability).unwrap_or(&self.thresholds);
                gate.update(expected, active, thresholds)
            })
            .collect();

        LightingEnvelopeSnapshot { gates }
    }

    /// Resets every gate (backend reinitialization).
    pub fn reset(&mut self) {
        for gate in self.gates.values_mut() {
            gate.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> LightingEnvelopePolicy {
        LightingEnvelopePolicy::new(GateThresholds::new(2, 10, 2))
    }

    #[test]
    fn every_capability_has_a_gate() {
        let mut policy = policy();
        let snapshot = policy.update(&[]);
        assert_eq!(snapshot.gates.len(), LightingCapability::ALL.len());
        assert!(!snapshot.any_breach());
        // Nothing expected: vacuously ready.
        assert!(snapshot.all_promotion_ready());
    }

    #[test]
    fn gates_are_independent() {
        let mut policy = policy();
        let signals = [
            LightingSignal::new(LightingCapability::LocalShadows, true, false),
            LightingSignal::new(LightingCapability::BudgetHeadroom, true, true),
        ];
        policy.update(&signals);
        let snapshot = policy.update(&signals);

        let shadows = snapshot.get(LightingCapability::LocalShadows).unwrap();
        assert!(shadows.breached);
        let budget = snapshot.get(LightingCapability::BudgetHeadroom).unwrap();
        assert!(!budget.breached);
        assert!(budget.promotion_ready);
        assert!(snapshot.any_breach());
        assert!(!snapshot.all_promotion_ready());

        let codes: Vec<String> = snapshot.diagnostics().into_iter().map(|d| d.code).collect();
        assert_eq!(
            codes,
            vec![
                "LIGHTING_LOCAL_SHADOWS_ENVELOPE_BREACH".to_string(),
                "LIGHTING_BUDGET_HEADROOM_PROMOTION_READY".to_string(),
            ]
        );
    }

    #[test]
    fn capability_thresholds_override_shared_ones() {
        let mut policy = policy();
        policy.set_capability_thresholds(
            LightingCapability::LocalShadows,
            Some(GateThresholds::new(3, 10, 2)),
        );
        assert_eq!(policy.thresholds_for(LightingCapability::LocalShadows).warn_min_frames, 3);
        assert_eq!(policy.thresholds_for(LightingCapability::EmissiveLights).warn_min_frames, 2);

        let signals = [
            LightingSignal::new(LightingCapability::LocalShadows, true, false),
            LightingSignal::new(LightingCapability::EmissiveLights, true, false),
        ];
        policy.update(&signals);
        let second = policy.update(&signals);
        assert!(!second.get(LightingCapability::LocalShadows).unwrap().breached);
        assert!(second.get(LightingCapability::EmissiveLights).unwrap().breached);
        let third = policy.update(&signals);
        assert!(third.get(LightingCapability::LocalShadows).unwrap().breached);

        policy.set_capability_thresholds(LightingCapability::LocalShadows, None);
        assert_eq!(policy.thresholds_for(LightingCapability::LocalShadows).warn_min_frames, 2);
    }

    #[test]
    fn last_signal_wins_for_duplicates() {
        let mut policy = policy();
        let snapshot = policy.update(&[
            LightingSignal::new(LightingCapability::EmissiveLights, true, false),
            LightingSignal::new(LightingCapability::EmissiveLights, true, true),
        ]);
        let emissive = snapshot.get(LightingCapability::EmissiveLights).unwrap();
        assert!(emissive.active);
        assert_eq!(emissive.mismatch_streak, 0);
    }

    #[test]
    fn reset_clears_all_gates() {
        let mut policy = policy();
        let signals = [LightingSignal::new(LightingCapability::PhysicalUnits, true, false)];
        policy.update(&signals);
        policy.reset();
        let snapshot = policy.update(&signals);
        assert_eq!(
            snapshot.get(LightingCapability::PhysicalUnits).unwrap().mismatch_streak,
            1
        );
    }
}
