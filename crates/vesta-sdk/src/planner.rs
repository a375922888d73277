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

//! The per-frame orchestration of policies, planners and the profile cache.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use vesta_control::{
    FrameSignals, GiPromotionPolicy, GiPromotionSnapshot, LightingCapability,
    LightingEnvelopePolicy, LightingEnvelopeSnapshot, LightingSignal, ProfileResolution,
    ProfileResolver, ResolverInput,
};
use vesta_core::renderer::{
    BackendOptions, CapabilitySettings, ExistingAllocation, QualityTier, ShadowTileRequest,
};
use vesta_core::telemetry::Diagnostic;
use vesta_lanes::profile_lane::{CompiledProfile, ProfileCache};
use vesta_lanes::render_lane::{profile_passes, FrameGraph, FrameGraphBuilder, Pass};
use vesta_lanes::shadow_lane::{plan, ShadowAtlasPlan};
use vesta_telemetry::{DiagnosticsConfig, DiagnosticsService};

/// Everything decided for one frame.
#[derive(Debug, Clone)]
pub struct FrameDecision {
    /// The frame the decision was made for.
    pub frame_index: u64,
    /// GI gate outcome.
    pub gi: GiPromotionSnapshot,
    /// Lighting envelope outcome.
    pub lighting: LightingEnvelopeSnapshot,
    /// The resolved profile key and downgrade notes.
    pub resolution: ProfileResolution,
    /// The compiled profile, shared with the cache.
    pub profile: Arc<CompiledProfile>,
    /// The shadow atlas layout.
    pub shadow: ShadowAtlasPlan,
    /// Diagnostics raised this frame.
    pub diagnostics: Vec<Diagnostic>,
}

/// Drives the capability core frame by frame.
///
/// Holds the only cross-frame state of the core: the promotion gates and the
/// shadow atlas placements. The profile cache may be shared between planners.
#[derive(Debug)]
pub struct FramePlanner {
    settings: CapabilitySettings,
    gi_policy: GiPromotionPolicy,
    lighting_policy: LightingEnvelopePolicy,
    resolver: ProfileResolver,
    cache: Arc<ProfileCache>,
    shadow_state: Vec<ExistingAllocation>,
    diagnostics: DiagnosticsService,
}

impl FramePlanner {
    /// Creates a planner with its own profile cache.
    pub fn new(settings: CapabilitySettings) -> Self {
        Self::with_cache(settings, Arc::new(ProfileCache::new()))
    }

    /// Creates a planner sharing an existing profile cache.
    pub fn with_cache(settings: CapabilitySettings, cache: Arc<ProfileCache>) -> Self {
        log::info!(
            "Frame planner created (tier '{}', GI '{}', atlas {}px)",
            settings.quality_tier,
            settings.gi_mode,
            settings.shadow_atlas_size
        );
        let mut lighting_policy = LightingEnvelopePolicy::new(settings.lighting_gate);
        apply_lighting_thresholds(&mut lighting_policy, &settings);
        Self {
            gi_policy: GiPromotionPolicy::new(settings.gi_gate),
            lighting_policy,
            resolver: ProfileResolver,
            cache,
            shadow_state: Vec::new(),
            diagnostics: DiagnosticsService::new(DiagnosticsConfig::default()),
            settings,
        }
    }

    /// Loads settings from a JSON or RON file and creates a planner.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = CapabilitySettings::from_file(path)
            .with_context(|| format!("Failed to load capability settings from {}", path.display()))?;
        Ok(Self::new(settings))
    }

    /// The active settings.
    pub fn settings(&self) -> &CapabilitySettings {
        &self.settings
    }

    /// The shared profile cache.
    pub fn cache(&self) -> &Arc<ProfileCache> {
        &self.cache
    }

    /// The diagnostics sink.
    pub fn diagnostics(&self) -> &DiagnosticsService {
        &self.diagnostics
    }

    /// The shadow placements carried into the next frame.
    pub fn shadow_state(&self) -> &[ExistingAllocation] {
        &self.shadow_state
    }

    /// Replaces the settings. Gate state is kept; thresholds are updated.
    pub fn set_settings(&mut self, settings: CapabilitySettings) {
        self.gi_policy.set_thresholds(settings.gi_gate);
        apply_lighting_thresholds(&mut self.lighting_policy, &settings);
        self.settings = settings;
    }

    /// Applies backend option overrides to the current settings.
    pub fn apply_options(&mut self, options: &BackendOptions) {
        let settings = self.settings.with_options(options);
        self.set_settings(settings);
    }

    /// Resets every gate and forgets the shadow atlas contents.
    ///
    /// Call after the graphics backend was recreated.
    pub fn reinitialize_backend(&mut self) {
        log::info!("Backend reinitialized: resetting promotion gates and shadow atlas");
        self.gi_policy.reset();
        self.lighting_policy.reset();
        self.shadow_state.clear();
    }

    /// Plans one frame.
    pub fn plan_frame(
        &mut self,
        signals: &FrameSignals,
        lights: &[ShadowTileRequest],
    ) -> Result<FrameDecision> {
        let settings = &self.settings;

        // 1. GI gate.
        let gi = self
            .gi_policy
            .update(settings.gi_mode, signals, settings.ray_tracing_enabled);

        // 2. Shadow atlas.
        let shadow = plan(settings.shadow_atlas_size, lights, &self.shadow_state);
        self.shadow_state = shadow.carry_forward(lights, &self.shadow_state);

        // 3. Lighting envelope.
        let lighting_signals = lighting_signals(settings, signals, lights, &shadow);
        let lighting = self.lighting_policy.update(&lighting_signals);

        // 4. Profile.
        let input = ResolverInput {
            tier: settings.quality_tier,
            shadow_filter: settings.shadow_filter,
            reflection: settings.reflection,
            local_light_count: signals.local_light_count,
            local_light_budget: settings.local_light_budget,
            taa_enabled: settings.taa_enabled,
            ray_tracing_enabled: settings.ray_tracing_enabled,
            ray_tracing_available: signals.ray_tracing_available,
            gi_promotion_ready: gi.gate.promotion_ready,
            physical_lighting_ready: lighting
                .get(LightingCapability::PhysicalUnits)
                .is_some_and(|g| g.promotion_ready),
        };
        let resolution = self.resolver.resolve(&input);
        let profile = self
            .cache
            .get_or_compile(&resolution.key)
            .with_context(|| format!("Failed to compile profile '{}'", resolution.key.label()))?;

        // 5. Diagnostics.
        let mut diagnostics = gi.diagnostics();
        diagnostics.extend(lighting.diagnostics());
        diagnostics.extend(shadow.diagnostics());
        self.diagnostics.publish_all(diagnostics.iter().cloned());
        self.diagnostics.tick();

        log::debug!(
            "Frame {}: profile '{}', {} shadow tiles, {} diagnostics",
            signals.frame_index,
            resolution.key.label(),
            shadow.allocations.len(),
            diagnostics.len()
        );

        Ok(FrameDecision {
            frame_index: signals.frame_index,
            gi,
            lighting,
            resolution,
            profile,
            shadow,
            diagnostics,
        })
    }

    /// Builds the frame graph for a decision, asking `action_for` for the
    /// action of every pass the profile needs.
    pub fn build_frame_graph<C: 'static>(
        &self,
        decision: &FrameDecision,
        mut action_for: impl FnMut(&str) -> Box<dyn FnMut(&mut C) + Send>,
    ) -> Result<FrameGraph<C>> {
        let mut builder = FrameGraphBuilder::new();
        for declaration in profile_passes(&decision.resolution.key) {
            let action = action_for(&declaration.id);
            builder.add_pass(
                Pass::new(declaration.id, action)
                    .depends_on(declaration.depends_on)
                    .reads(declaration.reads)
                    .writes(declaration.writes),
            );
        }
        builder
            .build()
            .with_context(|| format!("Invalid pass layout for '{}'", decision.resolution.key.label()))
    }
}

fn apply_lighting_thresholds(policy: &mut LightingEnvelopePolicy, settings: &CapabilitySettings) {
    policy.set_thresholds(settings.lighting_gate);
    for capability in LightingCapability::ALL {
        policy.set_capability_thresholds(capability, settings.lighting_override(capability.name()));
    }
}

/// Derives the lighting envelope signals of a frame.
///
/// Host-supplied signals come last so they override the derived ones.
fn lighting_signals(
    settings: &CapabilitySettings,
    signals: &FrameSignals,
    lights: &[ShadowTileRequest],
    shadow: &ShadowAtlasPlan,
) -> Vec<LightingSignal> {
    let has_shadow_casters = lights.iter().any(|l| !l.id.trim().is_empty());
    let mut out = vec![
        LightingSignal::new(
            LightingCapability::LocalShadows,
            has_shadow_casters,
            shadow.dropped_ids.is_empty(),
        ),
        LightingSignal::new(
            LightingCapability::PhysicalUnits,
            settings.quality_tier >= QualityTier::High,
            signals.physical_units_supported,
        ),
        LightingSignal::new(
            LightingCapability::EmissiveLights,
            signals.emissive_requested,
            signals.emissive_active,
        ),
        LightingSignal::new(
            LightingCapability::BudgetHeadroom,
            signals.local_light_count > 0,
            !signals.exceeds_light_budget(settings.local_light_budget),
        ),
    ];
    out.extend(signals.lighting.iter().cloned());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_signals_override_derived_ones() {
        let settings = CapabilitySettings::default();
        let mut signals = FrameSignals::new(1);
        signals.lighting.push(LightingSignal::new(
            LightingCapability::EmissiveLights,
            true,
            false,
        ));
        let shadow = plan(1024, &[], &[]);
        let derived = lighting_signals(&settings, &signals, &[], &shadow);
        let last_emissive = derived
            .iter()
            .rev()
            .find(|s| s.capability == LightingCapability::EmissiveLights)
            .unwrap();
        assert!(last_emissive.expected);
    }

    #[test]
    fn test_dropped_shadow_tiles_mark_local_shadows_inactive() {
        let settings = CapabilitySettings::default();
        let lights = vec![
            ShadowTileRequest::new("a", 256, 1),
            ShadowTileRequest::new("b", 256, 1),
        ];
        let shadow = plan(256, &lights, &[]);
        let derived = lighting_signals(&settings, &FrameSignals::new(1), &lights, &shadow);
        let local = derived
            .iter()
            .find(|s| s.capability == LightingCapability::LocalShadows)
            .unwrap();
        assert!(local.expected);
        assert!(!local.active);
    }
}
