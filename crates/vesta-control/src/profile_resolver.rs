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

//! Profile resolution for the capability core.
//!
//! The `ProfileResolver` is a deterministic decision table. It evaluates the
//! quality tier, the requested feature signals and the promotion-gate outputs
//! of the frame and produces the canonical [`ProfileKey`] the pipeline cache
//! is looked up with.

use vesta_core::renderer::{
    AntiAliasingMode, LightingMode, PostMode, ProfileKey, QualityTier, ReflectionMode,
    ShadowFilterMode,
};

/// Lowest tier on which screen-space reflections run.
const SCREEN_SPACE_REFLECTION_MIN_TIER: QualityTier = QualityTier::Medium;
/// Lowest tier on which hybrid and ray-traced reflections run.
const ADVANCED_REFLECTION_MIN_TIER: QualityTier = QualityTier::High;
/// Lowest tier on which temporal anti-aliasing runs.
const TAA_MIN_TIER: QualityTier = QualityTier::Medium;
/// Lowest tier on which physically based lighting may be promoted.
const PHYSICAL_LIGHTING_MIN_TIER: QualityTier = QualityTier::High;

/// Everything the resolver looks at for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverInput {
    /// The configured quality tier.
    pub tier: QualityTier,
    /// The requested shadow filter.
    pub shadow_filter: ShadowFilterMode,
    /// The requested reflection technique.
    pub reflection: ReflectionMode,
    /// Local lights in the frame.
    pub local_light_count: u32,
    /// Configured local light budget.
    pub local_light_budget: u32,
    /// TAA toggle.
    pub taa_enabled: bool,
    /// Ray-tracing toggle from configuration.
    pub ray_tracing_enabled: bool,
    /// Ray-tracing hardware availability this frame.
    pub ray_tracing_available: bool,
    /// GI promotion gate output.
    pub gi_promotion_ready: bool,
    /// Physical-units lighting gate output.
    pub physical_lighting_ready: bool,
}

impl ResolverInput {
    /// An input with default signals for the given tier.
    pub fn for_tier(tier: QualityTier) -> Self {
        Self {
            tier,
            shadow_filter: ShadowFilterMode::Pcf,
            reflection: ReflectionMode::Off,
            local_light_count: 0,
            local_light_budget: 16,
            taa_enabled: false,
            ray_tracing_enabled: false,
            ray_tracing_available: false,
            gi_promotion_ready: false,
            physical_lighting_ready: false,
        }
    }
}

/// The resolved key plus the downgrade notes explaining it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileResolution {
    /// The canonical profile key.
    pub key: ProfileKey,
    /// Human-readable notes for every request that was downgraded.
    pub notes: Vec<String>,
}

/// Maps quality tier and frame signals to a canonical profile key.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileResolver;

impl ProfileResolver {
    /// Resolves the profile key for one frame.
    ///
    /// Rules, in evaluation order:
    /// 1. **Shadows**: the requested filter if the tier allows it, PCF otherwise.
    /// 2. **Reflections**: each technique falls back along
    ///    `rt → hybrid → ssr → probe` until the tier (and, for `rt`, the
    ///    ray-tracing toggle and hardware) allow it. `off` stays `off`.
    /// 3. **Anti-aliasing**: TAA from Medium up when enabled, FXAA otherwise,
    ///    nothing on Low.
    /// 4. **Post**: Minimal on Low, Standard on Medium, Cinematic on Ultra and
    ///    on High once GI is promotion-ready.
    /// 5. **Lighting**: more local lights than the budget always selects
    ///    `BudgetPriority`; otherwise Physical from High once the
    ///    physical-units gate is promotion-ready; Baseline otherwise.
    pub fn resolve(&self, input: &ResolverInput) -> ProfileResolution {
        let mut notes = Vec::new();
        let tier = input.tier;

        // ── 1. Shadows ──────────────────────────────────────────────────
        let shadow_filter = if tier >= input.shadow_filter.min_tier() {
            input.shadow_filter
        } else {
            notes.push(format!(
                "Shadow filter '{}' needs tier '{}' (current '{}'); using 'pcf'.",
                input.shadow_filter,
                input.shadow_filter.min_tier(),
                tier
            ));
            ShadowFilterMode::Pcf
        };

        // ── 2. Reflections ──────────────────────────────────────────────
        let reflection = self.resolve_reflection(input);
        if reflection != input.reflection {
            notes.push(format!(
                "Reflection '{}' unavailable on tier '{}'; using '{}'.",
                input.reflection, tier, reflection
            ));
        }

        // ── 3. Anti-aliasing ────────────────────────────────────────────
        let anti_aliasing = if tier == QualityTier::Low {
            if input.taa_enabled {
                notes.push("TAA disabled on tier 'low'.".to_string());
            }
            AntiAliasingMode::Off
        } else if input.taa_enabled && tier >= TAA_MIN_TIER {
            AntiAliasingMode::Taa
        } else {
            AntiAliasingMode::Fxaa
        };

        // ── 4. Post ─────────────────────────────────────────────────────
        let post = match tier {
            QualityTier::Low => PostMode::Minimal,
            QualityTier::Medium => PostMode::Standard,
            QualityTier::High if input.gi_promotion_ready => PostMode::Cinematic,
            QualityTier::High => PostMode::Standard,
            QualityTier::Ultra => PostMode::Cinematic,
        };

        // ── 5. Lighting ─────────────────────────────────────────────────
        let lighting = if input.local_light_count > input.local_light_budget {
            notes.push(format!(
                "{} local lights exceed the budget of {}; using 'budget_priority'.",
                input.local_light_count, input.local_light_budget
            ));
            LightingMode::BudgetPriority
        } else if tier >= PHYSICAL_LIGHTING_MIN_TIER && input.physical_lighting_ready {
            LightingMode::Physical
        } else {
            LightingMode::Baseline
        };

        let key = ProfileKey {
            shadow_filter,
            reflection,
            anti_aliasing,
            post,
            lighting,
            tier,
        };

        for note in &notes {
            log::debug!("ProfileResolver: {}", note);
        }

        ProfileResolution { key, notes }
    }

    fn resolve_reflection(&self, input: &ResolverInput) -> ReflectionMode {
        let tier = input.tier;
        let ray_tracing = input.ray_tracing_enabled && input.ray_tracing_available;

        let mut candidate = input.reflection;
        loop {
            let allowed = match candidate {
                ReflectionMode::Off | ReflectionMode::Probe => true,
                ReflectionMode::ScreenSpace => tier >= SCREEN_SPACE_REFLECTION_MIN_TIER,
                ReflectionMode::Hybrid => tier >= ADVANCED_REFLECTION_MIN_TIER,
                ReflectionMode::RayTraced => tier >= ADVANCED_REFLECTION_MIN_TIER && ray_tracing,
            };
            if allowed {
                return candidate;
            }
            candidate = match candidate {
                ReflectionMode::RayTraced => ReflectionMode::Hybrid,
                ReflectionMode::Hybrid => ReflectionMode::ScreenSpace,
                _ => ReflectionMode::Probe,
            };
        }
    }
}
