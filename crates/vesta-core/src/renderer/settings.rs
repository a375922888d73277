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

//! Capability settings consumed from the quality/configuration layer.

use crate::renderer::error::ConfigError;
use crate::renderer::options::BackendOptions;
use crate::renderer::profile::{GiMode, QualityTier, ReflectionMode, ShadowFilterMode};
use crate::renderer::shadow::{normalize_atlas_size, MAX_ATLAS_SIZE, MIN_ATLAS_SIZE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Hysteresis thresholds of one promotion gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateThresholds {
    /// Consecutive expected-but-inactive frames before a breach is raised.
    pub warn_min_frames: u32,
    /// Frames during which no further breach is raised after one fired.
    pub cooldown_frames: u32,
    /// Consecutive expected-and-active frames before the feature is promotion-ready.
    pub promotion_ready_min_frames: u32,
}

impl Default for GateThresholds {
    fn default() -> Self {
        Self {
            warn_min_frames: 3,
            cooldown_frames: 120,
            promotion_ready_min_frames: 30,
        }
    }
}

impl GateThresholds {
    /// Creates thresholds from explicit values.
    pub fn new(warn_min_frames: u32, cooldown_frames: u32, promotion_ready_min_frames: u32) -> Self {
        Self {
            warn_min_frames,
            cooldown_frames,
            promotion_ready_min_frames,
        }
    }

    /// Overrides thresholds from `<prefix>.warnMinFrames`, `<prefix>.cooldownFrames`
    /// and `<prefix>.promotionReadyMinFrames`.
    pub fn with_options(self, options: &BackendOptions, prefix: &str) -> Self {
        Self {
            warn_min_frames: options.get_clamped(
                &format!("{prefix}.warnMinFrames"),
                self.warn_min_frames,
                1,
                10_000,
            ),
            cooldown_frames: options.get_clamped(
                &format!("{prefix}.cooldownFrames"),
                self.cooldown_frames,
                0,
                100_000,
            ),
            promotion_ready_min_frames: options.get_clamped(
                &format!("{prefix}.promotionReadyMinFrames"),
                self.promotion_ready_min_frames,
                1,
                100_000,
            ),
        }
    }
}

/// A collection of settings driving the per-frame capability decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilitySettings {
    /// The quality tier selected by the user or the platform preset.
    pub quality_tier: QualityTier,
    /// The requested global illumination technique.
    pub gi_mode: GiMode,
    /// The requested shadow filter.
    pub shadow_filter: ShadowFilterMode,
    /// The requested reflection technique.
    pub reflection: ReflectionMode,
    /// If `true`, temporal anti-aliasing is requested.
    pub taa_enabled: bool,
    /// If `true`, ray-traced features may be used when the hardware supports them.
    pub ray_tracing_enabled: bool,
    /// Maximum number of shaded local lights before the budget lighting mode kicks in.
    pub local_light_budget: u32,
    /// Requested shadow atlas edge, in pixels.
    pub shadow_atlas_size: u32,
    /// Thresholds of the GI promotion gate.
    pub gi_gate: GateThresholds,
    /// Thresholds shared by the lighting envelope gates.
    pub lighting_gate: GateThresholds,
    /// Per-capability lighting thresholds, keyed by capability name
    /// (e.g. `"lighting.local_shadows"`). Capabilities without an entry use
    /// `lighting_gate`.
    pub lighting_gate_overrides: BTreeMap<String, GateThresholds>,
}

impl Default for CapabilitySettings {
    fn default() -> Self {
        Self {
            quality_tier: QualityTier::Medium,
            gi_mode: GiMode::Off,
            shadow_filter: ShadowFilterMode::Pcf,
            reflection: ReflectionMode::ScreenSpace,
            taa_enabled: true,
            ray_tracing_enabled: false,
            local_light_budget: 16,
            shadow_atlas_size: 2048,
            gi_gate: GateThresholds::default(),
            lighting_gate: GateThresholds::new(4, 120, 30),
            lighting_gate_overrides: BTreeMap::new(),
        }
    }
}

impl CapabilitySettings {
    /// Load settings from a JSON string. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a RON string. Missing fields keep their defaults.
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    /// Load settings from a file, picking the format from the extension
    /// (`.ron` for RON, anything else for JSON).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_ron = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ron"));
        if is_ron {
            Self::from_ron(&content)
        } else {
            Self::from_json(&content)
        }
    }

    /// Save settings as pretty-printed JSON.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Applies backend option overrides on top of these settings.
    pub fn with_options(&self, options: &BackendOptions) -> Self {
        Self {
            quality_tier: options.get_parsed("quality.tier", self.quality_tier, QualityTier::from_id),
            gi_mode: options.get_parsed("gi.mode", self.gi_mode, GiMode::from_id),
            shadow_filter: options.get_parsed(
                "shadow.filter",
                self.shadow_filter,
                ShadowFilterMode::from_id,
            ),
            reflection: options.get_parsed(
                "reflection.mode",
                self.reflection,
                ReflectionMode::from_id,
            ),
            taa_enabled: options.get_bool("aa.taa", self.taa_enabled),
            ray_tracing_enabled: options.get_bool("rt.enabled", self.ray_tracing_enabled),
            local_light_budget: options.get_clamped(
                "lighting.localLightBudget",
                self.local_light_budget,
                0,
                4096,
            ),
            shadow_atlas_size: normalize_atlas_size(options.get_clamped(
                "shadow.atlasSize",
                self.shadow_atlas_size,
                MIN_ATLAS_SIZE,
                MAX_ATLAS_SIZE,
            )),
            gi_gate: self.gi_gate.with_options(options, "gi"),
            lighting_gate: self.lighting_gate.with_options(options, "lighting"),
            lighting_gate_overrides: self
                .lighting_gate_overrides
                .iter()
                .map(|(name, thresholds)| (name.clone(), thresholds.with_options(options, name)))
                .collect(),
        }
    }

    /// The override thresholds of one lighting capability, if configured.
    pub fn lighting_override(&self, capability: &str) -> Option<GateThresholds> {
        self.lighting_gate_overrides.get(capability).copied()
    }

    /// The thresholds one lighting capability gate runs with.
    pub fn lighting_thresholds(&self, capability: &str) -> GateThresholds {
        self.lighting_override(capability).unwrap_or(self.lighting_gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let settings =
            CapabilitySettings::from_json(r#"{ "quality_tier": "High", "local_light_budget": 8 }"#)
                .unwrap();
        assert_eq!(settings.quality_tier, QualityTier::High);
        assert_eq!(settings.local_light_budget, 8);
        assert_eq!(settings.shadow_atlas_size, 2048);
        assert_eq!(settings.gi_gate, GateThresholds::default());
    }

    #[test]
    fn ron_settings_parse() {
        let settings = CapabilitySettings::from_ron(
            "(quality_tier: Ultra, gi_mode: RayTraced, gi_gate: (warn_min_frames: 5))",
        )
        .unwrap();
        assert_eq!(settings.quality_tier, QualityTier::Ultra);
        assert_eq!(settings.gi_mode, GiMode::RayTraced);
        assert_eq!(settings.gi_gate.warn_min_frames, 5);
        assert_eq!(settings.gi_gate.cooldown_frames, 120);
    }

    #[test]
    fn invalid_json_is_reported() {
        assert!(matches!(
            CapabilitySettings::from_json("{ quality_tier: }"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capabilities.json");
        let settings = CapabilitySettings {
            taa_enabled: false,
            ..Default::default()
        };
        settings.to_file(&path).unwrap();
        assert_eq!(CapabilitySettings::from_file(&path).unwrap(), settings);
    }

    #[test]
    fn options_override_settings() {
        let options = BackendOptions::new()
            .with("quality.tier", "ultra")
            .with("gi.mode", "rtgi")
            .with("shadow.atlasSize", "3000")
            .with("gi.warnMinFrames", "0")
            .with("lighting.cooldownFrames", "10");
        let settings = CapabilitySettings::default().with_options(&options);
        assert_eq!(settings.quality_tier, QualityTier::Ultra);
        assert_eq!(settings.gi_mode, GiMode::RayTraced);
        assert_eq!(settings.shadow_atlas_size, 4096);
        assert_eq!(settings.gi_gate.warn_min_frames, 1);
        assert_eq!(settings.lighting_gate.cooldown_frames, 10);
    }

    #[test]
    fn lighting_overrides_fall_back_to_shared_thresholds() {
        let settings = CapabilitySettings::from_ron(
            r#"(
                lighting_gate: (warn_min_frames: 4),
                lighting_gate_overrides: {
                    "lighting.local_shadows": (warn_min_frames: 8, cooldown_frames: 2),
                },
            )"#,
        )
        .unwrap();
        assert_eq!(settings.lighting_thresholds("lighting.local_shadows").warn_min_frames, 8);
        assert_eq!(settings.lighting_thresholds("lighting.local_shadows").cooldown_frames, 2);
        assert_eq!(settings.lighting_thresholds("lighting.physical_units").warn_min_frames, 4);
        assert_eq!(settings.lighting_override("lighting.physical_units"), None);

        let options = BackendOptions::new().with("lighting.local_shadows.warnMinFrames", "6");
        let overridden = settings.with_options(&options);
        assert_eq!(overridden.lighting_thresholds("lighting.local_shadows").warn_min_frames, 6);
    }
}
