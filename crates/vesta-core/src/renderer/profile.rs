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

//! The profile key vocabulary: quality tiers and per-feature mode identifiers.
//!
//! A [`ProfileKey`] is the canonical tuple identifying which rendering feature
//! modes are active for a frame. Keys compare by value, so two keys built from
//! the same fields are interchangeable cache keys.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! mode_ids {
    ($ty:ident { $($variant:ident => $id:literal),+ $(,)? }) => {
        impl $ty {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// The stable string identifier of this mode.
            pub fn id(&self) -> &'static str {
                match self {
                    $($ty::$variant => $id),+
                }
            }

            /// Parses a mode from its string identifier (case-insensitive).
            pub fn from_id(id: &str) -> Option<Self> {
                let id = id.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|mode| mode.id().eq_ignore_ascii_case(id))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.id())
            }
        }
    };
}

/// The quality tier selected by the configuration layer.
///
/// Tiers are ordered: `Low < Medium < High < Ultra`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum QualityTier {
    /// Minimum feature set.
    Low,
    /// Balanced default.
    #[default]
    Medium,
    /// Full feature set on capable hardware.
    High,
    /// Everything on, including cinematic post-processing.
    Ultra,
}

mode_ids!(QualityTier {
    Low => "low",
    Medium => "medium",
    High => "high",
    Ultra => "ultra",
});

/// Shadow filtering technique.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum ShadowFilterMode {
    /// Percentage-closer filtering.
    #[default]
    Pcf,
    /// Percentage-closer soft shadows.
    Pcss,
    /// Exponential variance shadow maps.
    Evsm,
    /// Moment shadow maps.
    Moment,
}

mode_ids!(ShadowFilterMode {
    Pcf => "pcf",
    Pcss => "pcss",
    Evsm => "evsm",
    Moment => "moment",
});

impl ShadowFilterMode {
    /// The lowest quality tier on which this filter may run.
    pub fn min_tier(&self) -> QualityTier {
        match self {
            ShadowFilterMode::Pcf => QualityTier::Low,
            ShadowFilterMode::Pcss => QualityTier::Medium,
            ShadowFilterMode::Evsm | ShadowFilterMode::Moment => QualityTier::High,
        }
    }
}

/// Reflection technique.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum ReflectionMode {
    /// No dynamic reflections.
    #[default]
    Off,
    /// Pre-baked reflection probes.
    Probe,
    /// Screen-space reflections.
    ScreenSpace,
    /// Screen-space reflections with probe fallback.
    Hybrid,
    /// Hardware ray-traced reflections.
    RayTraced,
}

mode_ids!(ReflectionMode {
    Off => "off",
    Probe => "probe",
    ScreenSpace => "ssr",
    Hybrid => "hybrid",
    RayTraced => "rt",
});

impl ReflectionMode {
    /// Returns `true` for techniques sampling pre-baked probes in the main pass.
    pub fn uses_probes(&self) -> bool {
        matches!(self, ReflectionMode::Probe | ReflectionMode::Hybrid)
    }

    /// Returns `true` for techniques that run their own reflection pass.
    pub fn traces(&self) -> bool {
        matches!(
            self,
            ReflectionMode::ScreenSpace | ReflectionMode::Hybrid | ReflectionMode::RayTraced
        )
    }
}

/// Anti-aliasing technique.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum AntiAliasingMode {
    /// No anti-aliasing.
    Off,
    /// Fast approximate anti-aliasing.
    #[default]
    Fxaa,
    /// Temporal anti-aliasing.
    Taa,
}

mode_ids!(AntiAliasingMode {
    Off => "off",
    Fxaa => "fxaa",
    Taa => "taa",
});

/// Post-processing chain.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum PostMode {
    /// Tone mapping only.
    Minimal,
    /// Tone mapping, bloom and color grading.
    #[default]
    Standard,
    /// Standard chain plus depth of field and film grain.
    Cinematic,
}

mode_ids!(PostMode {
    Minimal => "minimal",
    Standard => "standard",
    Cinematic => "cinematic",
});

/// Lighting model.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum LightingMode {
    /// Classic forward lighting without physical units.
    #[default]
    Baseline,
    /// Physically based units and energy-conserving BRDF.
    Physical,
    /// Local light budget exceeded: lights are ranked and the tail is culled.
    BudgetPriority,
}

mode_ids!(LightingMode {
    Baseline => "baseline",
    Physical => "physical",
    BudgetPriority => "budget_priority",
});

/// Global illumination technique requested by configuration.
///
/// GI does not take part in the profile key; it feeds the GI promotion gate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum GiMode {
    /// No global illumination.
    #[default]
    Off,
    /// Screen-space global illumination.
    ScreenSpace,
    /// Irradiance probes.
    Probe,
    /// Hardware ray-traced global illumination.
    RayTraced,
}

mode_ids!(GiMode {
    Off => "off",
    ScreenSpace => "ssgi",
    Probe => "probe",
    RayTraced => "rtgi",
});

/// The canonical tuple of feature modes active for a frame.
///
/// # Examples
///
/// ```
/// use vesta_core::renderer::profile::{ProfileKey, QualityTier};
///
/// let a = ProfileKey::baseline(QualityTier::High);
/// let b = ProfileKey::baseline(QualityTier::High);
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProfileKey {
    /// Shadow filtering technique.
    pub shadow_filter: ShadowFilterMode,
    /// Reflection technique.
    pub reflection: ReflectionMode,
    /// Anti-aliasing technique.
    pub anti_aliasing: AntiAliasingMode,
    /// Post-processing chain.
    pub post: PostMode,
    /// Lighting model.
    pub lighting: LightingMode,
    /// The quality tier the key was resolved for.
    pub tier: QualityTier,
}

impl ProfileKey {
    /// A key with every mode at its default for the given tier.
    pub fn baseline(tier: QualityTier) -> Self {
        Self {
            shadow_filter: ShadowFilterMode::default(),
            reflection: ReflectionMode::default(),
            anti_aliasing: AntiAliasingMode::default(),
            post: PostMode::default(),
            lighting: LightingMode::default(),
            tier,
        }
    }

    /// A compact, stable label (e.g. `high/pcss/ssr/taa/standard/physical`).
    pub fn label(&self) -> String {
        format!(
            "{}/{}/{}/{}/{}/{}",
            self.tier,
            self.shadow_filter,
            self.reflection,
            self.anti_aliasing,
            self.post,
            self.lighting
        )
    }
}

impl fmt::Display for ProfileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
