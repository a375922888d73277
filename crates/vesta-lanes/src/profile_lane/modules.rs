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

//! Capability modules: the units a pipeline profile is assembled from.
//!
//! Every active feature mode of a [`ProfileKey`] maps to one module that
//! declares the descriptor bindings and WGSL snippets it needs, per pass.

use std::collections::BTreeSet;

use vesta_core::renderer::{
    AntiAliasingMode, BindingFrequency, DescriptorBinding, DescriptorType, LightingMode,
    PostMode, ProfileKey, ReflectionMode, ShadowFilterMode,
};

use super::shaders::*;
use crate::render_lane::{MAIN_PASS, POST_PASS, REFLECTION_PASS, SHADOW_PASS, TAA_PASS};

/// The programmable stage a snippet belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    /// Vertex stage.
    Vertex,
    /// Fragment stage.
    Fragment,
    /// Compute stage.
    Compute,
}

impl ShaderStage {
    /// Lowercase stage name.
    pub fn name(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Compute => "compute",
        }
    }
}

/// A piece of WGSL contributed to one stage of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderSnippet {
    /// Target pass id.
    pub pass: &'static str,
    /// Target stage.
    pub stage: ShaderStage,
    /// WGSL source.
    pub source: &'static str,
}

impl ShaderSnippet {
    const fn new(pass: &'static str, stage: ShaderStage, source: &'static str) -> Self {
        Self {
            pass,
            stage,
            source,
        }
    }
}

/// A feature module contributing bindings and shader code to a profile.
pub trait CapabilityModule: Send + Sync {
    /// A stable name, used in diagnostics and conflict reports.
    fn name(&self) -> String;

    /// The descriptor bindings this module needs, for every pass it touches.
    fn descriptor_bindings(&self) -> Vec<DescriptorBinding>;

    /// The shader snippets this module contributes.
    fn shader_snippets(&self) -> Vec<ShaderSnippet>;

    /// Every pass this module declares bindings or snippets for.
    fn passes(&self) -> BTreeSet<String> {
        self.descriptor_bindings()
            .into_iter()
            .map(|b| b.target_pass)
            .chain(self.shader_snippets().into_iter().map(|s| s.pass.to_string()))
            .collect()
    }
}

/// Camera, light list and the pass entry points.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreModule;

impl CapabilityModule for CoreModule {
    fn name(&self) -> String {
        "core".to_string()
    }

    fn descriptor_bindings(&self) -> Vec<DescriptorBinding> {
        vec![
            DescriptorBinding::new(SHADOW_PASS, 0, 0, DescriptorType::UniformBuffer, "camera")
                .with_frequency(BindingFrequency::PerPass),
            DescriptorBinding::new(MAIN_PASS, 0, 0, DescriptorType::UniformBuffer, "camera"),
            DescriptorBinding::new(MAIN_PASS, 0, 1, DescriptorType::StorageBuffer, "lights"),
            DescriptorBinding::new(POST_PASS, 0, 0, DescriptorType::SampledTexture, "hdr_color"),
            DescriptorBinding::new(POST_PASS, 0, 1, DescriptorType::Sampler, "linear_sampler"),
        ]
    }

    fn shader_snippets(&self) -> Vec<ShaderSnippet> {
        vec![
            ShaderSnippet::new(SHADOW_PASS, ShaderStage::Vertex, CORE_SHADOW_VS_WGSL),
            ShaderSnippet::new(MAIN_PASS, ShaderStage::Vertex, CORE_MAIN_VS_WGSL),
            ShaderSnippet::new(MAIN_PASS, ShaderStage::Fragment, CORE_MAIN_FS_WGSL),
            ShaderSnippet::new(POST_PASS, ShaderStage::Fragment, CORE_POST_FS_WGSL),
        ]
    }
}

/// Shadow atlas sampling with the selected filter.
#[derive(Debug, Clone, Copy)]
pub struct ShadowFilterModule {
    /// The active filter.
    pub mode: ShadowFilterMode,
}

impl CapabilityModule for ShadowFilterModule {
    fn name(&self) -> String {
        format!("shadow.{}", self.mode)
    }

    fn descriptor_bindings(&self) -> Vec<DescriptorBinding> {
        let mut bindings = vec![
            DescriptorBinding::new(MAIN_PASS, 1, 4, DescriptorType::DepthTexture, "shadow_atlas"),
            DescriptorBinding::new(
                MAIN_PASS,
                1,
                5,
                DescriptorType::ComparisonSampler,
                "shadow_sampler",
            ),
        ];
        if matches!(
            self.mode,
            ShadowFilterMode::Evsm | ShadowFilterMode::Moment
        ) {
            bindings.push(DescriptorBinding::new(
                MAIN_PASS,
                1,
                6,
                DescriptorType::SampledTexture,
                "shadow_moments",
            ));
        }
        if self.mode != ShadowFilterMode::Pcf {
            bindings.push(DescriptorBinding::new(
                MAIN_PASS,
                1,
                7,
                DescriptorType::Sampler,
                "shadow_linear_sampler",
            ));
        }
        bindings
    }

    fn shader_snippets(&self) -> Vec<ShaderSnippet> {
        let source = match self.mode {
            ShadowFilterMode::Pcf => SHADOW_PCF_WGSL,
            ShadowFilterMode::Pcss => SHADOW_PCSS_WGSL,
            ShadowFilterMode::Evsm => SHADOW_EVSM_WGSL,
            ShadowFilterMode::Moment => SHADOW_MOMENT_WGSL,
        };
        vec![ShaderSnippet::new(MAIN_PASS, ShaderStage::Fragment, source)]
    }
}

/// Reflections: probe lookup in the main pass, tracing in the reflection pass.
#[derive(Debug, Clone, Copy)]
pub struct ReflectionModule {
    /// The active technique.
    pub mode: ReflectionMode,
}

impl CapabilityModule for ReflectionModule {
    fn name(&self) -> String {
        format!("reflection.{}", self.mode)
    }

    fn descriptor_bindings(&self) -> Vec<DescriptorBinding> {
        let mut bindings = Vec::new();
        if self.mode.uses_probes() {
            bindings.push(
                DescriptorBinding::new(
                    MAIN_PASS,
                    2,
                    0,
                    DescriptorType::SampledTexture,
                    "reflection_probes",
                )
                .array(),
            );
            bindings.push(DescriptorBinding::new(
                MAIN_PASS,
                2,
                1,
                DescriptorType::Sampler,
                "probe_sampler",
            ));
        }
        if self.mode.traces() {
            bindings.extend([
                DescriptorBinding::new(
                    REFLECTION_PASS,
                    0,
                    0,
                    DescriptorType::DepthTexture,
                    "scene_depth",
                ),
                DescriptorBinding::new(
                    REFLECTION_PASS,
                    0,
                    1,
                    DescriptorType::SampledTexture,
                    "scene_color",
                ),
                DescriptorBinding::new(
                    REFLECTION_PASS,
                    0,
                    2,
                    DescriptorType::StorageTexture,
                    "reflection_output",
                ),
            ]);
        }
        if self.mode == ReflectionMode::RayTraced {
            bindings.push(DescriptorBinding::new(
                REFLECTION_PASS,
                0,
                3,
                DescriptorType::AccelerationStructure,
                "scene_tlas",
            ));
        }
        bindings
    }

    fn shader_snippets(&self) -> Vec<ShaderSnippet> {
        let main = if self.mode.uses_probes() {
            REFLECTION_PROBE_WGSL
        } else {
            REFLECTION_OFF_WGSL
        };
        let mut snippets = vec![ShaderSnippet::new(MAIN_PASS, ShaderStage::Fragment, main)];
        if self.mode.traces() {
            let trace = if self.mode == ReflectionMode::RayTraced {
                REFLECTION_RT_CS_WGSL
            } else {
                REFLECTION_SSR_CS_WGSL
            };
            snippets.push(ShaderSnippet::new(
                REFLECTION_PASS,
                ShaderStage::Compute,
                trace,
            ));
        }
        snippets
    }
}

/// Anti-aliasing in the post pass, or a dedicated TAA resolve.
#[derive(Debug, Clone, Copy)]
pub struct AntiAliasingModule {
    /// The active mode.
    pub mode: AntiAliasingMode,
}

impl CapabilityModule for AntiAliasingModule {
    fn name(&self) -> String {
        format!("aa.{}", self.mode)
    }

    fn descriptor_bindings(&self) -> Vec<DescriptorBinding> {
        let mut bindings = vec![DescriptorBinding::new(
            POST_PASS,
            0,
            1,
            DescriptorType::Sampler,
            "linear_sampler",
        )];
        if self.mode == AntiAliasingMode::Taa {
            bindings.extend([
                DescriptorBinding::new(TAA_PASS, 0, 0, DescriptorType::SampledTexture, "taa_current"),
                DescriptorBinding::new(TAA_PASS, 0, 1, DescriptorType::SampledTexture, "taa_history"),
                DescriptorBinding::new(TAA_PASS, 0, 2, DescriptorType::Sampler, "taa_sampler"),
            ]);
        }
        bindings
    }

    fn shader_snippets(&self) -> Vec<ShaderSnippet> {
        match self.mode {
            AntiAliasingMode::Off => {
                vec![ShaderSnippet::new(POST_PASS, ShaderStage::Fragment, AA_OFF_WGSL)]
            }
            AntiAliasingMode::Fxaa => {
                vec![ShaderSnippet::new(POST_PASS, ShaderStage::Fragment, AA_FXAA_WGSL)]
            }
            AntiAliasingMode::Taa => vec![
                ShaderSnippet::new(POST_PASS, ShaderStage::Fragment, AA_OFF_WGSL),
                ShaderSnippet::new(TAA_PASS, ShaderStage::Fragment, AA_TAA_FS_WGSL),
            ],
        }
    }
}

/// Tone mapping and grading.
#[derive(Debug, Clone, Copy)]
pub struct PostModule {
    /// The active post chain.
    pub mode: PostMode,
}

impl CapabilityModule for PostModule {
    fn name(&self) -> String {
        format!("post.{}", self.mode)
    }

    fn descriptor_bindings(&self) -> Vec<DescriptorBinding> {
        match self.mode {
            PostMode::Cinematic => vec![DescriptorBinding::new(
                POST_PASS,
                0,
                2,
                DescriptorType::UniformBuffer,
                "color_grading",
            )],
            _ => Vec::new(),
        }
    }

    fn shader_snippets(&self) -> Vec<ShaderSnippet> {
        let source = match self.mode {
            PostMode::Minimal => POST_MINIMAL_WGSL,
            PostMode::Standard => POST_STANDARD_WGSL,
            PostMode::Cinematic => POST_CINEMATIC_WGSL,
        };
        vec![ShaderSnippet::new(POST_PASS, ShaderStage::Fragment, source)]
    }
}

/// Direct lighting model.
#[derive(Debug, Clone, Copy)]
pub struct LightingModule {
    /// The active lighting mode.
    pub mode: LightingMode,
}

impl CapabilityModule for LightingModule {
    fn name(&self) -> String {
        format!("lighting.{}", self.mode)
    }

    fn descriptor_bindings(&self) -> Vec<DescriptorBinding> {
        match self.mode {
            LightingMode::Baseline => Vec::new(),
            LightingMode::Physical => vec![DescriptorBinding::new(
                MAIN_PASS,
                0,
                2,
                DescriptorType::UniformBuffer,
                "exposure",
            )],
            LightingMode::BudgetPriority => vec![DescriptorBinding::new(
                MAIN_PASS,
                0,
                3,
                DescriptorType::StorageBuffer,
                "light_priorities",
            )],
        }
    }

    fn shader_snippets(&self) -> Vec<ShaderSnippet> {
        let source = match self.mode {
            LightingMode::Baseline => LIGHTING_BASELINE_WGSL,
            LightingMode::Physical => LIGHTING_PHYSICAL_WGSL,
            LightingMode::BudgetPriority => LIGHTING_BUDGET_WGSL,
        };
        vec![ShaderSnippet::new(MAIN_PASS, ShaderStage::Fragment, source)]
    }
}

/// The modules a profile activates, in composition order.
pub fn active_modules(key: &ProfileKey) -> Vec<Box<dyn CapabilityModule>> {
    vec![
        Box::new(CoreModule),
        Box::new(ShadowFilterModule {
            mode: key.shadow_filter,
        }),
        Box::new(ReflectionModule {
            mode: key.reflection,
        }),
        Box::new(AntiAliasingModule {
            mode: key.anti_aliasing,
        }),
        Box::new(PostModule { mode: key.post }),
        Box::new(LightingModule { mode: key.lighting }),
    ]
}
