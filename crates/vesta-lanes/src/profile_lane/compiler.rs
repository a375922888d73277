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

//! Profile compilation: from a [`ProfileKey`] to shader sources and
//! descriptor plans.

use std::collections::{BTreeMap, BTreeSet};

use vesta_core::renderer::{ProfileError, ProfileKey};

use super::{active_modules, compose, CapabilityModule, DescriptorPlan, ShaderStage};

/// The output of compiling one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledProfile {
    /// The key the profile was compiled for.
    pub key: ProfileKey,
    /// Names of the modules that contributed, in composition order.
    pub modules: Vec<String>,
    /// Assembled WGSL per `(pass, stage)`.
    pub shader_sources: BTreeMap<(String, ShaderStage), String>,
    /// Composed descriptor plan per pass.
    pub descriptor_plans: BTreeMap<String, DescriptorPlan>,
}

impl CompiledProfile {
    /// The WGSL source for a pass stage, if the profile has one.
    pub fn shader_source(&self, pass: &str, stage: ShaderStage) -> Option<&str> {
        self.shader_sources
            .get(&(pass.to_string(), stage))
            .map(String::as_str)
    }

    /// The descriptor plan of a pass.
    pub fn descriptor_plan(&self, pass: &str) -> Option<&DescriptorPlan> {
        self.descriptor_plans.get(pass)
    }

    /// Every pass the profile touches.
    pub fn passes(&self) -> impl Iterator<Item = &str> {
        self.descriptor_plans.keys().map(String::as_str)
    }
}

/// Compiles profile keys using the built-in capability modules.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileCompiler;

impl ProfileCompiler {
    /// Compiles `key` with the modules it activates.
    pub fn compile(&self, key: &ProfileKey) -> Result<CompiledProfile, ProfileError> {
        self.compile_modules(key, &active_modules(key))
    }

    /// Compiles `key` with an explicit module list.
    pub fn compile_modules(
        &self,
        key: &ProfileKey,
        modules: &[Box<dyn CapabilityModule>],
    ) -> Result<CompiledProfile, ProfileError> {
        let passes: BTreeSet<String> = modules.iter().flat_map(|m| m.passes()).collect();

        let module_refs: Vec<&dyn CapabilityModule> = modules.iter().map(|m| &**m).collect();
        let mut descriptor_plans = BTreeMap::new();
        for pass in &passes {
            let plan = compose(pass, &module_refs)?;
            descriptor_plans.insert(pass.clone(), plan);
        }

        let mut snippets: BTreeMap<(String, ShaderStage), Vec<&'static str>> = BTreeMap::new();
        for module in modules {
            for snippet in module.shader_snippets() {
                snippets
                    .entry((snippet.pass.to_string(), snippet.stage))
                    .or_default()
                    .push(snippet.source);
            }
        }

        let label = key.label();
        let shader_sources = snippets
            .into_iter()
            .map(|((pass, stage), parts)| {
                let declarations = descriptor_plans
                    .get(&pass)
                    .map(DescriptorPlan::wgsl_declarations)
                    .unwrap_or_default();
                let source = format!(
                    "// profile {} | pass {} | stage {}\n{}\n\n{}",
                    label,
                    pass,
                    stage.name(),
                    declarations,
                    parts.join("\n")
                );
                ((pass, stage), source)
            })
            .collect();

        log::info!(
            "Compiled profile '{}' ({} passes, {} modules)",
            label,
            descriptor_plans.len(),
            modules.len()
        );

        Ok(CompiledProfile {
            key: *key,
            modules: modules.iter().map(|m| m.name()).collect(),
            shader_sources,
            descriptor_plans,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_lane::{MAIN_PASS, POST_PASS, REFLECTION_PASS, TAA_PASS};
    use vesta_core::renderer::{
        AntiAliasingMode, LightingMode, QualityTier, ReflectionMode, ShadowFilterMode,
    };

    #[test]
    fn test_baseline_profile_compiles() {
        let key = ProfileKey::baseline(QualityTier::Medium);
        let profile = ProfileCompiler.compile(&key).unwrap();
        assert_eq!(profile.key, key);

        let main_fs = profile
            .shader_source(MAIN_PASS, ShaderStage::Fragment)
            .unwrap();
        assert!(main_fs.contains("@group(1) @binding(4) var shadow_atlas: texture_depth_2d;"));
        assert!(main_fs.contains("fn sample_shadow("));
        assert!(main_fs.contains("fn shade_lighting("));
        assert!(main_fs.contains("fn fs_main("));

        // FXAA and core share the post sampler slot.
        let post = profile.descriptor_plan(POST_PASS).unwrap();
        assert_eq!(post.len(), 2);
        assert!(profile.descriptor_plan(REFLECTION_PASS).is_none());
    }

    #[test]
    fn test_full_profile_touches_every_pass() {
        let key = ProfileKey {
            shadow_filter: ShadowFilterMode::Evsm,
            reflection: ReflectionMode::RayTraced,
            anti_aliasing: AntiAliasingMode::Taa,
            lighting: LightingMode::Physical,
            ..ProfileKey::baseline(QualityTier::Ultra)
        };
        let profile = ProfileCompiler.compile(&key).unwrap();
        let passes: Vec<&str> = profile.passes().collect();
        assert!(passes.contains(&REFLECTION_PASS));
        assert!(passes.contains(&TAA_PASS));
        assert!(profile
            .shader_source(REFLECTION_PASS, ShaderStage::Compute)
            .unwrap()
            .contains("scene_tlas"));
        assert!(profile
            .descriptor_plan(MAIN_PASS)
            .unwrap()
            .get(0, 2)
            .is_some());
    }

    #[test]
    fn test_different_keys_produce_different_sources() {
        let a = ProfileCompiler
            .compile(&ProfileKey::baseline(QualityTier::Medium))
            .unwrap();
        let mut key = ProfileKey::baseline(QualityTier::Medium);
        key.shadow_filter = ShadowFilterMode::Pcss;
        let b = ProfileCompiler.compile(&key).unwrap();
        assert_ne!(
            a.shader_source(MAIN_PASS, ShaderStage::Fragment),
            b.shader_source(MAIN_PASS, ShaderStage::Fragment)
        );
    }
}
