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

//! Built-in WGSL snippets contributed by the capability modules.
//!
//! Snippets are not complete shaders. The profile compiler prepends the
//! composed binding declarations of the pass and concatenates the snippets of
//! every active module, so each family of snippets implements the same entry
//! function:
//!
//! - shadow filters implement `sample_shadow`
//! - reflection techniques implement `sample_reflection` (main pass) or
//!   `cs_reflections` (reflection pass)
//! - anti-aliasing modes implement `apply_aa` (or the `fs_taa` resolve)
//! - post modes implement `tone_map`
//! - lighting modes implement `shade_lighting`

/// Main pass vertex entry point.
pub const CORE_MAIN_VS_WGSL: &str = include_str!("core_main_vs.wgsl");
/// Main pass fragment entry point.
pub const CORE_MAIN_FS_WGSL: &str = include_str!("core_main_fs.wgsl");
/// Depth-only vertex entry point of the shadow pass.
pub const CORE_SHADOW_VS_WGSL: &str = include_str!("core_shadow_vs.wgsl");
/// Post pass fragment entry point.
pub const CORE_POST_FS_WGSL: &str = include_str!("core_post_fs.wgsl");

/// 3x3 percentage-closer filtering.
pub const SHADOW_PCF_WGSL: &str = include_str!("shadow_pcf.wgsl");
/// Percentage-closer soft shadows with a blocker search.
pub const SHADOW_PCSS_WGSL: &str = include_str!("shadow_pcss.wgsl");
/// Exponential variance shadow maps.
pub const SHADOW_EVSM_WGSL: &str = include_str!("shadow_evsm.wgsl");
/// Moment shadow maps.
pub const SHADOW_MOMENT_WGSL: &str = include_str!("shadow_moment.wgsl");

/// No reflections in the main pass.
pub const REFLECTION_OFF_WGSL: &str = include_str!("reflection_off.wgsl");
/// Reflection probe lookup.
pub const REFLECTION_PROBE_WGSL: &str = include_str!("reflection_probe.wgsl");
/// Screen-space reflection march.
pub const REFLECTION_SSR_CS_WGSL: &str = include_str!("reflection_ssr_cs.wgsl");
/// Hardware ray-traced reflections.
pub const REFLECTION_RT_CS_WGSL: &str = include_str!("reflection_rt_cs.wgsl");

/// Pass-through resolve.
pub const AA_OFF_WGSL: &str = include_str!("aa_off.wgsl");
/// Fast approximate anti-aliasing.
pub const AA_FXAA_WGSL: &str = include_str!("aa_fxaa.wgsl");
/// Temporal anti-aliasing resolve.
pub const AA_TAA_FS_WGSL: &str = include_str!("aa_taa_fs.wgsl");

/// Clamp-only tone mapping.
pub const POST_MINIMAL_WGSL: &str = include_str!("post_minimal.wgsl");
/// Reinhard tone mapping with gamma.
pub const POST_STANDARD_WGSL: &str = include_str!("post_standard.wgsl");
/// ACES tone mapping with color grading.
pub const POST_CINEMATIC_WGSL: &str = include_str!("post_cinematic.wgsl");

/// Unitless Lambert lighting.
pub const LIGHTING_BASELINE_WGSL: &str = include_str!("lighting_baseline.wgsl");
/// Physically based units with exposure.
pub const LIGHTING_PHYSICAL_WGSL: &str = include_str!("lighting_physical.wgsl");
/// Lighting over the prioritized light subset.
pub const LIGHTING_BUDGET_WGSL: &str = include_str!("lighting_budget.wgsl");
