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

//! The pass layout implied by a resolved profile.

use vesta_core::renderer::{AntiAliasingMode, ProfileKey};

use super::PassDeclaration;

/// Pass id of the shadow atlas pass.
pub const SHADOW_PASS: &str = "shadows";
/// Pass id of the main geometry and lighting pass.
pub const MAIN_PASS: &str = "main";
/// Pass id of the reflection pass.
pub const REFLECTION_PASS: &str = "reflections";
/// Pass id of the temporal anti-aliasing resolve.
pub const TAA_PASS: &str = "taa";
/// Pass id of the post-processing pass.
pub const POST_PASS: &str = "post";

fn declaration(id: &str, depends_on: &[&str], reads: &[&str], writes: &[&str]) -> PassDeclaration {
    let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
    PassDeclaration {
        id: id.to_string(),
        depends_on: owned(depends_on),
        reads: owned(reads),
        writes: owned(writes),
    }
}

/// Returns the pass declarations a frame rendered with `key` needs, in
/// declaration order.
///
/// Shadows and main are always present. The reflection pass only exists for
/// techniques that trace (probe lookups happen inside the main pass), and the TAA resolve only exists for TAA profiles.
pub fn profile_passes(key: &ProfileKey) -> Vec<PassDeclaration> {
    let mut passes = vec![
        declaration(SHADOW_PASS, &[], &[], &["shadow_atlas"]),
        declaration(
            MAIN_PASS,
            &[SHADOW_PASS],
            &["shadow_atlas"],
            &["hdr_color", "depth"],
        ),
    ];

    let mut post_input = MAIN_PASS;
    if key.reflection.traces() {
        passes.push(declaration(
            REFLECTION_PASS,
            &[MAIN_PASS],
            &["depth"],
            &["hdr_color"],
        ));
        post_input = REFLECTION_PASS;
    }

    if key.anti_aliasing == AntiAliasingMode::Taa {
        passes.push(declaration(
            TAA_PASS,
            &[post_input],
            &["depth", "taa_history"],
            &["hdr_color", "taa_history"],
        ));
        post_input = TAA_PASS;
    }

    passes.push(declaration(
        POST_PASS,
        &[post_input],
        &["hdr_color"],
        &["swapchain"],
    ));
    passes
}
