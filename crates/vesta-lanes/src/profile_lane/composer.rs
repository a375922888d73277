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

//! Descriptor composition: merges the binding requirements of every module
//! contributing to a pass into a single, conflict-free plan.

use std::collections::BTreeMap;

use vesta_core::renderer::{DescriptorBinding, ProfileError};

use super::CapabilityModule;

/// The merged bindings of one pass, sorted by `(set, binding)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DescriptorPlan {
    /// The pass the plan belongs to.
    pub pass: String,
    /// Merged bindings, one per slot.
    pub bindings: Vec<DescriptorBinding>,
}

impl DescriptorPlan {
    /// The binding at `(set, binding)`, if any.
    pub fn get(&self, set: u32, binding: u32) -> Option<&DescriptorBinding> {
        self.bindings.iter().find(|b| b.slot() == (set, binding))
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if the pass binds nothing.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// WGSL declarations for every slot, one per line.
    pub fn wgsl_declarations(&self) -> String {
        self.bindings
            .iter()
            .map(DescriptorBinding::wgsl_declaration)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Merges the bindings that `modules` declare for `pass`.
///
/// Bindings for other passes are ignored. Two contributions to the same slot
/// must agree on descriptor type and frequency; agreeing duplicates are kept
/// once, array-capable if any contribution is.
pub fn compose(
    pass: &str,
    modules: &[&dyn CapabilityModule],
) -> Result<DescriptorPlan, ProfileError> {
    let mut slots: BTreeMap<(u32, u32), (String, DescriptorBinding)> = BTreeMap::new();

    for module in modules {
        let module_name = module.name();
        for incoming in module
            .descriptor_bindings()
            .into_iter()
            .filter(|b| b.target_pass == pass)
        {
            match slots.get_mut(&incoming.slot()) {
                Some((existing_module, existing)) => {
                    if !existing.is_compatible_with(&incoming) {
                        return Err(ProfileError::DescriptorConflict {
                            pass: pass.to_string(),
                            set: incoming.set,
                            binding: incoming.binding,
                            existing_module: existing_module.clone(),
                            existing_type: existing.descriptor_type,
                            existing_frequency: existing.frequency,
                            incoming_module: module_name,
                            incoming_type: incoming.descriptor_type,
                            incoming_frequency: incoming.frequency,
                        });
                    }
                    existing.array_capable |= incoming.array_capable;
                }
                None => {
                    slots.insert(incoming.slot(), (module_name.clone(), incoming));
                }
            }
        }
    }

    Ok(DescriptorPlan {
        pass: pass.to_string(),
        bindings: slots.into_values().map(|(_, binding)| binding).collect(),
    })
}
