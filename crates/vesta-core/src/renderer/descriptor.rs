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

//! Defines descriptor binding requirements contributed by capability modules.
//!
//! A descriptor binding is a single resource-binding slot (descriptor set in
//! Vulkan, bind group in WebGPU) that a shader stage of a given render pass
//! needs. Capability modules contribute bindings; the composer in
//! `vesta-lanes` merges them into one plan per pass.

use serde::{Deserialize, Serialize};

/// The type of resource bound at a binding slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DescriptorType {
    /// A uniform buffer.
    UniformBuffer,
    /// A storage buffer.
    StorageBuffer,
    /// A sampled (read-only) texture.
    SampledTexture,
    /// A depth texture sampled with a comparison sampler.
    DepthTexture,
    /// A read/write storage texture.
    StorageTexture,
    /// A filtering or non-filtering sampler.
    Sampler,
    /// A comparison sampler (shadow lookups).
    ComparisonSampler,
    /// A ray-tracing acceleration structure.
    AccelerationStructure,
}

impl DescriptorType {
    /// Returns the WGSL declaration type used when generating binding declarations.
    pub fn wgsl_type(&self) -> &'static str {
        match self {
            DescriptorType::UniformBuffer => "uniform",
            DescriptorType::StorageBuffer => "storage, read",
            DescriptorType::SampledTexture => "texture_2d<f32>",
            DescriptorType::DepthTexture => "texture_depth_2d",
            DescriptorType::StorageTexture => "texture_storage_2d<rgba16float, write>",
            DescriptorType::Sampler => "sampler",
            DescriptorType::ComparisonSampler => "sampler_comparison",
            DescriptorType::AccelerationStructure => "acceleration_structure",
        }
    }

    /// Returns `true` for buffer-backed descriptor types.
    pub fn is_buffer(&self) -> bool {
        matches!(
            self,
            DescriptorType::UniformBuffer | DescriptorType::StorageBuffer
        )
    }
}

/// How often the resource behind a binding is expected to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BindingFrequency {
    /// Updated once per frame (camera, lights, atlases).
    PerFrame,
    /// Updated once per render pass.
    PerPass,
    /// Updated once per material.
    PerMaterial,
    /// Updated for every draw call.
    PerDraw,
}

/// A binding slot required by one capability module for one render pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DescriptorBinding {
    /// The render pass this binding belongs to (e.g. `"main"`, `"post"`).
    pub target_pass: String,
    /// The descriptor set (bind group) index.
    pub set: u32,
    /// The binding index inside the set (e.g. `@binding(4)` in WGSL).
    pub binding: u32,
    /// The type of resource bound at this slot.
    pub descriptor_type: DescriptorType,
    /// How often the bound resource changes.
    pub frequency: BindingFrequency,
    /// Whether the slot may hold an array of resources.
    pub array_capable: bool,
    /// The resource name used in generated shader declarations.
    ///
    /// Only the first contribution's name is kept when bindings are merged.
    pub name: String,
}

impl DescriptorBinding {
    /// Creates a per-frame, non-array binding for the given pass and slot.
    pub fn new(
        target_pass: impl Into<String>,
        set: u32,
        binding: u32,
        descriptor_type: DescriptorType,
        name: impl Into<String>,
    ) -> Self {
        Self {
            target_pass: target_pass.into(),
            set,
            binding,
            descriptor_type,
            frequency: BindingFrequency::PerFrame,
            array_capable: false,
            name: name.into(),
        }
    }

    /// Sets the binding frequency, returning the modified binding.
    pub fn with_frequency(mut self, frequency: BindingFrequency) -> Self {
        self.frequency = frequency;
        self
    }

    /// Marks the binding as array-capable, returning the modified binding.
    pub fn array(mut self) -> Self {
        self.array_capable = true;
        self
    }

    /// The `(set, binding)` slot this binding occupies.
    pub fn slot(&self) -> (u32, u32) {
        (self.set, self.binding)
    }

    /// Two bindings are compatible when they agree on type and frequency.
    pub fn is_compatible_with(&self, other: &DescriptorBinding) -> bool {
        self.descriptor_type == other.descriptor_type && self.frequency == other.frequency
    }

    /// Renders the WGSL declaration for this binding.
    pub fn wgsl_declaration(&self) -> String {
        let ty = self.descriptor_type.wgsl_type();
        if self.descriptor_type.is_buffer() {
            let body = match self.descriptor_type {
                DescriptorType::UniformBuffer => "mat4x4<f32>",
                _ => "array<vec4<f32>>",
            };
            format!(
                "@group({}) @binding({}) var<{}> {}: {};",
                self.set, self.binding, ty, self.name, body
            )
        } else if self.array_capable {
            format!(
                "@group({}) @binding({}) var {}: binding_array<{}>;",
                self.set, self.binding, self.name, ty
            )
        } else {
            format!(
                "@group({}) @binding({}) var {}: {};",
                self.set, self.binding, self.name, ty
            )
        }
    }
}
