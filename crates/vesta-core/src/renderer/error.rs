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

//! Defines the hierarchy of error types for the render-capability core.
//!
//! Every error here is a construction-time failure: it aborts the build or
//! compile attempt that raised it and is returned to the caller unmodified.
//! The per-frame computations (shadow planning, gate updates) are total and
//! have no error type.

use crate::renderer::descriptor::{BindingFrequency, DescriptorType};
use thiserror::Error;

/// An error raised while building a frame graph from pass declarations.
///
/// None of these are recoverable by retrying: the pass declarations must be fixed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameGraphError {
    /// Two passes were declared with the same id.
    #[error("Pass '{pass}' is declared more than once")]
    DuplicatePass {
        /// The repeated pass id.
        pass: String,
    },
    /// A pass depends on an id that is not part of the graph.
    #[error("Pass '{pass}' depends on unknown pass '{dependency}'")]
    MissingDependency {
        /// The pass declaring the dependency.
        pass: String,
        /// The dependency id that could not be resolved.
        dependency: String,
    },
    /// The explicit dependencies form at least one cycle.
    #[error("Cyclic dependency between passes: {}", passes.join(", "))]
    CyclicDependency {
        /// The passes that could not be scheduled, in declaration order.
        passes: Vec<String>,
    },
    /// Two passes touch the same resource and at least one writes it, but no
    /// explicit dependency chain orders them.
    #[error(
        "Passes '{first}' and '{second}' both access resource '{resource}' without an explicit dependency"
    )]
    UnorderedHazard {
        /// The earlier declared pass of the pair.
        first: String,
        /// The later declared pass of the pair.
        second: String,
        /// The shared resource key.
        resource: String,
    },
}

/// An error raised while composing or compiling a pipeline profile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    /// Two capability modules declared incompatible bindings for the same slot.
    #[error(
        "Descriptor conflict in pass '{pass}' at set {set}, binding {binding}: \
         '{existing_module}' declares {existing_type:?}/{existing_frequency:?} \
         but '{incoming_module}' declares {incoming_type:?}/{incoming_frequency:?}"
    )]
    DescriptorConflict {
        /// The render pass being composed.
        pass: String,
        /// The descriptor set index.
        set: u32,
        /// The binding index inside the set.
        binding: u32,
        /// The module that contributed the binding first.
        existing_module: String,
        /// Descriptor type of the first contribution.
        existing_type: DescriptorType,
        /// Binding frequency of the first contribution.
        existing_frequency: BindingFrequency,
        /// The module whose contribution disagreed.
        incoming_module: String,
        /// Descriptor type of the disagreeing contribution.
        incoming_type: DescriptorType,
        /// Binding frequency of the disagreeing contribution.
        incoming_frequency: BindingFrequency,
    },
}

/// An error raised while loading capability settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read or written.
    #[error("Failed to access settings file: {0}")]
    Io(#[from] std::io::Error),
    /// The JSON document could not be parsed.
    #[error("Invalid JSON settings: {0}")]
    Json(#[from] serde_json::Error),
    /// The RON document could not be parsed.
    #[error("Invalid RON settings: {0}")]
    Ron(#[from] ron::error::SpannedError),
}
