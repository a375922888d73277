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

//! Provides the backend-agnostic contracts of the render-capability core.
//!
//! This module defines the "common language" shared by the scheduling and
//! planning lanes: the quality tier and capability settings consumed from the
//! configuration layer, the profile key vocabulary, descriptor bindings, the
//! shadow atlas value types and the error taxonomy.
//!
//! The 'what' lives here, while the 'how' (scheduling, packing, composition)
//! lives in `vesta-lanes` and the adaptive policies in `vesta-control`.

pub mod descriptor;
pub mod error;
pub mod options;
pub mod profile;
pub mod settings;
pub mod shadow;

// Re-export the most important types for easier use.
pub use self::descriptor::{BindingFrequency, DescriptorBinding, DescriptorType};
pub use self::error::{ConfigError, FrameGraphError, ProfileError};
pub use self::options::BackendOptions;
pub use self::profile::{
    AntiAliasingMode, GiMode, LightingMode, PostMode, ProfileKey, QualityTier, ReflectionMode,
    ShadowFilterMode,
};
pub use self::settings::{CapabilitySettings, GateThresholds};
pub use self::shadow::{Allocation, ExistingAllocation, ShadowTileRequest};
