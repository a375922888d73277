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

//! The public-facing API of the Vesta render-capability core.
//!
//! Hosts create a [`FramePlanner`] from their [`CapabilitySettings`] and call
//! [`FramePlanner::plan_frame`] once per frame with the raw capability signals
//! and the shadow-casting lights. The returned [`FrameDecision`] carries the
//! resolved profile, its compiled shaders, the shadow atlas layout and the
//! diagnostics raised by the promotion gates and the shadow planner.

mod planner;

pub use planner::{FrameDecision, FramePlanner};

/// Everything a host typically needs, in one import.
pub mod prelude {
    pub use crate::{FrameDecision, FramePlanner};
    pub use vesta_control::{FrameSignals, LightingCapability, LightingSignal};
    pub use vesta_core::renderer::{
        Allocation, BackendOptions, CapabilitySettings, GateThresholds, GiMode, ProfileKey,
        QualityTier, ReflectionMode, ShadowFilterMode, ShadowTileRequest,
    };
    pub use vesta_core::telemetry::{Diagnostic, Severity};
    pub use vesta_lanes::profile_lane::{CompiledProfile, ShaderStage};
    pub use vesta_lanes::render_lane::{FrameGraph, Pass};
}
