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

//! # Vesta Control
//!
//! The adaptive half of the capability core. Raw per-frame availability
//! signals are noisy; this crate turns them into stable decisions:
//!
//! - [`gate::PromotionGate`] is the single hysteresis primitive.
//! - [`gi_policy::GiPromotionPolicy`] and
//!   [`lighting_envelope::LightingEnvelopePolicy`] wrap it per feature.
//! - [`profile_resolver::ProfileResolver`] maps tier, signals and gate outputs
//!   to a canonical [`vesta_core::renderer::ProfileKey`].

#![warn(missing_docs)]

pub mod context;
pub mod gate;
pub mod gi_policy;
pub mod lighting_envelope;
pub mod profile_resolver;

pub use context::FrameSignals;
pub use gate::{GateSnapshot, GateState, GatedFeature, LightingCapability, PromotionGate};
pub use gi_policy::{GiPromotionPolicy, GiPromotionSnapshot};
pub use lighting_envelope::{LightingEnvelopePolicy, LightingEnvelopeSnapshot, LightingSignal};
pub use profile_resolver::{ProfileResolution, ProfileResolver, ResolverInput};
