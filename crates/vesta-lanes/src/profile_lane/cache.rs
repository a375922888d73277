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

//! Memoizing cache of compiled profiles.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use ahash::AHashMap;
use vesta_core::renderer::{ProfileError, ProfileKey};

use super::{CompiledProfile, ProfileCompiler};

type Slot = Arc<Mutex<Option<Arc<CompiledProfile>>>>;

/// Compiles each profile key at most once and shares the result.
///
/// The map lock is only held to fetch or insert the slot of a key. The slot
/// lock serializes the first compilation of that key, so concurrent lookups
/// of the same key wait for a single compile while other keys proceed.
#[derive(Debug, Default)]
pub struct ProfileCache {
    compiler: ProfileCompiler,
    slots: Mutex<AHashMap<ProfileKey, Slot>>,
    compile_count: AtomicUsize,
}

impl ProfileCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the compiled profile for `key`, compiling it on first use.
    pub fn get_or_compile(&self, key: &ProfileKey) -> Result<Arc<CompiledProfile>, ProfileError> {
        let compiler = self.compiler;
        self.get_or_compile_with(key, |k| compiler.compile(k))
    }

    /// Like [`get_or_compile`](Self::get_or_compile) with a custom compile step.
    ///
    /// A failed compile leaves the slot empty, so the next lookup retries.
    pub fn get_or_compile_with<F>(
        &self,
        key: &ProfileKey,
        compile: F,
    ) -> Result<Arc<CompiledProfile>, ProfileError>
    where
        F: FnOnce(&ProfileKey) -> Result<CompiledProfile, ProfileError>,
    {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(*key).or_default())
        };

        let mut entry = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(profile) = entry.as_ref() {
            return Ok(Arc::clone(profile));
        }

        let profile = Arc::new(compile(key)?);
        self.compile_count.fetch_add(1, Ordering::Relaxed);
        *entry = Some(Arc::clone(&profile));
        log::debug!("Profile '{}' cached", key.label());
        Ok(profile)
    }

    /// Returns `true` if `key` has a compiled profile.
    pub fn contains(&self, key: &ProfileKey) -> bool {
        let slot = {
            let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            match slots.get(key) {
                Some(slot) => Arc::clone(slot),
                None => return false,
            }
        };
        let entry = slot.lock().unwrap_or_else(PoisonError::into_inner);
        entry.is_some()
    }

    /// Number of compiled profiles held.
    pub fn len(&self) -> usize {
        let slots: Vec<Slot> = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        slots
            .iter()
            .filter(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner).is_some())
            .count()
    }

    /// Returns `true` if nothing has been compiled yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of successful compilations.
    pub fn compile_count(&self) -> usize {
        self.compile_count.load(Ordering::Relaxed)
    }

    /// Drops every cached profile.
    pub fn clear(&self) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
