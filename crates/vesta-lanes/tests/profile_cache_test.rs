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

//! Integration tests for profile compilation and the shared profile cache.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use vesta_core::renderer::{
    AntiAliasingMode, DescriptorBinding, DescriptorType, LightingMode, ProfileError, ProfileKey,
    QualityTier, ReflectionMode, ShadowFilterMode,
};
use vesta_lanes::profile_lane::{
    active_modules, compose, CapabilityModule, ProfileCache, ProfileCompiler, ShaderSnippet,
    ShaderStage,
};
use vesta_lanes::render_lane::profile_passes;

fn every_key() -> Vec<ProfileKey> {
    let mut keys = Vec::new();
    for &tier in QualityTier::ALL {
        for &shadow_filter in ShadowFilterMode::ALL {
            for &reflection in ReflectionMode::ALL {
                for &anti_aliasing in AntiAliasingMode::ALL {
                    for &lighting in LightingMode::ALL {
                        keys.push(ProfileKey {
                            shadow_filter,
                            reflection,
                            anti_aliasing,
                            lighting,
                            ..ProfileKey::baseline(tier)
                        });
                    }
                }
            }
        }
    }
    keys
}

#[test]
fn test_scheduled_passes_are_all_compiled() {
    for key in every_key() {
        let profile = ProfileCompiler
            .compile(&key)
            .unwrap_or_else(|e| panic!("{} failed: {e}", key.label()));
        let compiled: Vec<&str> = profile.passes().collect();
        for pass in profile_passes(&key) {
            assert!(
                compiled.contains(&pass.id.as_str()),
                "{}: pass '{}' scheduled but not compiled ({:?})",
                key.label(),
                pass.id,
                compiled
            );
        }
    }
}

#[test]
fn test_every_builtin_profile_composes_without_conflict() {
    for key in every_key() {
        let profile = ProfileCompiler
            .compile(&key)
            .unwrap_or_else(|e| panic!("{} failed: {e}", key.label()));
        assert!(profile
            .shader_source("main", ShaderStage::Fragment)
            .is_some());
        assert!(profile.shader_source("post", ShaderStage::Fragment).is_some());
    }
}

#[test]
fn test_field_equal_keys_share_one_instance() {
    let cache = ProfileCache::new();
    let a = ProfileKey {
        reflection: ReflectionMode::ScreenSpace,
        ..ProfileKey::baseline(QualityTier::High)
    };
    let mut b = ProfileKey::baseline(QualityTier::High);
    b.reflection = ReflectionMode::ScreenSpace;

    let first = cache.get_or_compile(&a).unwrap();
    let second = cache.get_or_compile(&b).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.compile_count(), 1);
}

#[test]
fn test_concurrent_lookups_compile_once() {
    let cache = ProfileCache::new();
    let key = ProfileKey::baseline(QualityTier::Ultra);
    let compiles = AtomicUsize::new(0);
    let barrier = Barrier::new(8);

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    cache
                        .get_or_compile_with(&key, |k| {
                            compiles.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(20));
                            ProfileCompiler.compile(k)
                        })
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(compiles.load(Ordering::SeqCst), 1);
    assert_eq!(cache.compile_count(), 1);
    assert!(results.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
}

#[test]
fn test_unrelated_keys_compile_independently() {
    let cache = ProfileCache::new();
    let keys: Vec<ProfileKey> = QualityTier::ALL
        .iter()
        .map(|&tier| ProfileKey::baseline(tier))
        .collect();

    thread::scope(|scope| {
        for key in &keys {
            let cache = &cache;
            scope.spawn(move || cache.get_or_compile(key).unwrap());
        }
    });

    assert_eq!(cache.len(), keys.len());
    assert_eq!(cache.compile_count(), keys.len());
    assert!(keys.iter().all(|k| cache.contains(k)));
}

struct Probe;

impl CapabilityModule for Probe {
    fn name(&self) -> String {
        "probe_atlas".to_string()
    }

    fn descriptor_bindings(&self) -> Vec<DescriptorBinding> {
        vec![DescriptorBinding::new(
            "main",
            1,
            4,
            DescriptorType::SampledTexture,
            "probe_atlas",
        )]
    }

    fn shader_snippets(&self) -> Vec<ShaderSnippet> {
        Vec::new()
    }
}

#[test]
fn test_conflicting_module_fails_compile_and_is_not_cached() {
    let cache = ProfileCache::new();
    let key = ProfileKey::baseline(QualityTier::Medium);

    let result = cache.get_or_compile_with(&key, |k| {
        let mut modules = active_modules(k);
        modules.push(Box::new(Probe));
        ProfileCompiler.compile_modules(k, &modules)
    });

    match result {
        Err(ProfileError::DescriptorConflict {
            set,
            binding,
            incoming_module,
            ..
        }) => {
            assert_eq!((set, binding), (1, 4));
            assert_eq!(incoming_module, "probe_atlas");
        }
        other => panic!("expected a descriptor conflict, got {other:?}"),
    }
    assert!(cache.is_empty());
    assert!(cache.get_or_compile(&key).is_ok());
}

#[test]
fn test_builtin_shadow_binding_merges_with_identical_declaration() {
    let key = ProfileKey::baseline(QualityTier::Medium);
    let modules = active_modules(&key);
    let shadow = &modules[1];
    let plan = compose("main", &[&**shadow, &**shadow]).unwrap();
    let atlas: Vec<_> = plan.bindings.iter().filter(|b| b.slot() == (1, 4)).collect();
    assert_eq!(atlas.len(), 1);
}
