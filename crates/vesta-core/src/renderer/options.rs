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

//! The string-keyed backend option map handed over by the configuration layer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Per-feature backend options, keyed by dotted names (e.g. `"gi.mode"`).
///
/// Values arrive as strings from the host; typed getters parse them and fall
/// back to the provided default (logging a warning) when a value is malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendOptions {
    entries: BTreeMap<String, String>,
}

impl BackendOptions {
    /// Creates an empty option map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an option, returning the modified map.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts or replaces an option.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Returns the raw, trimmed value of an option.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|v| v.trim())
    }

    /// Returns `true` if the option is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of options.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no option is set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses a numeric option and clamps it to `[min, max]`.
    pub fn get_clamped<T>(&self, key: &str, default: T, min: T, max: T) -> T
    where
        T: FromStr + PartialOrd + Copy + std::fmt::Debug,
    {
        let Some(raw) = self.get(key) else {
            return default;
        };
        match raw.parse::<T>() {
            Ok(value) if value < min => min,
            Ok(value) if value > max => max,
            Ok(value) => value,
            Err(_) => {
                log::warn!(
                    "BackendOptions: '{}' = '{}' is not a valid number, using {:?}",
                    key,
                    raw,
                    default
                );
                default
            }
        }
    }

    /// Parses a boolean option (`true/false`, `on/off`, `1/0`, `yes/no`).
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        let Some(raw) = self.get(key) else {
            return default;
        };
        match raw.to_ascii_lowercase().as_str() {
            "true" | "on" | "1" | "yes" => true,
            "false" | "off" | "0" | "no" => false,
            _ => {
                log::warn!(
                    "BackendOptions: '{}' = '{}' is not a valid boolean, using {}",
                    key,
                    raw,
                    default
                );
                default
            }
        }
    }

    /// Parses an option with a custom parser (typically a mode's `from_id`).
    pub fn get_parsed<T>(&self, key: &str, default: T, parse: impl Fn(&str) -> Option<T>) -> T
    where
        T: std::fmt::Debug,
    {
        let Some(raw) = self.get(key) else {
            return default;
        };
        match parse(raw) {
            Some(value) => value,
            None => {
                log::warn!(
                    "BackendOptions: '{}' = '{}' is not recognized, using {:?}",
                    key,
                    raw,
                    default
                );
                default
            }
        }
    }
}

impl<K, V> FromIterator<(K, V)> for BackendOptions
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
