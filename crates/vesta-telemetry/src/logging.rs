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

//! `env_logger` bootstrap.

use env_logger::{Builder, Env};

/// Installs `env_logger` as the global logger.
///
/// `RUST_LOG` wins over `default_filter`. Returns `false` if a logger was
/// already installed, which makes repeated calls (tests, embedders) harmless.
pub fn init_logging(default_filter: &str) -> bool {
    Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_a_no_op() {
        init_logging("debug");
        assert!(!init_logging("info"));
    }
}
