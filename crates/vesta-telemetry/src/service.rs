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

//! Diagnostics sink: collects coded diagnostics from any thread and forwards
//! them to the log once per tick.

use std::collections::VecDeque;

use ahash::AHashMap;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use vesta_core::telemetry::{Diagnostic, Severity};

/// Configuration for the [`DiagnosticsService`].
#[derive(Debug, Clone)]
pub struct DiagnosticsConfig {
    /// Maximum number of diagnostics buffered between two ticks.
    /// If the buffer is full, new diagnostics are dropped.
    pub buffer_size: usize,
    /// Number of most recent diagnostics kept for inspection.
    pub history_len: usize,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            buffer_size: 1000,
            history_len: 256,
        }
    }
}

/// Collects diagnostics, logs them and keeps per-code counters.
#[derive(Debug)]
pub struct DiagnosticsService {
    config: DiagnosticsConfig,
    tx: Sender<Diagnostic>,
    rx: Receiver<Diagnostic>,
    counts: AHashMap<String, u64>,
    history: VecDeque<Diagnostic>,
    dropped: u64,
}

impl DiagnosticsService {
    /// Creates a new service.
    pub fn new(config: DiagnosticsConfig) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(config.buffer_size.max(1));
        Self {
            history: VecDeque::with_capacity(config.history_len),
            config,
            tx,
            rx,
            counts: AHashMap::new(),
            dropped: 0,
        }
    }

    /// A sender other threads can publish diagnostics with.
    pub fn sender(&self) -> Sender<Diagnostic> {
        self.tx.clone()
    }

    /// Queues a diagnostic. Returns `false` if the buffer is full.
    pub fn publish(&mut self, diagnostic: Diagnostic) -> bool {
        match self.tx.try_send(diagnostic) {
            Ok(()) => true,
            Err(TrySendError::Full(d)) | Err(TrySendError::Disconnected(d)) => {
                log::trace!("Diagnostics buffer full, dropping {}", d.code);
                self.dropped += 1;
                false
            }
        }
    }

    /// Queues every diagnostic of a frame.
    pub fn publish_all(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.publish(diagnostic);
        }
    }

    /// Drains the buffer, logging every diagnostic. Returns how many were drained.
    ///
    /// Should be called once per frame.
    pub fn tick(&mut self) -> usize {
        let mut drained = 0;
        while let Ok(diagnostic) = self.rx.try_recv() {
            match diagnostic.severity {
                Severity::Info => log::info!("{}", diagnostic),
                Severity::Warning => log::warn!("{}", diagnostic),
                Severity::Error => log::error!("{}", diagnostic),
            }
            *self.counts.entry(diagnostic.code.clone()).or_insert(0) += 1;

            if self.config.history_len > 0 {
                if self.history.len() == self.config.history_len {
                    self.history.pop_front();
                }
                self.history.push_back(diagnostic);
            }
            drained += 1;
        }
        drained
    }

    /// How many diagnostics with `code` were drained so far.
    pub fn count(&self, code: &str) -> u64 {
        self.counts.get(code).copied().unwrap_or(0)
    }

    /// Every code seen so far with its count, sorted by code.
    pub fn counts(&self) -> Vec<(&str, u64)> {
        let mut counts: Vec<(&str, u64)> = self
            .counts
            .iter()
            .map(|(code, n)| (code.as_str(), *n))
            .collect();
        counts.sort_unstable();
        counts
    }

    /// The most recent diagnostics, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &Diagnostic> {
        self.history.iter()
    }

    /// Diagnostics lost to a full buffer through [`publish`](Self::publish).
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl Default for DiagnosticsService {
    fn default() -> Self {
        Self::new(DiagnosticsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn tick_drains_and_counts() {
        let mut service = DiagnosticsService::default();
        service.publish(Diagnostic::warning("GI_PROMOTION_ENVELOPE_BREACH", "inactive"));
        service.publish(Diagnostic::warning("GI_PROMOTION_ENVELOPE_BREACH", "inactive"));
        service.publish(Diagnostic::info("GI_PROMOTION_PROMOTION_READY", "stable"));

        assert_eq!(service.tick(), 3);
        assert_eq!(service.tick(), 0);
        assert_eq!(service.count("GI_PROMOTION_ENVELOPE_BREACH"), 2);
        assert_eq!(service.count("UNKNOWN"), 0);
        assert_eq!(
            service.counts(),
            vec![
                ("GI_PROMOTION_ENVELOPE_BREACH", 2),
                ("GI_PROMOTION_PROMOTION_READY", 1)
            ]
        );
    }

    #[test]
    fn history_is_bounded() {
        let mut service = DiagnosticsService::new(DiagnosticsConfig {
            buffer_size: 16,
            history_len: 2,
        });
        for i in 0..5 {
            service.publish(Diagnostic::info(format!("CODE_{i}"), ""));
        }
        service.tick();
        let codes: Vec<&str> = service.history().map(|d| d.code.as_str()).collect();
        assert_eq!(codes, vec!["CODE_3", "CODE_4"]);
    }

    #[test]
    fn full_buffer_drops() {
        let mut service = DiagnosticsService::new(DiagnosticsConfig {
            buffer_size: 1,
            history_len: 4,
        });
        assert!(service.publish(Diagnostic::info("A", "")));
        assert!(!service.publish(Diagnostic::info("B", "")));
        assert_eq!(service.dropped(), 1);
        assert_eq!(service.tick(), 1);
    }

    #[test]
    fn accepts_diagnostics_from_other_threads() {
        let mut service = DiagnosticsService::default();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let tx = service.sender();
                thread::spawn(move || {
                    tx.send(Diagnostic::error(format!("WORKER_{i}"), "failed"))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(service.tick(), 4);
        assert_eq!(service.count("WORKER_2"), 1);
    }
}
