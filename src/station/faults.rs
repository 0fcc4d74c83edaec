//! Fault/warning injection policy.
//!
//! Two layers, evaluated in priority order:
//! 1. scripted overrides keyed by string id (always win, no randomness);
//! 2. a per-panel uniform draw splitting into critical fault, warning, or
//!    normal, plus an extra soiling chance in dusty zones.

use std::collections::HashMap;

use rand::Rng;

use crate::config::{FaultConfig, ZoneConfig};

use super::types::Issue;

/// Decides the condition of each generated panel.
#[derive(Debug, Clone)]
pub struct FaultPolicy<'a> {
    config: &'a FaultConfig,
    scripted: HashMap<&'a str, Issue>,
}

impl<'a> FaultPolicy<'a> {
    /// Builds a policy from the fault configuration.
    ///
    /// When the same string id is scripted twice the first entry wins.
    pub fn new(config: &'a FaultConfig) -> Self {
        let mut scripted = HashMap::with_capacity(config.scripted.len());
        for s in &config.scripted {
            scripted.entry(s.string_id.as_str()).or_insert(s.issue);
        }
        Self { config, scripted }
    }

    /// Scripted issue for a string, if any.
    pub fn scripted_issue(&self, string_id: &str) -> Option<Issue> {
        self.scripted.get(string_id).copied()
    }

    /// Returns the issue for one panel, or `None` if it is healthy.
    ///
    /// Consumes no randomness for scripted strings or when injection is
    /// disabled, so scripted placement never shifts the random stream of the
    /// panels around it.
    pub fn assess<R: Rng + ?Sized>(
        &self,
        string_id: &str,
        zone: &ZoneConfig,
        rng: &mut R,
    ) -> Option<Issue> {
        if let Some(issue) = self.scripted_issue(string_id) {
            return Some(issue);
        }
        if !self.config.enabled {
            return None;
        }

        let roll: f64 = rng.random();
        let fault_p = self.config.fault_probability;
        let warning_p = self.config.warning_probability;

        if roll < fault_p {
            return Some(pick(&Issue::CRITICAL, rng));
        }
        if roll < fault_p + warning_p {
            return Some(pick(&Issue::WARNINGS, rng));
        }
        if zone.dusty && rng.random::<f64>() < self.config.dusty_soiling_probability {
            return Some(Issue::UnevenSoiling);
        }
        None
    }
}

fn pick<R: Rng + ?Sized>(issues: &[Issue], rng: &mut R) -> Issue {
    issues[rng.random_range(0..issues.len())]
}
