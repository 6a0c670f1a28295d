//! Check definitions offered by the configuration UI
//!
//! Every check has an id of the form `config-N`. Only some of them are backed
//! by an inspection in the IDE plugin; the others can be stored but are left
//! out of plugin downloads.

use crate::types::{Configuration, Priority};
use serde::Serialize;

/// Number of checks the UI offers (`config-1` ..= `config-23`)
pub const CHECK_COUNT: u32 = 23;

/// Check id to plugin inspection name
const INSPECTIONS: &[(&str, &str)] = &[
    ("config-2", "inheritance"),
    ("config-3", "no-inheritance"),
    ("config-4", "interfaces"),
    ("config-5", "no-interfaces"),
    ("config-12", "camelcase"),
    ("config-13", "screaming-snake-case"),
    ("config-14", "redundant-else"),
    ("config-15", "single-char-name"),
    ("config-16", "method-length"),
    ("config-17", "clone"),
];

pub fn is_known_check(id: &str) -> bool {
    id.strip_prefix("config-")
        .and_then(|n| n.parse::<u32>().ok())
        .is_some_and(|n| (1..=CHECK_COUNT).contains(&n) && id == format!("config-{n}"))
}

/// Plugin inspection implementing `id`, if any
pub fn inspection_for(id: &str) -> Option<&'static str> {
    INSPECTIONS
        .iter()
        .find(|(check, _)| *check == id)
        .map(|(_, inspection)| *inspection)
}

/// Inspections grouped by priority, as consumed by the IDE plugin
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PluginChecks {
    pub high: Vec<&'static str>,
    pub medium: Vec<&'static str>,
    pub low: Vec<&'static str>,
}

impl PluginChecks {
    pub fn from_configuration(config: &Configuration) -> Self {
        let resolve = |priority: Priority| -> Vec<&'static str> {
            config
                .checks(priority)
                .iter()
                .filter_map(|entry| inspection_for(&entry.check))
                .collect()
        };

        Self {
            high: resolve(Priority::High),
            medium: resolve(Priority::Medium),
            low: resolve(Priority::Low),
        }
    }
}
