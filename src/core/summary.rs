//! Natural-language scan summary
//!
//! Clause order is fixed:
//! 1. hazard alert
//! 2. unknown-person warning
//! 3. full report: names, object counts, empty room, light
//! 4. automatic report: arrivals since the previous summary
//!
//! Inputs are sorted sets/maps so the same facts always give the same text.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::SentryConfig;
use crate::types::{Centroid, LightState, MemorySnapshot};

/// Max object-count clauses in a full report
const MAX_OBJECT_CLAUSES: usize = 5;

#[derive(Debug, Clone)]
pub struct SummaryInput<'a> {
    /// Recognised names, without the unknown marker
    pub names: &'a BTreeSet<String>,
    pub unknown_count: usize,
    pub stable: &'a BTreeMap<String, Vec<Centroid>>,
    /// Every hazard seen during the session
    pub hazards: &'a BTreeSet<String>,
    pub light: LightState,
    /// Operator report (detailed) vs automatic (arrivals only)
    pub full: bool,
}

/// "ALERT! I see a and b."
pub fn hazard_clause(hazards: &BTreeSet<String>) -> String {
    format!("ALERT! I see {}.", join_and(hazards.iter().map(String::as_str)))
}

fn join_and<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    items.into_iter().collect::<Vec<_>>().join(" and ")
}

/// Build the summary and overwrite `memory` with the current names
pub fn generate(input: &SummaryInput<'_>, memory: &mut MemorySnapshot, config: &SentryConfig) -> String {
    let stable_counts: BTreeMap<&str, usize> = input
        .stable
        .iter()
        .filter(|(_, cents)| !cents.is_empty())
        .map(|(class, cents)| (class.as_str(), cents.len()))
        .collect();

    let mut hazards: BTreeSet<String> = input.hazards.clone();
    hazards.extend(
        stable_counts
            .keys()
            .filter(|class| config.is_hazard(class))
            .map(|class| class.to_string()),
    );

    let mut parts: Vec<String> = Vec::new();
    if !hazards.is_empty() {
        parts.push(hazard_clause(&hazards));
    }
    if input.unknown_count > 0 {
        parts.push(format!("Warning, {} unknown person.", input.unknown_count));
    }

    if input.full {
        if !input.names.is_empty() {
            parts.push(format!("I see {}.", join_and(input.names.iter().map(String::as_str))));
        }

        let objects: Vec<String> = stable_counts
            .iter()
            .filter(|(class, _)| !config.is_person(class) && !hazards.contains(**class))
            .take(MAX_OBJECT_CLAUSES)
            .map(|(class, n)| format!("{} {}{}", n, class, if *n > 1 { "s" } else { "" }))
            .collect();
        if !objects.is_empty() {
            parts.push(format!("Objects: {}.", objects.join(", ")));
        }

        if hazards.is_empty() && input.unknown_count == 0 && input.names.is_empty() && stable_counts.is_empty() {
            parts.push("Room is empty.".to_string());
        }

        parts.push(match input.light {
            LightState::On => "Light is on.".to_string(),
            LightState::Off => "Light is off.".to_string(),
            LightState::Unknown => "Light state is unknown.".to_string(),
        });
    } else if hazards.is_empty() && input.unknown_count == 0 {
        let arrived = memory.arrivals(input.names);
        if !arrived.is_empty() {
            parts.push(format!("{} arrived.", join_and(arrived)));
        }
    }

    memory.replace_people(input.names.clone());
    parts.join(" ")
}

// =============================================================================
// TESTS
// =============================================================================
