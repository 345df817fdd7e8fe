//! Visit schedule: column labels to cycle numbers and elapsed time.
//!
//! Assessment columns are labelled with a cycle token such as `C1`, `C12` or
//! `Cycle 3`. Elapsed time is cycle-based: cycle `k` is `k × cycle length`
//! days after treatment start, and months use the average month length.

use std::collections::BTreeMap;

use onco_model::DerivationOptions;

use crate::error::{DerivationError, Result};

/// One visit column of the schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub label: String,
    pub cycle: u32,
}

/// Parses a cycle token (`C<k>` or `Cycle <k>`, case-insensitive).
pub fn parse_cycle_label(label: &str) -> Result<u32> {
    let malformed = |reason| DerivationError::MalformedVisitLabel {
        label: label.to_string(),
        reason,
    };
    let trimmed = label.trim();
    let upper = trimmed.to_ascii_uppercase();
    let rest = upper
        .strip_prefix("CYCLE")
        .or_else(|| upper.strip_prefix('C'))
        .ok_or_else(|| malformed("expected a C<k> cycle token"))?
        .trim_start_matches(['_', ' ', '-']);
    if rest.is_empty() {
        return Err(malformed("missing cycle number"));
    }
    if !rest.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(malformed("cycle number must be a positive integer"));
    }
    let cycle: u32 = rest
        .parse()
        .map_err(|_| malformed("cycle number out of range"))?;
    if cycle == 0 {
        return Err(malformed("cycle numbers start at 1"));
    }
    Ok(cycle)
}

/// Mapping from visit columns to cycles and elapsed time.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitSchedule {
    visits: Vec<Visit>,
    cycle_length_days: u32,
    days_per_month: f64,
}

impl VisitSchedule {
    /// Builds a schedule from column labels, in column order.
    ///
    /// Fails on the first malformed label, or when two labels name the same cycle.
    pub fn from_labels(labels: &[String], options: &DerivationOptions) -> Result<Self> {
        if labels.is_empty() {
            return Err(DerivationError::EmptySchedule);
        }
        let mut seen: BTreeMap<u32, &str> = BTreeMap::new();
        let mut visits = Vec::with_capacity(labels.len());
        for label in labels {
            let cycle = parse_cycle_label(label)?;
            if let Some(first) = seen.insert(cycle, label.as_str()) {
                return Err(DerivationError::DuplicateCycle {
                    cycle,
                    first: first.to_string(),
                    second: label.clone(),
                });
            }
            visits.push(Visit {
                label: label.clone(),
                cycle,
            });
        }
        Ok(Self {
            visits,
            cycle_length_days: options.cycle_length_days,
            days_per_month: options.days_per_month,
        })
    }

    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    /// Cycle number of the visit column at `index`.
    pub fn cycle_at(&self, index: usize) -> Option<u32> {
        self.visits.get(index).map(|visit| visit.cycle)
    }

    pub fn cycle_length_days(&self) -> u32 {
        self.cycle_length_days
    }

    /// Elapsed days at `cycle`.
    pub fn days(&self, cycle: u32) -> u64 {
        u64::from(cycle) * u64::from(self.cycle_length_days)
    }

    /// Elapsed months at `cycle`.
    pub fn months(&self, cycle: u32) -> f64 {
        self.days(cycle) as f64 / self.days_per_month
    }
}
