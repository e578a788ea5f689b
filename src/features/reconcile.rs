//! Reconciliation of observed encoded columns against the expected schema

use crate::features::EncodedVector;
use std::collections::HashMap;

/// What happened to a single column during reconciliation
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnOutcome {
    /// Expected and observed; the observed value is kept
    Matched { column: String, value: f64 },
    /// Expected but not observed; filled with 0.0
    Filled { column: String },
    /// Observed but not expected; discarded
    Dropped { column: String, value: f64 },
}

impl ColumnOutcome {
    pub fn column(&self) -> &str {
        match self {
            ColumnOutcome::Matched { column, .. }
            | ColumnOutcome::Filled { column }
            | ColumnOutcome::Dropped { column, .. } => column,
        }
    }
}

/// Outcome of aligning observed columns to an expected layout.
///
/// Expected columns come first, in schema order; dropped columns follow in
/// the order they were observed.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    outcomes: Vec<ColumnOutcome>,
}

impl Reconciliation {
    pub fn outcomes(&self) -> &[ColumnOutcome] {
        &self.outcomes
    }

    pub fn filled(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().filter_map(|o| match o {
            ColumnOutcome::Filled { column } => Some(column.as_str()),
            _ => None,
        })
    }

    pub fn dropped(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().filter_map(|o| match o {
            ColumnOutcome::Dropped { column, .. } => Some(column.as_str()),
            _ => None,
        })
    }

    pub fn matched_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ColumnOutcome::Matched { .. }))
            .count()
    }

    /// Values for the expected columns, in schema order.
    pub fn into_vector(self) -> EncodedVector {
        let values = self
            .outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                ColumnOutcome::Matched { value, .. } => Some(value),
                ColumnOutcome::Filled { .. } => Some(0.0),
                ColumnOutcome::Dropped { .. } => None,
            })
            .collect();
        EncodedVector::new(values)
    }
}

/// Align `observed` (column, value) pairs to `expected`.
///
/// If a column is observed more than once, the last value wins.
pub fn reconcile(observed: &[(String, f64)], expected: &[String]) -> Reconciliation {
    let observed_values: HashMap<&str, f64> = observed
        .iter()
        .map(|(column, value)| (column.as_str(), *value))
        .collect();

    let mut outcomes: Vec<ColumnOutcome> = expected
        .iter()
        .map(|column| match observed_values.get(column.as_str()) {
            Some(&value) => ColumnOutcome::Matched {
                column: column.clone(),
                value,
            },
            None => ColumnOutcome::Filled {
                column: column.clone(),
            },
        })
        .collect();

    let expected_set: std::collections::HashSet<&str> =
        expected.iter().map(String::as_str).collect();
    for (column, value) in observed {
        if !expected_set.contains(column.as_str()) {
            outcomes.push(ColumnOutcome::Dropped {
                column: column.clone(),
                value: *value,
            });
        }
    }

    Reconciliation { outcomes }
}
