// src/hierarchy/ordering.rs
// =============================================================================
// Weight bookkeeping shared by the page order check (inside a chapter) and the
// chapter order check (inside a course).
//
// Items are dropped into buckets by integer weight. From the buckets we can
// tell which weights are taken twice and which ones are missing below the
// largest weight seen.
//
//   weights {10, 20, 20, 40}
//     duplicates: 20
//     missing (multiples of 10): [30]
// =============================================================================

use std::collections::BTreeMap;

/// At most this many missing weights are listed for one chapter or course
pub const MAX_MISSING_REPORTED: usize = 100;

/// Names grouped by weight.
#[derive(Debug, Clone, Default)]
pub struct WeightBuckets {
    buckets: BTreeMap<i64, Vec<String>>,
    largest: i64,
}

impl WeightBuckets {
    pub fn insert(&mut self, weight: i64, name: impl Into<String>) {
        self.buckets.entry(weight).or_default().push(name.into());
        self.largest = self.largest.max(weight);
    }

    /// Largest weight seen, 0 when nothing positive was inserted
    pub fn largest(&self) -> i64 {
        self.largest
    }

    /// Weights in `1..=largest` that hold more than one name, in ascending order
    pub fn duplicates(&self) -> Vec<(i64, &[String])> {
        self.buckets
            .iter()
            .filter(|(weight, names)| **weight >= 1 && names.len() > 1)
            .map(|(weight, names)| (*weight, names.as_slice()))
            .collect()
    }

    /// Multiples of `step` in `1..=largest` that nobody uses, lowest first.
    ///
    /// Stops after [`MAX_MISSING_REPORTED`] so a stray huge weight cannot
    /// stall the check.
    pub fn missing(&self, step: i64) -> Vec<i64> {
        if step < 1 {
            return Vec::new();
        }

        (1..)
            .map_while(|n: i64| n.checked_mul(step))
            .take_while(|weight| *weight <= self.largest)
            .filter(|weight| !self.buckets.contains_key(weight))
            .take(MAX_MISSING_REPORTED)
            .collect()
    }
}

impl<S: Into<String>> FromIterator<(i64, S)> for WeightBuckets {
    fn from_iter<I: IntoIterator<Item = (i64, S)>>(iter: I) -> Self {
        let mut buckets = WeightBuckets::default();
        for (weight, name) in iter {
            buckets.insert(weight, name);
        }
        buckets
    }
}

/// Renders a weight list the way the reports show it: `[30 50]`.
pub fn format_weights(weights: &[i64]) -> String {
    let parts: Vec<String> = weights.iter().map(i64::to_string).collect();
    format!("[{}]", parts.join(" "))
}
