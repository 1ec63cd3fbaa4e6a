//! Filtering and aggregation over the localities table.
//!
//! Every operation here is pure and total: an empty result is a valid
//! answer, and values absent from the dataset simply match nothing.

use crate::data::Locality;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Resolved form of one selection dimension
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Choice {
    /// No restriction on this dimension
    #[default]
    All,
    /// Only these values match
    Only(BTreeSet<String>),
}

impl Choice {
    /// Resolve a user selection. An empty selection means "all".
    pub fn from_selection<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if set.is_empty() {
            Choice::All
        } else {
            Choice::Only(set)
        }
    }

    #[inline]
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(set) => set.contains(value),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Choice::All)
    }
}

/// Number of localities for one (region, state) combination
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateCount {
    pub region: String,
    pub region_code: String,
    pub state_name: String,
    pub state: String,
    pub count: u64,
}

/// Localities whose region and state both match, in dataset order
pub fn filter_localities(data: &[Locality], regions: &Choice, states: &Choice) -> Vec<Locality> {
    data.iter()
        .filter(|l| regions.matches(&l.region) && states.matches(&l.state))
        .cloned()
        .collect()
}

/// Count localities per (region, region code, state, state code).
///
/// Rows come out ordered by state name, state code, region, region code.
pub fn aggregate(data: &[Locality]) -> Vec<AggregateCount> {
    let mut groups: BTreeMap<(&str, &str, &str, &str), u64> = BTreeMap::new();
    for l in data {
        let key = (
            l.state_name.as_str(),
            l.state.as_str(),
            l.region.as_str(),
            l.region_code.as_str(),
        );
        *groups.entry(key).or_insert(0) += 1;
    }

    groups
        .into_iter()
        .map(|((state_name, state, region, region_code), count)| AggregateCount {
            region: region.to_string(),
            region_code: region_code.to_string(),
            state_name: state_name.to_string(),
            state: state.to_string(),
            count,
        })
        .collect()
}

/// Aggregate rows whose region and state both match.
/// Whole rows are kept or dropped so labels and counts stay paired.
pub fn filter_aggregate(
    counts: &[AggregateCount],
    regions: &Choice,
    states: &Choice,
) -> Vec<AggregateCount> {
    counts
        .iter()
        .filter(|c| regions.matches(&c.region) && states.matches(&c.state))
        .cloned()
        .collect()
}
