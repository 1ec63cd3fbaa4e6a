use crate::data::Locality;
use crate::filter::Choice;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Region name → state codes present in that region.
///
/// Regions iterate in name order and states in code order. Each state is
/// listed under exactly one region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionStateIndex {
    regions: BTreeMap<String, BTreeSet<String>>,
    state_region: HashMap<String, String>,
}

impl RegionStateIndex {
    pub fn build(data: &[Locality]) -> Self {
        let mut index = Self::default();
        for l in data {
            index.regions.entry(l.region.clone()).or_default();
            match index.state_region.get(&l.state) {
                Some(region) if region != &l.region => {
                    tracing::warn!(
                        state = %l.state,
                        kept = %region,
                        ignored = %l.region,
                        "state appears under more than one region"
                    );
                }
                Some(_) => {}
                None => {
                    index.state_region.insert(l.state.clone(), l.region.clone());
                    if let Some(states) = index.regions.get_mut(&l.region) {
                        states.insert(l.state.clone());
                    }
                }
            }
        }
        index
    }

    /// All regions, in index order
    pub fn regions(&self) -> impl Iterator<Item = &str> + '_ {
        self.regions.keys().map(String::as_str)
    }

    /// States of a single region, in index order
    pub fn states_of(&self, region: &str) -> impl Iterator<Item = &str> + '_ {
        self.regions
            .get(region)
            .into_iter()
            .flat_map(|states| states.iter().map(String::as_str))
    }

    pub fn region_of(&self, state: &str) -> Option<&str> {
        self.state_region.get(state).map(String::as_str)
    }
}

/// States belonging to the selected regions, region by region.
/// `Choice::All` yields every state in the index.
pub fn available_states(index: &RegionStateIndex, selected_regions: &Choice) -> Vec<String> {
    index
        .regions()
        .filter(|region| selected_regions.matches(region))
        .flat_map(|region| index.states_of(region).map(String::from))
        .collect()
}
