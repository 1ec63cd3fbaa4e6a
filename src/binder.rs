use crate::data::{Dataset, Locality};
use crate::filter::{aggregate, filter_aggregate, filter_localities, AggregateCount, Choice};
use crate::options::{available_states, RegionStateIndex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// The dataset plus everything derived from it once at startup
#[derive(Debug)]
pub struct Catalog {
    pub dataset: Dataset,
    pub index: RegionStateIndex,
    pub counts: Vec<AggregateCount>,
}

impl Catalog {
    pub fn new(dataset: Dataset) -> Self {
        let index = RegionStateIndex::build(dataset.localities());
        let counts = aggregate(dataset.localities());
        tracing::debug!(
            localities = dataset.len(),
            groups = counts.len(),
            "built catalog"
        );
        Self {
            dataset,
            index,
            counts,
        }
    }
}

/// What happens to selected states that leave the option list after a
/// region change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaleStatePolicy {
    /// Drop them from the selection
    #[default]
    Prune,
    /// Leave them selected; the region filter already excludes their rows
    Keep,
}

/// Current user selection. Empty sets mean "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub regions: BTreeSet<String>,
    pub states: BTreeSet<String>,
}

/// Everything the UI redraws after a selection event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedViews {
    pub state_options: Vec<String>,
    pub localities: Vec<Locality>,
    pub counts: Vec<AggregateCount>,
}

/// Turns selection events into derived views
pub struct ViewBinder {
    catalog: Arc<Catalog>,
    selection: Selection,
    policy: StaleStatePolicy,
}

impl ViewBinder {
    pub fn new(catalog: Arc<Catalog>, policy: StaleStatePolicy) -> Self {
        Self {
            catalog,
            selection: Selection::default(),
            policy,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// State options for the current region selection
    pub fn state_options(&self) -> Vec<String> {
        available_states(&self.catalog.index, &self.region_choice())
    }

    /// Region selection changed: recompute state options, settle stale
    /// state selections, and recompute the views.
    pub fn region_selection_changed<I, S>(&mut self, regions: I) -> DerivedViews
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection.regions = regions.into_iter().map(Into::into).collect();

        if self.policy == StaleStatePolicy::Prune && !self.selection.states.is_empty() {
            let options: BTreeSet<String> = self.state_options().into_iter().collect();
            let before = self.selection.states.len();
            self.selection.states.retain(|s| options.contains(s));
            let pruned = before - self.selection.states.len();
            if pruned > 0 {
                tracing::debug!(pruned, "dropped states outside the selected regions");
            }
        }

        self.views()
    }

    /// State selection changed: recompute the views
    pub fn state_selection_changed<I, S>(&mut self, states: I) -> DerivedViews
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection.states = states.into_iter().map(Into::into).collect();
        self.views()
    }

    /// Derived views for the current selection
    pub fn views(&self) -> DerivedViews {
        let regions = self.region_choice();
        let states = Choice::from_selection(self.selection.states.iter().cloned());
        let catalog = &self.catalog;

        let views = DerivedViews {
            state_options: available_states(&catalog.index, &regions),
            localities: filter_localities(catalog.dataset.localities(), &regions, &states),
            counts: filter_aggregate(&catalog.counts, &regions, &states),
        };
        tracing::debug!(
            regions = self.selection.regions.len(),
            states = self.selection.states.len(),
            localities = views.localities.len(),
            bars = views.counts.len(),
            "recomputed views"
        );
        views
    }

    fn region_choice(&self) -> Choice {
        Choice::from_selection(self.selection.regions.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::{locality, sample};

    fn binder(policy: StaleStatePolicy) -> ViewBinder {
        let catalog = Arc::new(Catalog::new(Dataset::new(sample())));
        ViewBinder::new(catalog, policy)
    }

    #[test]
    fn test_initial_views_show_everything() {
        let b = binder(StaleStatePolicy::Prune);
        let views = b.views();
        assert_eq!(views.localities, sample());
        assert_eq!(views.counts.len(), 3);
        assert_eq!(views.state_options, ["AM", "PA", "RS"]);
    }

    #[test]
    fn test_region_change_narrows_options_and_rows() {
        let mut b = binder(StaleStatePolicy::Prune);
        let views = b.region_selection_changed(["Norte"]);
        assert_eq!(views.state_options, ["AM", "PA"]);
        assert_eq!(views.localities, sample()[..2].to_vec());
        assert_eq!(views.counts.len(), 2);
    }

    #[test]
    fn test_clearing_regions_restores_all() {
        let mut b = binder(StaleStatePolicy::Prune);
        b.region_selection_changed(["Sul"]);
        let views = b.region_selection_changed(Vec::<String>::new());
        assert_eq!(views.localities.len(), 3);
        assert_eq!(views.state_options.len(), 3);
    }

    #[test]
    fn test_state_change_filters_both_views() {
        let mut b = binder(StaleStatePolicy::Prune);
        b.region_selection_changed(["Norte"]);
        let views = b.state_selection_changed(["PA"]);
        assert_eq!(views.localities.len(), 1);
        assert_eq!(views.localities[0].state, "PA");
        assert_eq!(views.counts.len(), 1);
        assert_eq!(views.counts[0].state, "PA");
        assert_eq!(views.state_options, ["AM", "PA"]);
    }

    #[test]
    fn test_state_outside_region_yields_empty_views() {
        let mut b = binder(StaleStatePolicy::Keep);
        b.region_selection_changed(["Sul"]);
        let views = b.state_selection_changed(["AM"]);
        assert!(views.localities.is_empty());
        assert!(views.counts.is_empty());
    }

    #[test]
    fn test_prune_drops_stale_states() {
        let mut b = binder(StaleStatePolicy::Prune);
        b.state_selection_changed(["AM", "RS"]);
        let views = b.region_selection_changed(["Sul"]);
        assert_eq!(b.selection().states.iter().collect::<Vec<_>>(), ["RS"]);
        assert_eq!(views.localities.len(), 1);
    }

    #[test]
    fn test_prune_to_nothing_falls_back_to_all_states() {
        let mut b = binder(StaleStatePolicy::Prune);
        b.state_selection_changed(["AM"]);
        let views = b.region_selection_changed(["Sul"]);
        assert!(b.selection().states.is_empty());
        assert_eq!(views.localities.len(), 1);
        assert_eq!(views.localities[0].state, "RS");
    }

    #[test]
    fn test_keep_leaves_stale_states_inert() {
        let mut b = binder(StaleStatePolicy::Keep);
        b.state_selection_changed(["AM", "RS"]);
        let views = b.region_selection_changed(["Sul"]);
        assert_eq!(b.selection().states.len(), 2);
        assert_eq!(views.localities.len(), 1);
        assert_eq!(views.localities[0].state, "RS");
    }

    #[test]
    fn test_reapplying_selection_is_idempotent() {
        let mut b = binder(StaleStatePolicy::Prune);
        let first = b.region_selection_changed(["Norte"]);
        let again = b.region_selection_changed(["Norte"]);
        assert_eq!(first, again);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&again).unwrap()
        );
    }

    #[test]
    fn test_counts_follow_filtered_rows() {
        let data = vec![
            locality("1", "Norte", "AM"),
            locality("2", "Norte", "AM"),
            locality("3", "Norte", "PA"),
            locality("4", "Sul", "RS"),
        ];
        let catalog = Arc::new(Catalog::new(Dataset::new(data)));
        let mut b = ViewBinder::new(catalog, StaleStatePolicy::Prune);
        let views = b.region_selection_changed(["Norte"]);
        let total: u64 = views.counts.iter().map(|c| c.count).sum();
        assert_eq!(total, views.localities.len() as u64);
    }
}
