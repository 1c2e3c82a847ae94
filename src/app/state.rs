//! View state of the explorer.
//!
//! Every aggregation submission and every drill-down takes a fresh generation
//! token. A response is applied only while its token is still current, so a
//! late answer to a superseded request can never overwrite newer results.

use tracing::debug;

use crate::api::{AggregationGroup, Event, GroupBy};
use crate::TARGET_APP_STATE;

/// Result tab selected in the group table.
pub type ResultTab = GroupBy;

/// Token identifying one fetch round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

#[derive(Debug, Clone)]
pub struct AppState {
    pub tab: ResultTab,
    pub modal_open: bool,
    pub countries: Vec<AggregationGroup>,
    pub regions: Vec<AggregationGroup>,
    pub cities: Vec<AggregationGroup>,
    pub events: Vec<Event>,
    /// Group whose events are shown in the detail view.
    pub selected_group: Option<i64>,
    pub loading: bool,
    pub loading_events: bool,
    pub aggregation_error: Option<String>,
    pub events_error: Option<String>,
    aggregation_generation: Generation,
    pending_groups: usize,
    events_generation: Generation,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            tab: GroupBy::Country,
            modal_open: false,
            countries: Vec::new(),
            regions: Vec::new(),
            cities: Vec::new(),
            events: Vec::new(),
            selected_group: None,
            loading: false,
            loading_events: false,
            aggregation_error: None,
            events_error: None,
            aggregation_generation: Generation(0),
            pending_groups: 0,
            events_generation: Generation(0),
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Result set backing the currently selected tab.
    pub fn visible_groups(&self) -> &[AggregationGroup] {
        self.groups(self.tab)
    }

    pub fn groups(&self, group_by: GroupBy) -> &[AggregationGroup] {
        match group_by {
            GroupBy::Country => &self.countries,
            GroupBy::Region => &self.regions,
            GroupBy::City => &self.cities,
        }
    }

    fn groups_mut(&mut self, group_by: GroupBy) -> &mut Vec<AggregationGroup> {
        match group_by {
            GroupBy::Country => &mut self.countries,
            GroupBy::Region => &mut self.regions,
            GroupBy::City => &mut self.cities,
        }
    }

    pub fn find_group(&self, group_id: i64) -> Option<&AggregationGroup> {
        self.visible_groups()
            .iter()
            .find(|group| group.group_id == group_id)
    }

    /// Starts an aggregation round of three group fetches.
    pub fn begin_aggregation(&mut self) -> Generation {
        self.aggregation_generation = Generation(self.aggregation_generation.0 + 1);
        self.pending_groups = GroupBy::ALL.len();
        self.loading = true;
        self.aggregation_error = None;
        debug!(target: TARGET_APP_STATE, "Aggregation round {:?} started", self.aggregation_generation);
        self.aggregation_generation
    }

    /// Stores one group result set. Returns `false` if the round is stale.
    pub fn apply_groups(
        &mut self,
        generation: Generation,
        group_by: GroupBy,
        result: Result<Vec<AggregationGroup>, String>,
    ) -> bool {
        if generation != self.aggregation_generation {
            debug!(target: TARGET_APP_STATE, "Dropping stale {} groups from {:?}", group_by, generation);
            return false;
        }
        match result {
            Ok(groups) => {
                debug!(target: TARGET_APP_STATE, "Stored {} {} groups", groups.len(), group_by);
                *self.groups_mut(group_by) = groups;
            }
            Err(message) => {
                let message = format!("{} groups: {}", group_by, message);
                self.aggregation_error = Some(match self.aggregation_error.take() {
                    Some(existing) => format!("{}; {}", existing, message),
                    None => message,
                });
            }
        }
        self.pending_groups = self.pending_groups.saturating_sub(1);
        true
    }

    /// Clears the loading flag once every fetch of the current round settled.
    pub fn finish_aggregation(&mut self, generation: Generation) {
        if generation == self.aggregation_generation && self.pending_groups == 0 {
            self.loading = false;
            debug!(target: TARGET_APP_STATE, "Aggregation round {:?} finished", generation);
        }
    }

    /// Switches the visible result set. Never triggers a fetch.
    pub fn select_tab(&mut self, tab: ResultTab) {
        self.tab = tab;
    }

    /// Opens the detail view for `group_id` and starts a drill-down round.
    pub fn open_group(&mut self, group_id: i64) -> Generation {
        self.events_generation = Generation(self.events_generation.0 + 1);
        self.modal_open = true;
        self.selected_group = Some(group_id);
        self.loading_events = true;
        self.events_error = None;
        debug!(target: TARGET_APP_STATE, "Opened group {} as {:?}", group_id, self.events_generation);
        self.events_generation
    }

    /// Stores drill-down events. Returns `false` if the round is stale.
    pub fn apply_events(&mut self, generation: Generation, result: Result<Vec<Event>, String>) -> bool {
        if generation != self.events_generation {
            debug!(target: TARGET_APP_STATE, "Dropping stale events from {:?}", generation);
            return false;
        }
        match result {
            Ok(events) => self.events = events,
            Err(message) => self.events_error = Some(message),
        }
        self.loading_events = false;
        true
    }

    pub fn close_modal(&mut self) {
        self.modal_open = false;
    }
}
