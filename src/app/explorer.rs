//! Fetch orchestration between the filter form, the news API and `AppState`.

use anyhow::{anyhow, Result};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::state::{AppState, Generation, ResultTab};
use crate::api::{Actor, AggregationGroup, EventType, GroupBy, NewsApi};
use crate::config::DateWindow;
use crate::query::{encode_query, FilterForm, QueryParams};
use crate::MAX_DRILLDOWN_IDS;

pub struct Explorer<A: NewsApi> {
    api: A,
    state: Arc<RwLock<AppState>>,
    actors: Vec<Actor>,
    types: Vec<EventType>,
}

impl<A: NewsApi> Explorer<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(AppState::new())),
            actors: Vec::new(),
            types: Vec::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn snapshot(&self) -> AppState {
        self.state.read().await.clone()
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn types(&self) -> &[EventType] {
        &self.types
    }

    /// Loads the actor and type option catalogs.
    pub async fn load_catalogs(
        &mut self,
        actors_window: &DateWindow,
        types_window: &DateWindow,
    ) -> Result<()> {
        let (actors, types) = tokio::try_join!(
            self.api.actors(actors_window),
            self.api.types(types_window)
        )?;
        info!("Loaded {} actor and {} type options", actors.len(), types.len());
        self.actors = actors;
        self.types = types;
        Ok(())
    }

    /// Submits the form: fetches country, region and city groups concurrently.
    /// Each result set is stored as soon as its request completes.
    pub async fn submit(&self, form: &FilterForm) -> QueryParams {
        let params = form.to_query_params();
        info!("Submitting filters: {}", encode_query(&params));

        let generation = self.state.write().await.begin_aggregation();
        tokio::join!(
            self.fetch_groups(generation, GroupBy::Region, &params),
            self.fetch_groups(generation, GroupBy::City, &params),
            self.fetch_groups(generation, GroupBy::Country, &params),
        );
        self.state.write().await.finish_aggregation(generation);

        params
    }

    async fn fetch_groups(&self, generation: Generation, group_by: GroupBy, params: &QueryParams) {
        let result = self
            .api
            .groups(group_by, params)
            .await
            .map_err(|e| e.to_string());
        if let Err(ref err) = result {
            warn!("Failed to load {} groups: {}", group_by, err);
        }
        self.state
            .write()
            .await
            .apply_groups(generation, group_by, result);
    }

    /// Switches the result tab without touching the network.
    pub async fn select_tab(&self, tab: ResultTab) {
        self.state.write().await.select_tab(tab);
    }

    /// Activates the row with `group_id` in the visible tab.
    pub async fn open_group_id(&self, group_id: i64) -> Result<()> {
        let group = {
            let state = self.state.read().await;
            state.find_group(group_id).cloned().ok_or_else(|| {
                anyhow!("No group with id {} in the {} results", group_id, state.tab)
            })?
        };
        self.open_group(&group).await;
        Ok(())
    }

    /// Opens the detail view for `group` and loads its first
    /// `MAX_DRILLDOWN_IDS` events.
    pub async fn open_group(&self, group: &AggregationGroup) {
        let ids = group.event_ids(MAX_DRILLDOWN_IDS);
        let generation = self.state.write().await.open_group(group.group_id);
        info!(
            "Loading {} of {} events for group {}",
            ids.len(),
            group.events.len(),
            group.group_id
        );

        let result = self.api.events(&ids).await.map_err(|e| e.to_string());
        if let Err(ref err) = result {
            warn!("Failed to load events for group {}: {}", group.group_id, err);
        }
        self.state.write().await.apply_events(generation, result);
    }

    pub async fn close_detail(&self) {
        self.state.write().await.close_modal();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::{ApiError, Event, EventRef};
    use crate::query::ScoreRange;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex;
    use tokio::sync::watch;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Actors,
        Types,
        Groups(GroupBy, String),
        Events(Vec<String>),
        Event(String),
    }

    /// In-memory API that records every call.
    #[derive(Default)]
    pub struct MockApi {
        pub calls: Mutex<Vec<Call>>,
        pub countries: Vec<AggregationGroup>,
        pub regions: Vec<AggregationGroup>,
        pub cities: Vec<AggregationGroup>,
        pub fail_cities: bool,
    }

    impl MockApi {
        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NewsApi for MockApi {
        async fn actors(&self, _window: &DateWindow) -> crate::api::Result<Vec<Actor>> {
            self.calls.lock().unwrap().push(Call::Actors);
            Ok(vec![Actor {
                name: "POLICE".to_string(),
                category: Some("COP".to_string()),
                count: 4,
                location: None,
            }])
        }

        async fn types(&self, _window: &DateWindow) -> crate::api::Result<Vec<EventType>> {
            self.calls.lock().unwrap().push(Call::Types);
            Ok(vec![])
        }

        async fn groups(
            &self,
            group_by: GroupBy,
            params: &QueryParams,
        ) -> crate::api::Result<Vec<AggregationGroup>> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Groups(group_by, encode_query(params)));
            match group_by {
                GroupBy::Country => Ok(self.countries.clone()),
                GroupBy::Region => Ok(self.regions.clone()),
                GroupBy::City if self.fail_cities => Err(ApiError::Api {
                    status: 502,
                    message: "bad gateway".to_string(),
                }),
                GroupBy::City => Ok(self.cities.clone()),
            }
        }

        async fn events(&self, ids: &[String]) -> crate::api::Result<Vec<Event>> {
            self.calls.lock().unwrap().push(Call::Events(ids.to_vec()));
            Ok(ids.iter().map(|id| event(id)).collect())
        }

        async fn event(&self, id: &str) -> crate::api::Result<Option<Event>> {
            self.calls.lock().unwrap().push(Call::Event(id.to_string()));
            Ok(Some(event(id)))
        }
    }

    pub fn event(id: &str) -> Event {
        serde_json::from_value(serde_json::json!({
            "GLOBALEVENTID": id,
            "Location_Name": "Berlin, Germany",
            "Title": format!("Event {}", id),
            "Source": format!("https://example.org/{}", id),
            "GoldsteinScale": 1.5,
            "AvgTone": -2.25,
            "Date": "2024-01-02"
        }))
        .unwrap()
    }

    pub fn group(id: i64, event_count: usize) -> AggregationGroup {
        AggregationGroup {
            group_id: id,
            count: event_count as u64,
            city: format!("City {}", id),
            region: format!("Region {}", id),
            country: format!("Country {}", id),
            country_code: "XX".to_string(),
            location: None,
            events: (1..=event_count)
                .map(|i| EventRef { id: i.to_string() })
                .collect(),
        }
    }

    /// Holds back group requests filtered by tone until the gate opens.
    struct GatedApi {
        gate: watch::Receiver<bool>,
    }

    #[async_trait]
    impl NewsApi for GatedApi {
        async fn actors(&self, _window: &DateWindow) -> crate::api::Result<Vec<Actor>> {
            Ok(vec![])
        }

        async fn types(&self, _window: &DateWindow) -> crate::api::Result<Vec<EventType>> {
            Ok(vec![])
        }

        async fn groups(
            &self,
            _group_by: GroupBy,
            params: &QueryParams,
        ) -> crate::api::Result<Vec<AggregationGroup>> {
            if params.tone_max == Some(5.0) {
                let mut gate = self.gate.clone();
                let _ = gate.wait_for(|open| *open).await;
                Ok(vec![group(1, 1)])
            } else {
                Ok(vec![group(2, 1)])
            }
        }

        async fn events(&self, _ids: &[String]) -> crate::api::Result<Vec<Event>> {
            Ok(vec![])
        }

        async fn event(&self, _id: &str) -> crate::api::Result<Option<Event>> {
            Ok(None)
        }
    }

    fn populated_api() -> MockApi {
        MockApi {
            countries: vec![group(42, 2)],
            regions: vec![group(7, 1), group(8, 3)],
            cities: vec![group(1000, 250)],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_submit_fetches_all_three_groupings() {
        let explorer = Explorer::new(populated_api());
        let form = FilterForm {
            tone: Some(ScoreRange::new(-5.0, 5.0)),
            start_time: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_time: NaiveDate::from_ymd_opt(2024, 1, 31),
            ..Default::default()
        };
        explorer.submit(&form).await;

        let calls = explorer.api().calls();
        assert_eq!(calls.len(), 3);
        for group_by in GroupBy::ALL {
            let query = calls
                .iter()
                .find_map(|call| match call {
                    Call::Groups(g, q) if *g == group_by => Some(q.clone()),
                    _ => None,
                })
                .unwrap();
            assert!(query.contains("ToneMax=5&ToneMin=-5&startTime=2024-01-01&endTime=2024-01-31"));
            assert!(query.contains("GoldsteinScaleLow=-10"));
        }

        let state = explorer.snapshot().await;
        assert!(!state.loading);
        assert_eq!(state.countries.len(), 1);
        assert_eq!(state.regions.len(), 2);
        assert_eq!(state.cities.len(), 1);
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_other_results() {
        let api = MockApi {
            fail_cities: true,
            ..populated_api()
        };
        let explorer = Explorer::new(api);
        explorer.submit(&FilterForm::default()).await;

        let state = explorer.snapshot().await;
        assert!(!state.loading);
        assert_eq!(state.countries.len(), 1);
        assert!(state.cities.is_empty());
        assert!(state.aggregation_error.unwrap().contains("bad gateway"));
    }

    #[tokio::test]
    async fn test_late_round_does_not_overwrite_newer_results() {
        let (open_gate, gate) = watch::channel(false);
        let explorer = Explorer::new(GatedApi { gate });
        let older = FilterForm {
            tone: Some(ScoreRange::new(-5.0, 5.0)),
            ..Default::default()
        };

        tokio::join!(explorer.submit(&older), async {
            explorer.submit(&FilterForm::default()).await;
            open_gate.send(true).unwrap();
        });

        let state = explorer.snapshot().await;
        assert!(!state.loading);
        assert!(state.aggregation_error.is_none());
        for group_by in GroupBy::ALL {
            let ids: Vec<i64> = state.groups(group_by).iter().map(|g| g.group_id).collect();
            assert_eq!(ids, vec![2], "{} groups", group_by);
        }
    }

    #[tokio::test]
    async fn test_tab_switch_issues_no_requests() {
        let explorer = Explorer::new(populated_api());
        explorer.submit(&FilterForm::default()).await;
        let before = explorer.snapshot().await;

        explorer.select_tab(GroupBy::Region).await;
        explorer.select_tab(GroupBy::City).await;

        assert_eq!(explorer.api().calls().len(), 3);
        let after = explorer.snapshot().await;
        assert_eq!(after.tab, GroupBy::City);
        assert_eq!(after.countries, before.countries);
        assert_eq!(after.regions, before.regions);
        assert_eq!(after.cities, before.cities);
    }

    #[tokio::test]
    async fn test_open_group_requests_its_event_ids() {
        let explorer = Explorer::new(populated_api());
        explorer.submit(&FilterForm::default()).await;
        explorer.open_group_id(42).await.unwrap();

        let calls = explorer.api().calls();
        assert_eq!(
            calls.last(),
            Some(&Call::Events(vec!["1".to_string(), "2".to_string()]))
        );
        let state = explorer.snapshot().await;
        assert!(state.modal_open);
        assert!(!state.loading_events);
        assert_eq!(state.events.len(), 2);
        assert_eq!(state.selected_group, Some(42));
    }

    #[tokio::test]
    async fn test_open_group_caps_ids_at_two_hundred() {
        let explorer = Explorer::new(populated_api());
        explorer.submit(&FilterForm::default()).await;
        explorer.select_tab(GroupBy::City).await;
        explorer.open_group_id(1000).await.unwrap();

        match explorer.api().calls().last() {
            Some(Call::Events(ids)) => {
                let expected: Vec<String> = (1..=200).map(|i| i.to_string()).collect();
                assert_eq!(ids, &expected);
            }
            other => panic!("unexpected call: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_open_group_sends_all_ids_below_cap() {
        let explorer = Explorer::new(populated_api());
        explorer.submit(&FilterForm::default()).await;
        explorer.select_tab(GroupBy::Region).await;
        explorer.open_group_id(8).await.unwrap();

        assert_eq!(
            explorer.api().calls().last(),
            Some(&Call::Events(vec![
                "1".to_string(),
                "2".to_string(),
                "3".to_string()
            ]))
        );
    }

    #[tokio::test]
    async fn test_unknown_group_is_an_error() {
        let explorer = Explorer::new(populated_api());
        explorer.submit(&FilterForm::default()).await;
        assert!(explorer.open_group_id(7).await.is_err());
        assert!(!explorer.snapshot().await.modal_open);
    }

    #[tokio::test]
    async fn test_load_catalogs() {
        let mut explorer = Explorer::new(MockApi::default());
        let window = DateWindow::parse("2024-04-08,2024-04-08").unwrap();
        explorer.load_catalogs(&window, &window).await.unwrap();
        assert_eq!(explorer.actors().len(), 1);
        assert!(explorer.types().is_empty());
        let calls = explorer.api().calls();
        assert!(calls.contains(&Call::Actors));
        assert!(calls.contains(&Call::Types));
    }
}
