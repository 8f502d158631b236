//! Dashboard view-state machine: advertiser search, results, and the
//! per-page ads drill-down.
//!
//! Action methods transition synchronously and hand back the backend
//! command to dispatch, if any. Completion events are applied only when
//! their request id still matches the in-flight request AND the state is
//! the corresponding loading variant; everything else is discarded.

use shared::{
    domain::{AdCreative, AdStats, Advertiser, CountryCode},
    error::ApiError,
};

use crate::backend_bridge::commands::{BackendCommand, RequestId};

/// Search input as captured at dispatch time. The live form may keep
/// changing afterwards; retry and the results stash reuse this snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub country: CountryCode,
}

/// Exactly one variant is active at any time. Every transition replaces
/// the value wholesale.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Idle,
    Searching {
        query: SearchQuery,
    },
    SearchError {
        query: SearchQuery,
        message: String,
    },
    SearchResults {
        query: SearchQuery,
        advertisers: Vec<Advertiser>,
    },
    LoadingAds {
        advertiser: Advertiser,
        country: CountryCode,
    },
    AdsError {
        advertiser: Advertiser,
        country: CountryCode,
        message: String,
    },
    AdsView {
        advertiser: Advertiser,
        country: CountryCode,
        creatives: Vec<AdCreative>,
        stats: AdStats,
    },
}

struct ResultsSnapshot {
    query: SearchQuery,
    advertisers: Vec<Advertiser>,
}

pub struct DashboardController {
    state: ViewState,
    /// Live user input; country edits here take effect on the next
    /// submit/select, never retroactively.
    pub form: SearchQuery,
    /// Results screen kept aside while drilled into a page, so Back
    /// restores it without a refetch.
    results_stash: Option<ResultsSnapshot>,
    next_request_id: u64,
    inflight: Option<RequestId>,
}

impl DashboardController {
    pub fn new(country: CountryCode) -> Self {
        Self {
            state: ViewState::Idle,
            form: SearchQuery {
                text: String::new(),
                country,
            },
            results_stash: None,
            next_request_id: 0,
            inflight: None,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    fn begin_request(&mut self) -> RequestId {
        self.next_request_id += 1;
        let id = RequestId(self.next_request_id);
        self.inflight = Some(id);
        id
    }

    /// Starts a search for the current form text. No-op when the trimmed
    /// text is empty or a drill-down/search is already underway.
    pub fn submit_search(&mut self) -> Option<BackendCommand> {
        if !matches!(
            self.state,
            ViewState::Idle | ViewState::SearchError { .. } | ViewState::SearchResults { .. }
        ) {
            return None;
        }
        if self.form.text.trim().is_empty() {
            return None;
        }
        let query = self.form.clone();
        Some(self.dispatch_search(query))
    }

    fn dispatch_search(&mut self, query: SearchQuery) -> BackendCommand {
        let request_id = self.begin_request();
        let command = BackendCommand::SearchAdvertisers {
            request_id,
            query: query.text.clone(),
            country: query.country,
        };
        self.state = ViewState::Searching { query };
        command
    }

    /// Drills into one advertiser's ads, using the live form country.
    /// Selecting while already drilled in supersedes the previous page;
    /// the stashed results from the first drill-in keep serving Back.
    pub fn select_page(&mut self, advertiser: Advertiser) -> Option<BackendCommand> {
        if matches!(
            self.state,
            ViewState::Idle | ViewState::Searching { .. } | ViewState::SearchError { .. }
        ) {
            return None;
        }
        if let ViewState::SearchResults { query, advertisers } =
            std::mem::replace(&mut self.state, ViewState::Idle)
        {
            self.results_stash = Some(ResultsSnapshot { query, advertisers });
        }
        Some(self.dispatch_ads_fetch(advertiser, self.form.country))
    }

    fn dispatch_ads_fetch(
        &mut self,
        advertiser: Advertiser,
        country: CountryCode,
    ) -> BackendCommand {
        let request_id = self.begin_request();
        let command = BackendCommand::FetchPageAds {
            request_id,
            page_id: advertiser.id.clone(),
            country,
        };
        self.state = ViewState::LoadingAds {
            advertiser,
            country,
        };
        command
    }

    /// Leaves the drill-down and restores the stashed results snapshot.
    /// Interest in any pending ads fetch ends here.
    pub fn go_back(&mut self) {
        if !matches!(
            self.state,
            ViewState::LoadingAds { .. } | ViewState::AdsError { .. } | ViewState::AdsView { .. }
        ) {
            return;
        }
        self.inflight = None;
        self.state = match self.results_stash.take() {
            Some(ResultsSnapshot { query, advertisers }) => {
                ViewState::SearchResults { query, advertisers }
            }
            None => ViewState::Idle,
        };
    }

    /// Re-issues the failed lookup with the captured query or page,
    /// regardless of what the form holds now.
    pub fn retry(&mut self) -> Option<BackendCommand> {
        match std::mem::replace(&mut self.state, ViewState::Idle) {
            ViewState::SearchError { query, .. } => Some(self.dispatch_search(query)),
            ViewState::AdsError {
                advertiser,
                country,
                ..
            } => Some(self.dispatch_ads_fetch(advertiser, country)),
            other => {
                self.state = other;
                None
            }
        }
    }

    pub fn handle_search_finished(
        &mut self,
        request_id: RequestId,
        result: Result<Vec<Advertiser>, ApiError>,
    ) {
        if self.inflight != Some(request_id) {
            tracing::debug!(request_id = request_id.0, "dropping superseded search response");
            return;
        }
        let query = match std::mem::replace(&mut self.state, ViewState::Idle) {
            ViewState::Searching { query } => query,
            other => {
                self.state = other;
                tracing::debug!(request_id = request_id.0, "dropping search response with no pending search");
                return;
            }
        };
        self.inflight = None;
        self.state = match result {
            Ok(advertisers) => ViewState::SearchResults { query, advertisers },
            Err(err) => ViewState::SearchError {
                query,
                message: err.message().to_string(),
            },
        };
    }

    pub fn handle_ads_finished(
        &mut self,
        request_id: RequestId,
        result: Result<Vec<AdCreative>, ApiError>,
    ) {
        if self.inflight != Some(request_id) {
            tracing::debug!(request_id = request_id.0, "dropping superseded ads response");
            return;
        }
        let (advertiser, country) = match std::mem::replace(&mut self.state, ViewState::Idle) {
            ViewState::LoadingAds {
                advertiser,
                country,
            } => (advertiser, country),
            other => {
                self.state = other;
                tracing::debug!(request_id = request_id.0, "dropping ads response with no pending fetch");
                return;
            }
        };
        self.inflight = None;
        self.state = match result {
            Ok(creatives) => {
                let stats = AdStats::from_creatives(&creatives);
                ViewState::AdsView {
                    advertiser,
                    country,
                    creatives,
                    stats,
                }
            }
            Err(err) => ViewState::AdsError {
                advertiser,
                country,
                message: err.message().to_string(),
            },
        };
    }
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
