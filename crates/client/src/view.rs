//! State of one list view: the current page, filters and last good data.
//!
//! Every trigger issues a fetch tagged with a fresh sequence number; only the
//! most recently issued fetch may update the view, whatever order the
//! responses arrive in.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::{Mutex, MutexGuard};

use maintflow_core::{clamp_page, ClientFilter, Entity, ListQuery, Page, Resource};
use serde::Serialize;
use tracing::debug;

use crate::adapter::ListAdapter;
use crate::errors::FetchError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewPhase {
    Idle,
    Loading,
    Loaded,
    Errored,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewTrigger {
    Mount,
    PageChange(i64),
    FilterChange(BTreeMap<String, String>),
    /// Re-fetch after a mutation such as a workflow transition.
    Refresh,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    Stale,
}

/// A fetch issued by a view, to be handed back to [`ListView::complete`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingFetch {
    pub seq: u64,
    pub resource: Resource,
    pub page: u32,
    pub limit: u32,
    pub server_filters: BTreeMap<String, String>,
    pub client_filter: ClientFilter,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewSnapshot<T> {
    pub phase: ViewPhase,
    pub page: u32,
    pub limit: u32,
    pub filters: BTreeMap<String, String>,
    pub data: Option<Page<T>>,
    pub error: Option<FetchError>,
}

struct ViewState<T> {
    phase: ViewPhase,
    page: u32,
    filters: BTreeMap<String, String>,
    data: Option<Page<T>>,
    error: Option<FetchError>,
    latest_seq: u64,
}

pub struct ListView<T> {
    resource: Resource,
    limit: u32,
    state: Mutex<ViewState<T>>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> ListView<T>
where
    T: Entity + Clone,
{
    pub fn new(limit: u32) -> Self {
        Self {
            resource: T::RESOURCE,
            limit: limit.max(1),
            state: Mutex::new(ViewState {
                phase: ViewPhase::Idle,
                page: 1,
                filters: BTreeMap::new(),
                data: None,
                error: None,
                latest_seq: 0,
            }),
            _entity: PhantomData,
        }
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// Applies `trigger` to the view and issues the next fetch.
    pub fn begin(&self, trigger: ViewTrigger) -> PendingFetch {
        let mut state = self.lock();
        match trigger {
            ViewTrigger::Mount | ViewTrigger::Refresh => {}
            ViewTrigger::PageChange(requested) => {
                state.page = match &state.data {
                    Some(data) => clamp_page(requested, data.total_pages),
                    None => requested.clamp(1, i64::from(u32::MAX)) as u32,
                };
            }
            ViewTrigger::FilterChange(filters) => {
                state.filters = filters;
                state.page = 1;
            }
        }

        state.latest_seq += 1;
        state.phase = ViewPhase::Loading;

        let query =
            ListQuery { page: state.page, limit: self.limit, filters: state.filters.clone() };
        let (server_filters, client_filter) = query.split(self.resource);
        PendingFetch {
            seq: state.latest_seq,
            resource: self.resource,
            page: query.page,
            limit: query.limit,
            server_filters,
            client_filter,
        }
    }

    /// Applies a fetch result unless a newer fetch was issued meanwhile.
    pub fn complete(
        &self,
        pending: PendingFetch,
        result: Result<Page<T>, FetchError>,
    ) -> Resolution {
        let mut state = self.lock();
        if pending.seq != state.latest_seq {
            debug!(
                event_name = "list.view.stale_response_discarded",
                resource = self.resource.path(),
                seq = pending.seq,
                latest_seq = state.latest_seq,
                "discarding response of a superseded fetch"
            );
            return Resolution::Stale;
        }

        match result {
            Ok(page) => {
                state.data = Some(page.filtered(&pending.client_filter));
                state.error = None;
                state.phase = ViewPhase::Loaded;
            }
            Err(error) => {
                state.error = Some(error);
                state.phase = ViewPhase::Errored;
            }
        }
        Resolution::Applied
    }

    pub async fn load(&self, adapter: &ListAdapter, trigger: ViewTrigger) -> Resolution {
        let pending = self.begin(trigger);
        let result = adapter
            .fetch_page::<T>(pending.resource, pending.page, pending.limit, &pending.server_filters)
            .await;
        self.complete(pending, result)
    }

    pub fn snapshot(&self) -> ViewSnapshot<T> {
        let state = self.lock();
        ViewSnapshot {
            phase: state.phase,
            page: state.page,
            limit: self.limit,
            filters: state.filters.clone(),
            data: state.data.clone(),
            error: state.error.clone(),
        }
    }

    /// Clears a displayed error without touching the data.
    pub fn dismiss_error(&self) {
        let mut state = self.lock();
        state.error = None;
        if state.phase == ViewPhase::Errored {
            state.phase = if state.data.is_some() { ViewPhase::Loaded } else { ViewPhase::Idle };
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewState<T>> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
