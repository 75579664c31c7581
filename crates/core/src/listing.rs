//! Paging and filtering vocabulary shared by every list view.
//!
//! Server-side filters are forwarded as query parameters; filters a resource
//! does not understand are applied client-side to the fetched page only.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::Resource;

pub const SEARCH_FILTER: &str = "search";

/// Fields a client-side filter can inspect on a fetched record.
pub trait Searchable {
    /// Values covered by free-text search.
    fn search_text(&self) -> Vec<String>;

    /// Value compared by equality filters, keyed by backend field name.
    fn field(&self, name: &str) -> Option<String>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: u32,
    pub total_count: u64,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self { items: Vec::new(), total_pages: 0, total_count: 0 }
    }

    /// Narrows the fetched items; totals keep describing the server collection.
    pub fn filtered(self, filter: &ClientFilter) -> Self
    where
        T: Searchable,
    {
        if filter.is_empty() {
            return self;
        }
        let items = self.items.into_iter().filter(|item| filter.matches(item)).collect();
        Self { items, total_pages: self.total_pages, total_count: self.total_count }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientFilter {
    pub search: Option<String>,
    pub equals: BTreeMap<String, String>,
}

impl ClientFilter {
    pub fn is_empty(&self) -> bool {
        self.search.as_deref().map(|term| term.trim().is_empty()).unwrap_or(true)
            && self.equals.is_empty()
    }

    pub fn matches<T: Searchable>(&self, item: &T) -> bool {
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|term| !term.is_empty())
        {
            let needle = term.to_lowercase();
            let hit = item.search_text().iter().any(|value| value.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        self.equals.iter().all(|(field, expected)| {
            item.field(field).map(|actual| actual.trim() == expected.trim()).unwrap_or(false)
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub filters: BTreeMap<String, String>,
}

impl ListQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit, filters: BTreeMap::new() }
    }

    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    /// Separates the filters `resource` handles server-side from the rest.
    pub fn split(&self, resource: Resource) -> (BTreeMap<String, String>, ClientFilter) {
        let mut server = BTreeMap::new();
        let mut client = ClientFilter::default();

        for (field, value) in &self.filters {
            if value.trim().is_empty() {
                continue;
            }
            if resource.supports_server_filter(field) {
                server.insert(field.clone(), value.clone());
            } else if field == SEARCH_FILTER {
                client.search = Some(value.clone());
            } else {
                client.equals.insert(field.clone(), value.clone());
            }
        }

        (server, client)
    }
}

/// Clamps a requested page into `[1, total_pages]`; an empty collection still has page 1.
pub fn clamp_page(requested: i64, total_pages: u32) -> u32 {
    let last = i64::from(total_pages.max(1));
    requested.clamp(1, last) as u32
}
