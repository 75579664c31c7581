use std::collections::BTreeMap;
use std::sync::Arc;

use maintflow_core::{Page, Resource};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::backend::{ApiRequest, Backend};
use crate::errors::FetchError;

/// Page-based access to a backend collection.
///
/// Pages are forwarded verbatim: clamping to `[1, total_pages]` belongs to the
/// caller, and no client-side filtering happens here.
#[derive(Clone)]
pub struct ListAdapter {
    backend: Arc<dyn Backend>,
}

impl ListAdapter {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    pub async fn fetch_page<T>(
        &self,
        resource: Resource,
        page: u32,
        limit: u32,
        filters: &BTreeMap<String, String>,
    ) -> Result<Page<T>, FetchError>
    where
        T: DeserializeOwned,
    {
        let mut request = ApiRequest::get(resource.path())
            .with_query("page", page.to_string())
            .with_query("limit", limit.to_string());
        for (field, value) in filters {
            request = request.with_query(field.clone(), value.clone());
        }

        let response = self.backend.send(request).await.map_err(FetchError::from)?;
        if !response.is_success() {
            let error = FetchError::from_response(&response);
            warn!(
                event_name = "list.fetch.failed",
                resource = resource.path(),
                page,
                status = response.status,
                error_class = error.class(),
                "list fetch returned a non-success status"
            );
            return Err(error);
        }

        let envelope: Value = response
            .json()
            .map_err(|error| FetchError::Malformed(format!("invalid JSON body: {error}")))?;
        let page_data = parse_envelope(resource, envelope)?;
        debug!(
            event_name = "list.fetch.completed",
            resource = resource.path(),
            page,
            items = page_data.items.len(),
            total_pages = page_data.total_pages,
            "list page fetched"
        );
        Ok(page_data)
    }
}

fn parse_envelope<T: DeserializeOwned>(
    resource: Resource,
    envelope: Value,
) -> Result<Page<T>, FetchError> {
    let Value::Object(mut object) = envelope else {
        return Err(FetchError::Malformed("list envelope is not a JSON object".to_string()));
    };

    let results = object
        .remove("results")
        .ok_or_else(|| FetchError::Malformed("list envelope has no `results`".to_string()))?;
    let items: Vec<T> = serde_json::from_value(results)
        .map_err(|error| FetchError::Malformed(format!("invalid {} item: {error}", resource)))?;

    let total_pages = object
        .get("totalPages")
        .and_then(Value::as_u64)
        .ok_or_else(|| {
            FetchError::Malformed("list envelope has no numeric `totalPages`".to_string())
        })?;
    let total_pages = u32::try_from(total_pages)
        .map_err(|_| FetchError::Malformed(format!("totalPages {total_pages} out of range")))?;

    let total_count = object
        .get(resource.total_key())
        .or_else(|| object.get("total"))
        .and_then(Value::as_u64)
        .ok_or_else(|| {
            let key = resource.total_key();
            FetchError::Malformed(format!("list envelope has no numeric `{key}`"))
        })?;

    Ok(Page { items, total_pages, total_count })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::time::Duration;

    use maintflow_core::{Commande, Piece, Resource};
    use serde_json::json;

    use super::ListAdapter;
    use crate::backend::{Method, TransportError};
    use crate::errors::FetchError;
    use crate::testing::{piece_catalog, shared, ScriptedBackend};

    #[tokio::test]
    async fn second_page_of_twelve_parts_holds_five_items() {
        let (backend, erased) = shared(ScriptedBackend::new(piece_catalog));
        let adapter = ListAdapter::new(erased);

        let page = adapter
            .fetch_page::<Piece>(Resource::Piece, 2, 5, &BTreeMap::new())
            .await
            .expect("page 2");

        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items[0].id, "p-6");
        assert_eq!(page.items[4].id, "p-10");
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_count, 12);

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Get);
        assert_eq!(requests[0].path, "piece");
        assert_eq!(requests[0].query_value("page"), Some("2"));
        assert_eq!(requests[0].query_value("limit"), Some("5"));
    }

    #[tokio::test]
    async fn out_of_range_pages_are_forwarded_verbatim() {
        let (backend, erased) = shared(ScriptedBackend::new(piece_catalog));
        let adapter = ListAdapter::new(erased);

        adapter.fetch_page::<Piece>(Resource::Piece, 0, 5, &BTreeMap::new()).await.expect("page 0");
        let beyond = adapter
            .fetch_page::<Piece>(Resource::Piece, 4, 5, &BTreeMap::new())
            .await
            .expect("page 4");

        assert!(beyond.items.is_empty());
        let pages: Vec<_> = backend
            .requests()
            .iter()
            .map(|request| request.query_value("page").map(str::to_string))
            .collect();
        assert_eq!(pages, vec![Some("0".to_string()), Some("4".to_string())]);
    }

    #[tokio::test]
    async fn server_filters_become_query_parameters() {
        let (backend, erased) = shared(ScriptedBackend::always(
            200,
            json!({"results": [], "totalPages": 0, "totalCommandes": 0}),
        ));
        let adapter = ListAdapter::new(erased);
        let filters = BTreeMap::from([("statut".to_string(), "En attente".to_string())]);

        let page =
            adapter.fetch_page::<Commande>(Resource::Commande, 1, 10, &filters).await.expect("page");

        assert!(page.items.is_empty());
        assert_eq!(backend.requests()[0].query_value("statut"), Some("En attente"));
    }

    #[tokio::test]
    async fn generic_total_key_is_accepted() {
        let (_, erased) = shared(ScriptedBackend::always(
            200,
            json!({"results": [{"_id": "m-1", "nom": "Presse", "etat": "Fonctionnelle"}], "totalPages": 1, "total": 1}),
        ));
        let page = ListAdapter::new(erased)
            .fetch_page::<maintflow_core::Machine>(Resource::Machine, 1, 10, &BTreeMap::new())
            .await
            .expect("page");
        assert_eq!(page.total_count, 1);
    }

    #[tokio::test]
    async fn envelope_without_results_is_malformed() {
        let (_, erased) = shared(ScriptedBackend::always(200, json!({"pieces": []})));
        let error = ListAdapter::new(erased)
            .fetch_page::<Piece>(Resource::Piece, 1, 5, &BTreeMap::new())
            .await
            .expect_err("malformed");
        assert!(matches!(error, FetchError::Malformed(_)));
    }

    #[tokio::test]
    async fn status_codes_map_to_fetch_errors() {
        for (status, expected) in [
            (401, FetchError::Unauthorized { status: 401 }),
            (403, FetchError::Unauthorized { status: 403 }),
            (404, FetchError::NotFound),
            (500, FetchError::ServerError(500)),
        ] {
            let (_, erased) = shared(ScriptedBackend::always(status, json!({"message": "nope"})));
            let error = ListAdapter::new(erased)
                .fetch_page::<Piece>(Resource::Piece, 1, 5, &BTreeMap::new())
                .await
                .expect_err("error status");
            assert_eq!(error, expected);
        }
    }

    #[tokio::test]
    async fn transport_failures_map_to_network_and_timeout() {
        let (_, erased) =
            shared(ScriptedBackend::failing(TransportError::Timeout(Duration::from_secs(15))));
        let error = ListAdapter::new(erased)
            .fetch_page::<Piece>(Resource::Piece, 1, 5, &BTreeMap::new())
            .await
            .expect_err("timeout");
        assert_eq!(error, FetchError::Timeout);

        let (_, erased) =
            shared(ScriptedBackend::failing(TransportError::Network("connection refused".into())));
        let error = ListAdapter::new(erased)
            .fetch_page::<Piece>(Resource::Piece, 1, 5, &BTreeMap::new())
            .await
            .expect_err("network");
        assert!(matches!(error, FetchError::Network(_)));
    }
}
