use std::sync::Arc;

use maintflow_core::{Entity, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::backend::{ApiRequest, ApiResponse, Backend};
use crate::errors::FetchError;

/// Single-record access: detail, create, update and delete.
#[derive(Clone)]
pub struct ResourceClient {
    backend: Arc<dyn Backend>,
}

impl ResourceClient {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    pub async fn get<T: Entity>(&self, id: &str) -> Result<T, FetchError> {
        let record = self.get_raw(T::RESOURCE, id).await?;
        decode(T::RESOURCE, record)
    }

    /// Detail record as untyped JSON, unwrapped from its `{ "<resource>": ... }` envelope.
    pub async fn get_raw(&self, resource: Resource, id: &str) -> Result<Value, FetchError> {
        let request = ApiRequest::get(record_path(resource, id)?);
        let response = self.call(resource, request).await?;
        record_from(resource, &response)
    }

    pub async fn create<T, B>(&self, body: &B) -> Result<T, FetchError>
    where
        T: Entity,
        B: Serialize + ?Sized,
    {
        let request = ApiRequest::post(T::RESOURCE.path(), encode(body)?);
        let response = self.call(T::RESOURCE, request).await?;
        decode(T::RESOURCE, record_from(T::RESOURCE, &response)?)
    }

    pub async fn update<T, B>(&self, id: &str, body: &B) -> Result<T, FetchError>
    where
        T: Entity,
        B: Serialize + ?Sized,
    {
        let request = ApiRequest::put(record_path(T::RESOURCE, id)?).with_body(encode(body)?);
        let response = self.call(T::RESOURCE, request).await?;
        decode(T::RESOURCE, record_from(T::RESOURCE, &response)?)
    }

    pub async fn delete<T: Entity>(&self, id: &str) -> Result<(), FetchError> {
        if !T::RESOURCE.supports_delete() {
            return Err(FetchError::NotSupported { resource: T::RESOURCE, operation: "delete" });
        }
        let request = ApiRequest::delete(record_path(T::RESOURCE, id)?);
        self.call(T::RESOURCE, request).await.map(|_| ())
    }

    async fn call(
        &self,
        resource: Resource,
        request: ApiRequest,
    ) -> Result<ApiResponse, FetchError> {
        let method = request.method;
        let response = self.backend.send(request).await?;
        if !response.is_success() {
            let error = FetchError::from_response(&response);
            warn!(
                event_name = "resource.request.failed",
                resource = resource.path(),
                method = method.as_str(),
                status = response.status,
                error_class = error.class(),
                "resource request returned a non-success status"
            );
            return Err(error);
        }
        debug!(
            event_name = "resource.request.completed",
            resource = resource.path(),
            method = method.as_str(),
            status = response.status,
            "resource request completed"
        );
        Ok(response)
    }
}

/// `{resource}/{id}` with the id percent-encoded as a single path segment.
///
/// Empty and dot-segment ids are refused; URL parsing would otherwise resolve them
/// against the collection path.
pub(crate) fn record_path(resource: Resource, id: &str) -> Result<String, FetchError> {
    if matches!(id, "" | "." | "..") {
        return Err(FetchError::InvalidId(id.to_string()));
    }
    Ok(format!("{}/{}", resource.path(), urlencoding::encode(id)))
}

/// Returns the record nested under the resource name, or the body itself.
pub(crate) fn unwrap_detail(resource: Resource, body: Value) -> Value {
    match body {
        Value::Object(mut object) => match object.remove(resource.path()) {
            Some(inner @ Value::Object(_)) => inner,
            Some(other) => {
                object.insert(resource.path().to_string(), other);
                Value::Object(object)
            }
            None => Value::Object(object),
        },
        other => other,
    }
}

fn record_from(resource: Resource, response: &ApiResponse) -> Result<Value, FetchError> {
    let body: Value = response
        .json()
        .map_err(|error| FetchError::Malformed(format!("invalid JSON body: {error}")))?;
    Ok(unwrap_detail(resource, body))
}

fn decode<T: DeserializeOwned>(resource: Resource, record: Value) -> Result<T, FetchError> {
    serde_json::from_value(record)
        .map_err(|error| FetchError::Malformed(format!("invalid {resource} record: {error}")))
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Value, FetchError> {
    serde_json::to_value(body)
        .map_err(|error| FetchError::Malformed(format!("request body is not valid JSON: {error}")))
}

#[cfg(test)]
mod tests {
    use maintflow_core::{Commande, Machine, Panne, Piece, Resource};
    use serde_json::json;

    use super::{record_path, unwrap_detail, ResourceClient};
    use crate::backend::Method;
    use crate::errors::FetchError;
    use crate::testing::{shared, ScriptedBackend};

    #[test]
    fn detail_envelopes_are_unwrapped() {
        let wrapped = json!({"message": "créée", "commande": {"_id": "c-1", "statut": "En attente"}});
        assert_eq!(
            unwrap_detail(Resource::Commande, wrapped),
            json!({"_id": "c-1", "statut": "En attente"})
        );

        let bare = json!({"_id": "m-1", "nom": "Presse", "etat": "Fonctionnelle"});
        assert_eq!(unwrap_detail(Resource::Machine, bare.clone()), bare);

        let scalar_field = json!({"_id": "pc-1", "piece": "p-1", "quantite": 2});
        assert_eq!(unwrap_detail(Resource::Piece, scalar_field.clone()), scalar_field);
    }

    #[test]
    fn record_ids_stay_inside_their_resource() {
        assert_eq!(record_path(Resource::Panne, "pn-3").as_deref(), Ok("panne/pn-3"));
        assert_eq!(
            record_path(Resource::Intervention, "../user/u-9").as_deref(),
            Ok("intervention/..%2Fuser%2Fu-9")
        );
        assert_eq!(record_path(Resource::Machine, "m 1?x").as_deref(), Ok("machine/m%201%3Fx"));
        for id in ["", ".", ".."] {
            assert_eq!(record_path(Resource::Machine, id), Err(FetchError::InvalidId(id.to_string())));
        }
    }

    #[tokio::test]
    async fn get_decodes_a_wrapped_record() {
        let (backend, erased) = shared(ScriptedBackend::always(
            200,
            json!({"panne": {"_id": "pn-3", "machine": "m-2", "description": "Fuite", "statut": "Ouverte"}}),
        ));
        let panne: Panne = ResourceClient::new(erased).get("pn-3").await.expect("panne");

        assert_eq!(panne.id, "pn-3");
        assert_eq!(panne.statut, "Ouverte");
        let request = backend.requests().pop().expect("request");
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.path, "panne/pn-3");
    }

    #[tokio::test]
    async fn create_posts_the_body_and_returns_the_record() {
        let (backend, erased) = shared(ScriptedBackend::always(
            201,
            json!({"commande": {"_id": "c-9", "fournisseur": "SKF", "statut": "En attente"}}),
        ));
        let body = json!({"fournisseur": "SKF", "pieces": [{"piece": "p-1", "quantite": 3}]});

        let commande: Commande =
            ResourceClient::new(erased).create(&body).await.expect("created commande");

        assert_eq!(commande.id, "c-9");
        let request = backend.requests().pop().expect("request");
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.path, "commande");
        assert_eq!(request.body, Some(body));
    }

    #[tokio::test]
    async fn update_puts_to_the_record_path() {
        let (backend, erased) = shared(ScriptedBackend::always(
            200,
            json!({"_id": "m-1", "nom": "Presse hydraulique", "etat": "Maintenance"}),
        ));
        let machine: Machine = ResourceClient::new(erased)
            .update("m-1", &json!({"etat": "Maintenance"}))
            .await
            .expect("updated");

        assert_eq!(machine.etat, "Maintenance");
        let request = backend.requests().pop().expect("request");
        assert_eq!(request.method, Method::Put);
        assert_eq!(request.path, "machine/m-1");
    }

    #[tokio::test]
    async fn delete_is_refused_for_workflow_records() {
        let (backend, erased) = shared(ScriptedBackend::always(200, json!({})));
        let error = ResourceClient::new(erased).delete::<Commande>("c-1").await.expect_err("refused");

        assert_eq!(
            error,
            FetchError::NotSupported { resource: Resource::Commande, operation: "delete" }
        );
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn delete_sends_one_request_for_catalogue_records() {
        let (backend, erased) = shared(ScriptedBackend::always(200, json!({"message": "supprimée"})));
        ResourceClient::new(erased).delete::<Piece>("p-4").await.expect("deleted");

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Delete);
        assert_eq!(requests[0].path, "piece/p-4");
    }

    #[tokio::test]
    async fn missing_record_maps_to_not_found() {
        let (_, erased) = shared(ScriptedBackend::always(404, json!({"message": "introuvable"})));
        let error = ResourceClient::new(erased).get::<Machine>("m-404").await.expect_err("missing");
        assert_eq!(error, FetchError::NotFound);
    }

    #[tokio::test]
    async fn undecodable_record_is_malformed() {
        let (_, erased) = shared(ScriptedBackend::always(200, json!({"machine": {"nom": 12}})));
        let error = ResourceClient::new(erased).get::<Machine>("m-1").await.expect_err("malformed");
        assert!(matches!(error, FetchError::Malformed(_)));
    }
}
