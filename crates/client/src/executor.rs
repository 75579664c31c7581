use std::collections::BTreeSet;
use std::sync::Arc;

use maintflow_core::{
    Action, Entity, EntityType, Role, Stateful, Status, TransitionRule, TransitionTable, Transport,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::backend::{ApiRequest, Backend};
use crate::errors::{FetchError, WorkflowError};
use crate::resources::{record_path, unwrap_detail};

/// Outcome of one accepted transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransitionReceipt {
    pub entity: EntityType,
    pub entity_id: String,
    pub action: Action,
    pub from: Status,
    pub to: Status,
    pub correlation_id: Uuid,
    pub http_status: u16,
}

/// Runs workflow actions against the backend, one request per accepted action.
///
/// The executor never assumes the backend applied the change: callers re-fetch
/// the affected list or record after a successful transition.
#[derive(Clone)]
pub struct WorkflowExecutor {
    backend: Arc<dyn Backend>,
    table: Arc<TransitionTable>,
}

impl WorkflowExecutor {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::with_table(backend, Arc::new(TransitionTable::standard().clone()))
    }

    pub fn with_table(backend: Arc<dyn Backend>, table: Arc<TransitionTable>) -> Self {
        Self { backend, table }
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    pub fn allowed_actions(
        &self,
        entity: EntityType,
        current: &str,
        role: Role,
    ) -> BTreeSet<Action> {
        self.table.allowed_actions(entity, current, role)
    }

    /// Checks the table and the role without touching the backend.
    pub fn authorize(
        &self,
        entity: EntityType,
        current: &str,
        action: Action,
        role: Role,
    ) -> Result<&TransitionRule, WorkflowError> {
        let rule = self.table.rule(entity, current, action)?;
        if !rule.permits(role) {
            return Err(WorkflowError::NotAllowed {
                entity,
                status: current.to_string(),
                action,
                role,
            });
        }
        Ok(rule)
    }

    pub async fn execute(
        &self,
        entity: EntityType,
        entity_id: &str,
        action: Action,
        role: Role,
        current_status: &str,
    ) -> Result<TransitionReceipt, WorkflowError> {
        let correlation_id = Uuid::new_v4();
        let prepared = self.authorize(entity, current_status, action, role).and_then(|rule| {
            Ok((rule, transition_request(rule, entity_id)?))
        });
        let (rule, request) = match prepared {
            Ok(prepared) => prepared,
            Err(error) => {
                warn!(
                    event_name = "workflow.transition.refused",
                    correlation_id = %correlation_id,
                    entity = entity.as_str(),
                    entity_id,
                    action = action.as_str(),
                    role = role.as_str(),
                    status = current_status,
                    error_class = error.class(),
                    "transition refused before contacting the backend"
                );
                return Err(error);
            }
        };

        let response = self.backend.send(request).await.map_err(|error| {
            warn!(
                event_name = "workflow.transition.transport_failed",
                correlation_id = %correlation_id,
                entity = entity.as_str(),
                entity_id,
                action = action.as_str(),
                error = %error,
                "transition request did not reach the backend"
            );
            WorkflowError::from(error)
        })?;

        if !response.is_success() {
            let error = WorkflowError::from_response(&response);
            warn!(
                event_name = "workflow.transition.rejected",
                correlation_id = %correlation_id,
                entity = entity.as_str(),
                entity_id,
                action = action.as_str(),
                status = response.status,
                error_class = error.class(),
                "backend rejected the transition"
            );
            return Err(error);
        }

        info!(
            event_name = "workflow.transition.applied",
            correlation_id = %correlation_id,
            entity = entity.as_str(),
            entity_id,
            action = action.as_str(),
            from = rule.from.label(),
            to = rule.to.label(),
            role = role.as_str(),
            "transition accepted by backend"
        );

        Ok(TransitionReceipt {
            entity,
            entity_id: entity_id.to_string(),
            action,
            from: rule.from,
            to: rule.to,
            correlation_id,
            http_status: response.status,
        })
    }

    /// Executes against a record already on screen, using its displayed status.
    pub async fn execute_on<T: Stateful>(
        &self,
        record: &T,
        action: Action,
        role: Role,
    ) -> Result<TransitionReceipt, WorkflowError> {
        self.execute(T::ENTITY_TYPE, record.id(), action, role, record.status()).await
    }

    /// Reads the record's current status from the backend, then executes.
    pub async fn execute_fetching_status(
        &self,
        entity: EntityType,
        entity_id: &str,
        action: Action,
        role: Role,
    ) -> Result<TransitionReceipt, WorkflowError> {
        let current = self.fetch_status(entity, entity_id).await?;
        self.execute(entity, entity_id, action, role, &current).await
    }

    async fn fetch_status(
        &self,
        entity: EntityType,
        entity_id: &str,
    ) -> Result<String, WorkflowError> {
        let resource = entity.resource();
        let request = ApiRequest::get(record_path(resource, entity_id)?);
        let response = self.backend.send(request).await?;
        if !response.is_success() {
            return Err(WorkflowError::from_response(&response));
        }

        let body: Value = response
            .json()
            .map_err(|error| WorkflowError::Malformed(format!("invalid JSON body: {error}")))?;
        let record = unwrap_detail(resource, body);
        record
            .get(entity.status_field())
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                WorkflowError::Malformed(format!(
                    "{resource} {entity_id} has no `{}` field",
                    entity.status_field()
                ))
            })
    }
}

fn transition_request(rule: &TransitionRule, entity_id: &str) -> Result<ApiRequest, FetchError> {
    let path = record_path(rule.entity.resource(), entity_id)?;
    Ok(match rule.transport {
        Transport::ActionRoute => ApiRequest::put(format!("{path}/{}", rule.action.as_str())),
        Transport::StatusField => {
            let mut body = Map::new();
            body.insert(rule.entity.status_field().to_string(), Value::from(rule.to.label()));
            ApiRequest::put(path).with_body(Value::Object(body))
        }
    })
}
