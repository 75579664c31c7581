use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Entity, Reference, Resource, Stateful};
use crate::listing::Searchable;
use crate::workflow::states::EntityType;

/// Preventive maintenance plan entry for a machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Maintenance {
    #[serde(alias = "_id")]
    pub id: String,
    pub machine: Reference,
    #[serde(default)]
    pub technicien: Option<Reference>,
    #[serde(default)]
    pub date_prevue: Option<DateTime<Utc>>,
    #[serde(default)]
    pub frequence: Option<String>,
    #[serde(default)]
    pub description: String,
    pub statut: String,
}

impl Entity for Maintenance {
    const RESOURCE: Resource = Resource::Maintenance;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Stateful for Maintenance {
    const ENTITY_TYPE: EntityType = EntityType::Maintenance;

    fn status(&self) -> &str {
        &self.statut
    }
}

impl Searchable for Maintenance {
    fn search_text(&self) -> Vec<String> {
        vec![self.machine.display_name(), self.description.clone()]
    }

    fn field(&self, name: &str) -> Option<String> {
        match name {
            "statut" => Some(self.statut.clone()),
            "machine" => Some(self.machine.id().to_string()),
            "frequence" => self.frequence.clone(),
            _ => None,
        }
    }
}
