use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{Entity, Reference, Resource, Stateful};
use crate::listing::Searchable;
use crate::workflow::states::EntityType;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterventionType {
    Maintenance,
    #[serde(rename = "Réparation", alias = "Reparation")]
    Reparation,
    #[serde(other)]
    Autre,
}

impl InterventionType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Maintenance => "Maintenance",
            Self::Reparation => "Réparation",
            Self::Autre => "Autre",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intervention {
    #[serde(alias = "_id")]
    pub id: String,
    pub machine: Reference,
    #[serde(default)]
    pub technicien: Option<Reference>,
    #[serde(rename = "type")]
    pub kind: InterventionType,
    pub statut: String,
    #[serde(default)]
    pub cout: Option<Decimal>,
    /// Hours spent on site.
    #[serde(default)]
    pub duree: Option<Decimal>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl Entity for Intervention {
    const RESOURCE: Resource = Resource::Intervention;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Stateful for Intervention {
    const ENTITY_TYPE: EntityType = EntityType::Intervention;

    fn status(&self) -> &str {
        &self.statut
    }
}

impl Searchable for Intervention {
    fn search_text(&self) -> Vec<String> {
        let mut values = vec![self.machine.display_name(), self.kind.label().to_string()];
        if let Some(technicien) = &self.technicien {
            values.push(technicien.display_name());
        }
        values
    }

    fn field(&self, name: &str) -> Option<String> {
        match name {
            "statut" => Some(self.statut.clone()),
            "type" => Some(self.kind.label().to_string()),
            "machine" => Some(self.machine.id().to_string()),
            "technicien" => self.technicien.as_ref().map(|user| user.id().to_string()),
            _ => None,
        }
    }
}
