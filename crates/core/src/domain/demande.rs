use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Entity, LignePiece, Reference, Resource, Stateful};
use crate::listing::Searchable;
use crate::workflow::states::EntityType;

/// Part request from a technician, settled by the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demande {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub technicien: Option<Reference>,
    #[serde(default)]
    pub pieces: Vec<LignePiece>,
    #[serde(default)]
    pub date_demande: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    pub statut: String,
}

impl Demande {
    /// Request date, or the creation timestamp when the request carries none.
    pub fn dated(&self) -> Option<DateTime<Utc>> {
        self.date_demande.or(self.created_at)
    }
}

impl Entity for Demande {
    const RESOURCE: Resource = Resource::Demande;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Stateful for Demande {
    const ENTITY_TYPE: EntityType = EntityType::Demande;

    fn status(&self) -> &str {
        &self.statut
    }
}

impl Searchable for Demande {
    fn search_text(&self) -> Vec<String> {
        let mut values: Vec<String> =
            self.pieces.iter().map(|line| line.piece.display_name()).collect();
        if let Some(technicien) = &self.technicien {
            values.push(technicien.display_name());
        }
        values
    }

    fn field(&self, name: &str) -> Option<String> {
        match name {
            "statut" => Some(self.statut.clone()),
            "technicien" => self.technicien.as_ref().map(|user| user.id().to_string()),
            _ => None,
        }
    }
}
