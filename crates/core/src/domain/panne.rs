use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Entity, Reference, Resource, Stateful};
use crate::listing::Searchable;
use crate::workflow::states::EntityType;

/// Fault report filed by an operator against a machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Panne {
    #[serde(alias = "_id")]
    pub id: String,
    pub machine: Reference,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub operateur: Option<Reference>,
    #[serde(default)]
    pub date_signalement: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    pub statut: String,
}

impl Panne {
    /// Report date, falling back to the document's creation timestamp.
    pub fn dated(&self) -> Option<DateTime<Utc>> {
        self.date_signalement.or(self.created_at)
    }
}

impl Entity for Panne {
    const RESOURCE: Resource = Resource::Panne;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Stateful for Panne {
    const ENTITY_TYPE: EntityType = EntityType::Panne;

    fn status(&self) -> &str {
        &self.statut
    }
}

impl Searchable for Panne {
    fn search_text(&self) -> Vec<String> {
        let mut values = vec![self.machine.display_name(), self.description.clone()];
        if let Some(operateur) = &self.operateur {
            values.push(operateur.display_name());
        }
        values
    }

    fn field(&self, name: &str) -> Option<String> {
        match name {
            "statut" => Some(self.statut.clone()),
            "machine" => Some(self.machine.id().to_string()),
            "operateur" => self.operateur.as_ref().map(|user| user.id().to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Panne;
    use crate::domain::Stateful;

    #[test]
    fn report_with_both_dates_decodes() {
        let panne: Panne = serde_json::from_str(
            r#"{
                "_id": "pn-8",
                "machine": {"_id": "m-2", "nom": "Tour CN"},
                "description": "Vibration broche",
                "dateSignalement": "2024-05-02T07:15:00Z",
                "createdAt": "2024-05-02T07:15:01Z",
                "statut": "Ouverte"
            }"#,
        )
        .expect("panne");

        assert_eq!(panne.status(), "Ouverte");
        assert_eq!(panne.dated(), panne.date_signalement);
        assert_ne!(panne.date_signalement, panne.created_at);
    }
}
