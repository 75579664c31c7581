use serde::{Deserialize, Serialize};

use crate::domain::{Entity, Resource, Stateful};
use crate::listing::Searchable;
use crate::workflow::states::EntityType;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    #[serde(alias = "_id")]
    pub id: String,
    pub nom: String,
    #[serde(default)]
    pub fiche_technique: Option<String>,
    pub etat: String,
}

impl Entity for Machine {
    const RESOURCE: Resource = Resource::Machine;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Stateful for Machine {
    const ENTITY_TYPE: EntityType = EntityType::Machine;

    fn status(&self) -> &str {
        &self.etat
    }
}

impl Searchable for Machine {
    fn search_text(&self) -> Vec<String> {
        vec![self.nom.clone()]
    }

    fn field(&self, name: &str) -> Option<String> {
        match name {
            "etat" => Some(self.etat.clone()),
            "nom" => Some(self.nom.clone()),
            _ => None,
        }
    }
}
