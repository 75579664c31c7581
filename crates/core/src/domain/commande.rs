use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Entity, LignePiece, Reference, Resource, Stateful};
use crate::listing::Searchable;
use crate::workflow::states::EntityType;

/// Purchase order raised by a storekeeper towards a supplier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commande {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub date_creation: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    pub fournisseur: String,
    #[serde(default)]
    pub magasinier: Option<Reference>,
    #[serde(default)]
    pub pieces: Vec<LignePiece>,
    pub statut: String,
}

impl Commande {
    /// Order date, falling back to the document's creation timestamp.
    pub fn dated(&self) -> Option<DateTime<Utc>> {
        self.date_creation.or(self.created_at)
    }

    pub fn total_quantity(&self) -> u64 {
        self.pieces.iter().map(|line| u64::from(line.quantite)).sum()
    }
}

impl Entity for Commande {
    const RESOURCE: Resource = Resource::Commande;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Stateful for Commande {
    const ENTITY_TYPE: EntityType = EntityType::Commande;

    fn status(&self) -> &str {
        &self.statut
    }
}

impl Searchable for Commande {
    fn search_text(&self) -> Vec<String> {
        let mut values = vec![self.id.clone(), self.fournisseur.clone()];
        if let Some(magasinier) = &self.magasinier {
            values.push(magasinier.display_name());
        }
        values
    }

    fn field(&self, name: &str) -> Option<String> {
        match name {
            "statut" => Some(self.statut.clone()),
            "fournisseur" => Some(self.fournisseur.clone()),
            "magasinier" => self.magasinier.as_ref().map(|user| user.id().to_string()),
            _ => None,
        }
    }
}
