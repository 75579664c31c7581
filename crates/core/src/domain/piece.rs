use serde::{Deserialize, Serialize};

use crate::domain::{Entity, Reference, Resource, Stateful};
use crate::listing::Searchable;
use crate::workflow::states::EntityType;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    #[serde(alias = "_id")]
    pub id: String,
    pub nom: String,
    #[serde(default)]
    pub quantite: u32,
    pub etat: String,
}

impl Entity for Piece {
    const RESOURCE: Resource = Resource::Piece;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Stateful for Piece {
    const ENTITY_TYPE: EntityType = EntityType::Piece;

    fn status(&self) -> &str {
        &self.etat
    }
}

impl Searchable for Piece {
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

/// Stock level of one part against its reorder threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    #[serde(alias = "_id")]
    pub id: String,
    pub piece: Reference,
    pub quantite_disponible: u32,
    pub quantite_minimale: u32,
}

impl Stock {
    pub fn is_below_minimum(&self) -> bool {
        self.quantite_disponible < self.quantite_minimale
    }

    pub fn shortfall(&self) -> u32 {
        self.quantite_minimale.saturating_sub(self.quantite_disponible)
    }
}

impl Entity for Stock {
    const RESOURCE: Resource = Resource::Stock;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Searchable for Stock {
    fn search_text(&self) -> Vec<String> {
        vec![self.piece.display_name()]
    }

    fn field(&self, name: &str) -> Option<String> {
        match name {
            "piece" => Some(self.piece.id().to_string()),
            "alerte" => Some(self.is_below_minimum().to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Stock;
    use crate::domain::Reference;
    use crate::listing::Searchable;

    fn stock(disponible: u32, minimale: u32) -> Stock {
        Stock {
            id: "s-1".to_string(),
            piece: Reference::Id("p-1".to_string()),
            quantite_disponible: disponible,
            quantite_minimale: minimale,
        }
    }

    #[test]
    fn alert_raised_strictly_below_minimum() {
        assert!(stock(2, 5).is_below_minimum());
        assert_eq!(stock(2, 5).shortfall(), 3);
        assert!(!stock(5, 5).is_below_minimum());
        assert_eq!(stock(9, 5).shortfall(), 0);
    }

    #[test]
    fn alert_flag_is_filterable() {
        assert_eq!(stock(1, 4).field("alerte").as_deref(), Some("true"));
    }

    #[test]
    fn decodes_camel_case_quantities() {
        let stock: Stock = serde_json::from_str(
            r#"{"_id":"s-9","piece":"p-4","quantiteDisponible":3,"quantiteMinimale":10}"#,
        )
        .expect("stock");
        assert!(stock.is_below_minimum());
    }
}
