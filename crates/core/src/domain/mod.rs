pub mod commande;
pub mod demande;
pub mod intervention;
pub mod machine;
pub mod maintenance;
pub mod panne;
pub mod piece;
pub mod resource;
pub mod role;
pub mod user;

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::listing::Searchable;
use crate::workflow::{allowed_actions, presentation, Action, EntityType, StatusPresentation};

pub use resource::Resource;
pub use role::Role;

/// A backend-owned record exposed through a collection endpoint.
pub trait Entity: DeserializeOwned + Searchable + Send + Sync + 'static {
    const RESOURCE: Resource;

    fn id(&self) -> &str;
}

/// An entity whose status participates in the workflow tables.
pub trait Stateful: Entity {
    const ENTITY_TYPE: EntityType;

    /// Raw status string as returned by the backend.
    fn status(&self) -> &str;

    fn presentation(&self) -> StatusPresentation {
        presentation(Self::ENTITY_TYPE, self.status())
    }

    fn allowed_actions(&self, role: Role) -> BTreeSet<Action> {
        allowed_actions(Self::ENTITY_TYPE, self.status(), role)
    }
}

/// Foreign key as the backend returns it: either a bare id or a populated document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference {
    Id(String),
    Populated(PopulatedRef),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulatedRef {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prenom: Option<String>,
}

impl Reference {
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Populated(populated) => &populated.id,
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            Self::Id(id) => id.clone(),
            Self::Populated(PopulatedRef { id, nom, prenom }) => match (prenom, nom) {
                (Some(prenom), Some(nom)) => format!("{prenom} {nom}"),
                (None, Some(nom)) => nom.clone(),
                (Some(prenom), None) => prenom.clone(),
                (None, None) => id.clone(),
            },
        }
    }
}

/// A `(piece, quantite)` line shared by purchase orders and part requests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LignePiece {
    pub piece: Reference,
    pub quantite: u32,
}
