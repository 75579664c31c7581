use serde::{Deserialize, Serialize};

use crate::domain::role::known_role;
use crate::domain::{Entity, Resource, Role};
use crate::listing::Searchable;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub nom: String,
    pub prenom: String,
    pub email: String,
    /// `None` when the backend sends a role this client does not know.
    #[serde(default, deserialize_with = "known_role")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.prenom, self.nom)
    }
}

impl Entity for User {
    const RESOURCE: Resource = Resource::User;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Searchable for User {
    fn search_text(&self) -> Vec<String> {
        vec![self.nom.clone(), self.prenom.clone(), self.email.clone()]
    }

    fn field(&self, name: &str) -> Option<String> {
        match name {
            "role" => self.role.map(|role| role.to_string()),
            "email" => Some(self.email.clone()),
            _ => None,
        }
    }
}
