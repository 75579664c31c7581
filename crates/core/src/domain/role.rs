use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Operateur,
    Technicien,
    Magasinier,
    Responsable,
    Admin,
}

impl Role {
    pub const ALL: [Role; 5] =
        [Role::Operateur, Role::Technicien, Role::Magasinier, Role::Responsable, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Operateur => "operateur",
            Self::Technicien => "technicien",
            Self::Magasinier => "magasinier",
            Self::Responsable => "responsable",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "operateur" | "opérateur" => Ok(Self::Operateur),
            "technicien" => Ok(Self::Technicien),
            "magasinier" => Ok(Self::Magasinier),
            "responsable" => Ok(Self::Responsable),
            "admin" => Ok(Self::Admin),
            other => Err(DomainError::UnknownRole(other.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Reads an optional role, mapping names outside [`Role::ALL`] to `None`.
pub(crate) fn known_role<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Role>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|name| name.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::Role;

    #[test]
    fn parses_backend_role_names() {
        assert_eq!("magasinier".parse::<Role>().expect("role"), Role::Magasinier);
        assert_eq!(" Admin ".parse::<Role>().expect("role"), Role::Admin);
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&Role::Responsable).expect("serialize");
        assert_eq!(json, "\"responsable\"");
    }

    #[test]
    fn deserializes_like_from_str() {
        let parsed: Vec<Role> =
            serde_json::from_str(r#"["opérateur", "Technicien", "operateur"]"#).expect("roles");
        assert_eq!(parsed, vec![Role::Operateur, Role::Technicien, Role::Operateur]);
        assert!(serde_json::from_str::<Role>(r#""superuser""#).is_err());
    }
}
