use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// A backend collection reachable under `/{path}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Commande,
    Panne,
    Demande,
    Intervention,
    Maintenance,
    Machine,
    Piece,
    Stock,
    User,
}

impl Resource {
    pub const ALL: [Resource; 9] = [
        Resource::Commande,
        Resource::Panne,
        Resource::Demande,
        Resource::Intervention,
        Resource::Maintenance,
        Resource::Machine,
        Resource::Piece,
        Resource::Stock,
        Resource::User,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Self::Commande => "commande",
            Self::Panne => "panne",
            Self::Demande => "demande",
            Self::Intervention => "intervention",
            Self::Maintenance => "maintenance",
            Self::Machine => "machine",
            Self::Piece => "piece",
            Self::Stock => "stock",
            Self::User => "user",
        }
    }

    /// Envelope key carrying the collection size, e.g. `totalPieces`.
    pub fn total_key(&self) -> &'static str {
        match self {
            Self::Commande => "totalCommandes",
            Self::Panne => "totalPannes",
            Self::Demande => "totalDemandes",
            Self::Intervention => "totalInterventions",
            Self::Maintenance => "totalMaintenances",
            Self::Machine => "totalMachines",
            Self::Piece => "totalPieces",
            Self::Stock => "totalStocks",
            Self::User => "totalUsers",
        }
    }

    /// Query fields the backend list route filters on itself.
    pub fn server_filters(&self) -> &'static [&'static str] {
        match self {
            Self::Commande | Self::Panne | Self::Demande | Self::Maintenance => &["statut"],
            Self::Intervention => &["statut", "type"],
            Self::Machine | Self::Piece => &["etat", "search"],
            Self::User => &["role", "search"],
            Self::Stock => &[],
        }
    }

    pub fn supports_server_filter(&self, field: &str) -> bool {
        self.server_filters().contains(&field)
    }

    pub fn supports_delete(&self) -> bool {
        matches!(self, Self::Machine | Self::Piece | Self::User | Self::Stock)
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

impl std::str::FromStr for Resource {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().trim_matches('/').to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|resource| resource.path() == normalized)
            .ok_or(DomainError::UnknownResource(normalized))
    }
}
