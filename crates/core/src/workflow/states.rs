use serde::{Deserialize, Serialize, Serializer};

use crate::domain::Resource;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Commande,
    Panne,
    Demande,
    Intervention,
    Maintenance,
    Machine,
    Piece,
}

impl EntityType {
    pub const ALL: [EntityType; 7] = [
        EntityType::Commande,
        EntityType::Panne,
        EntityType::Demande,
        EntityType::Intervention,
        EntityType::Maintenance,
        EntityType::Machine,
        EntityType::Piece,
    ];

    pub fn resource(&self) -> Resource {
        match self {
            Self::Commande => Resource::Commande,
            Self::Panne => Resource::Panne,
            Self::Demande => Resource::Demande,
            Self::Intervention => Resource::Intervention,
            Self::Maintenance => Resource::Maintenance,
            Self::Machine => Resource::Machine,
            Self::Piece => Resource::Piece,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.resource().path()
    }

    /// Backend field holding the status value.
    pub fn status_field(&self) -> &'static str {
        match self {
            Self::Machine | Self::Piece => "etat",
            _ => "statut",
        }
    }

    /// Declared status members, in lifecycle order.
    pub fn statuses(&self) -> &'static [Status] {
        use Status::*;
        match self {
            Self::Commande => &[EnAttente, Validee, Livree],
            Self::Panne => &[Ouverte, EnCours, Resolue],
            Self::Demande => &[EnAttente, Validee, Rejetee],
            Self::Intervention => &[EnCours, Complete, Reporte],
            Self::Maintenance => &[Planifiee, EnCours, Terminee],
            Self::Machine => &[Fonctionnelle, EnPanne, EnMaintenance],
            Self::Piece => &[Disponible, NonDisponible],
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().trim_matches('/').to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|entity| entity.as_str() == normalized)
            .ok_or(DomainError::UnknownEntityType(normalized))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    EnAttente,
    Validee,
    Livree,
    Rejetee,
    Ouverte,
    EnCours,
    Resolue,
    Complete,
    Reporte,
    Planifiee,
    Terminee,
    Fonctionnelle,
    EnPanne,
    EnMaintenance,
    Disponible,
    NonDisponible,
}

impl Status {
    /// The exact string the backend stores.
    pub fn label(&self) -> &'static str {
        match self {
            Self::EnAttente => "En attente",
            Self::Validee => "Validée",
            Self::Livree => "Livrée",
            Self::Rejetee => "Rejetée",
            Self::Ouverte => "Ouverte",
            Self::EnCours => "En cours",
            Self::Resolue => "Résolue",
            Self::Complete => "Complété",
            Self::Reporte => "Reporté",
            Self::Planifiee => "Planifiée",
            Self::Terminee => "Terminée",
            Self::Fonctionnelle => "Fonctionnelle",
            Self::EnPanne => "En panne",
            Self::EnMaintenance => "Maintenance",
            Self::Disponible => "Disponible",
            Self::NonDisponible => "Non Disponible",
        }
    }

    /// Resolves a backend string against the members declared for `entity`.
    ///
    /// Matching ignores case, accents and surrounding whitespace.
    pub fn parse(entity: EntityType, raw: &str) -> Option<Status> {
        let wanted = fold(raw);
        entity.statuses().iter().copied().find(|status| fold(status.label()) == wanted)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// True when `value` is exactly the stored label of one of `entity`'s statuses.
///
/// Use [`Status::parse`] for the lenient lookup.
pub fn is_valid_status(entity: EntityType, value: &str) -> bool {
    entity.statuses().iter().any(|status| status.label() == value)
}

fn fold(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|ch| match ch {
            'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
            'à' | 'â' | 'À' | 'Â' => 'a',
            'î' | 'ï' | 'Î' | 'Ï' => 'i',
            'ô' | 'Ô' => 'o',
            'ù' | 'û' | 'ü' | 'Ù' | 'Û' | 'Ü' => 'u',
            'ç' | 'Ç' => 'c',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Valider,
    Livrer,
    Rejeter,
    Confirmer,
    Resoudre,
    Completer,
    Reporter,
    Reprendre,
    Demarrer,
    Terminer,
}

impl Action {
    pub const ALL: [Action; 10] = [
        Action::Valider,
        Action::Livrer,
        Action::Rejeter,
        Action::Confirmer,
        Action::Resoudre,
        Action::Completer,
        Action::Reporter,
        Action::Reprendre,
        Action::Demarrer,
        Action::Terminer,
    ];

    /// Path segment used by `PUT /{resource}/{id}/{action}` routes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valider => "valider",
            Self::Livrer => "livrer",
            Self::Rejeter => "rejeter",
            Self::Confirmer => "confirmer",
            Self::Resoudre => "resoudre",
            Self::Completer => "completer",
            Self::Reporter => "reporter",
            Self::Reprendre => "reprendre",
            Self::Demarrer => "demarrer",
            Self::Terminer => "terminer",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Action {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = fold(value);
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == normalized)
            .ok_or(DomainError::UnknownAction(normalized))
    }
}
