use serde::Serialize;

use crate::workflow::states::{EntityType, Status};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    Pending,
    Active,
    Success,
    Danger,
    Neutral,
}

impl StatusTone {
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Pending => "status-pending",
            Self::Active => "status-active",
            Self::Success => "status-success",
            Self::Danger => "status-danger",
            Self::Neutral => "status-neutral",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusPresentation {
    pub label: String,
    pub tone: StatusTone,
    pub style_class: &'static str,
    pub mapped: bool,
}

const TONES: &[(EntityType, Status, StatusTone)] = &[
    (EntityType::Commande, Status::EnAttente, StatusTone::Pending),
    (EntityType::Commande, Status::Validee, StatusTone::Active),
    (EntityType::Commande, Status::Livree, StatusTone::Success),
    (EntityType::Panne, Status::Ouverte, StatusTone::Danger),
    (EntityType::Panne, Status::EnCours, StatusTone::Active),
    (EntityType::Panne, Status::Resolue, StatusTone::Success),
    (EntityType::Demande, Status::EnAttente, StatusTone::Pending),
    (EntityType::Demande, Status::Validee, StatusTone::Success),
    (EntityType::Demande, Status::Rejetee, StatusTone::Danger),
    (EntityType::Intervention, Status::EnCours, StatusTone::Active),
    (EntityType::Intervention, Status::Complete, StatusTone::Success),
    (EntityType::Intervention, Status::Reporte, StatusTone::Pending),
    (EntityType::Maintenance, Status::Planifiee, StatusTone::Pending),
    (EntityType::Maintenance, Status::EnCours, StatusTone::Active),
    (EntityType::Maintenance, Status::Terminee, StatusTone::Success),
    (EntityType::Machine, Status::Fonctionnelle, StatusTone::Success),
    (EntityType::Machine, Status::EnPanne, StatusTone::Danger),
    (EntityType::Machine, Status::EnMaintenance, StatusTone::Pending),
    (EntityType::Piece, Status::Disponible, StatusTone::Success),
    (EntityType::Piece, Status::NonDisponible, StatusTone::Danger),
];

/// Label and style for a backend status; unmapped values are shown verbatim.
pub fn presentation(entity: EntityType, raw: &str) -> StatusPresentation {
    let known = Status::parse(entity, raw).and_then(|status| {
        TONES
            .iter()
            .find(|(candidate, declared, _)| *candidate == entity && *declared == status)
            .map(|(_, _, tone)| (status, *tone))
    });

    match known {
        Some((status, tone)) => StatusPresentation {
            label: status.label().to_string(),
            tone,
            style_class: tone.css_class(),
            mapped: true,
        },
        None => StatusPresentation {
            label: raw.to_string(),
            tone: StatusTone::Neutral,
            style_class: StatusTone::Neutral.css_class(),
            mapped: false,
        },
    }
}
