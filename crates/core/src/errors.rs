use thiserror::Error;

use crate::workflow::TransitionError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown role `{0}` (expected operateur|technicien|magasinier|responsable|admin)")]
    UnknownRole(String),
    #[error("unknown resource `{0}`")]
    UnknownResource(String),
    #[error("unknown entity type `{0}`")]
    UnknownEntityType(String),
    #[error("unknown workflow action `{0}`")]
    UnknownAction(String),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl DomainError {
    /// Short machine-readable class used in structured outputs.
    pub fn class(&self) -> &'static str {
        match self {
            Self::UnknownRole(_)
            | Self::UnknownResource(_)
            | Self::UnknownEntityType(_)
            | Self::UnknownAction(_) => "invalid_argument",
            Self::Transition(_) => "invalid_transition",
        }
    }
}
