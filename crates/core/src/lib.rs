pub mod config;
pub mod domain;
pub mod errors;
pub mod listing;
pub mod workflow;

pub use domain::commande::Commande;
pub use domain::demande::Demande;
pub use domain::intervention::{Intervention, InterventionType};
pub use domain::machine::Machine;
pub use domain::maintenance::Maintenance;
pub use domain::panne::Panne;
pub use domain::piece::{Piece, Stock};
pub use domain::user::User;
pub use domain::{Entity, LignePiece, Reference, Resource, Role, Stateful};
pub use errors::DomainError;
pub use listing::{clamp_page, ClientFilter, ListQuery, Page, Searchable};
pub use workflow::{
    allowed_actions, is_valid_status, next_status, presentation, Action, EntityType, Status,
    StatusPresentation, TransitionError, TransitionRule, TransitionTable, Transport,
};
