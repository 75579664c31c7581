pub mod presentation;
pub mod states;
pub mod table;

pub use presentation::{presentation, StatusPresentation, StatusTone};
pub use states::{is_valid_status, Action, EntityType, Status};
pub use table::{
    allowed_actions, next_status, TransitionError, TransitionRule, TransitionTable, Transport,
};
