use clap::Args;
use maintflow_core::{
    is_valid_status, presentation, Action, EntityType, Role, Status, StatusPresentation,
    TransitionTable, Transport,
};
use serde::Serialize;

use crate::commands::{load_config, resolve_role, CommandResult, EXIT_INVALID_ARGUMENT};

const COMMAND: &str = "actions";

#[derive(Debug, Clone, Args)]
pub struct ActionsArgs {
    #[arg(help = "Entity type: commande, panne, demande, intervention, maintenance, machine or piece")]
    pub entity: String,
    #[arg(help = "Current status as stored by the backend, e.g. \"En attente\"")]
    pub status: String,
    #[arg(long, help = "Acting role (defaults to MAINTFLOW_ROLE / auth.role)")]
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
struct AvailableAction {
    action: Action,
    next_status: Status,
    transport: Transport,
}

#[derive(Debug, Serialize)]
struct ActionsOutput {
    entity: EntityType,
    status: String,
    known_status: bool,
    role: Role,
    presentation: StatusPresentation,
    actions: Vec<AvailableAction>,
}

pub fn run(args: &ActionsArgs) -> CommandResult {
    let entity = match args.entity.parse::<EntityType>() {
        Ok(entity) => entity,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                error.class(),
                error.to_string(),
                EXIT_INVALID_ARGUMENT,
            )
        }
    };
    let config = match load_config(COMMAND) {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let role = match resolve_role(COMMAND, args.role.as_deref(), &config) {
        Ok(role) => role,
        Err(failure) => return failure,
    };

    let table = TransitionTable::standard();
    let actions: Vec<AvailableAction> = table
        .allowed_actions(entity, &args.status, role)
        .into_iter()
        .filter_map(|action| table.rule(entity, &args.status, action).ok())
        .map(|rule| AvailableAction {
            action: rule.action,
            next_status: rule.to,
            transport: rule.transport,
        })
        .collect();

    let message = if actions.is_empty() {
        format!("no action available to {role} for {entity} in status `{}`", args.status)
    } else {
        let names: Vec<&str> = actions.iter().map(|available| available.action.as_str()).collect();
        format!("{role} may {} this {entity}", names.join(", "))
    };

    let output = ActionsOutput {
        entity,
        status: args.status.clone(),
        known_status: is_valid_status(entity, &args.status),
        role,
        presentation: presentation(entity, &args.status),
        actions,
    };
    match serde_json::to_value(output) {
        Ok(data) => CommandResult::success_with_data(COMMAND, message, data),
        Err(error) => CommandResult::failure(
            COMMAND,
            "serialization",
            error.to_string(),
            EXIT_INVALID_ARGUMENT,
        ),
    }
}
