use clap::Args;
use maintflow_client::{WorkflowError, WorkflowExecutor};
use maintflow_core::{Action, EntityType};
use tracing::warn;

use crate::commands::{
    http_backend, internal_failure, load_config, resolve_role, runtime, CommandResult,
    EXIT_BACKEND, EXIT_INVALID_ARGUMENT, EXIT_REFUSED,
};

const COMMAND: &str = "transition";

#[derive(Debug, Clone, Args)]
pub struct TransitionArgs {
    #[arg(help = "Entity type: commande, panne, demande, intervention or maintenance")]
    pub entity: String,
    #[arg(help = "Record identifier")]
    pub id: String,
    #[arg(help = "Workflow action, e.g. valider, livrer, confirmer, resoudre")]
    pub action: String,
    #[arg(long, help = "Acting role (defaults to MAINTFLOW_ROLE / auth.role)")]
    pub role: Option<String>,
    #[arg(long, help = "Current status; fetched from the backend when omitted")]
    pub status: Option<String>,
}

pub fn run(args: &TransitionArgs) -> CommandResult {
    let parsed = args
        .entity
        .parse::<EntityType>()
        .and_then(|entity| Ok((entity, args.action.parse::<Action>()?)));
    let (entity, action) = match parsed {
        Ok(parsed) => parsed,
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

    let parts = runtime().and_then(|runtime| Ok((runtime, http_backend(&config)?)));
    let (runtime, backend) = match parts {
        Ok(parts) => parts,
        Err(error) => return internal_failure(COMMAND, error),
    };
    let executor = WorkflowExecutor::new(backend);

    let outcome = runtime.block_on(async {
        match args.status.as_deref() {
            Some(current) => executor.execute(entity, &args.id, action, role, current).await,
            None => executor.execute_fetching_status(entity, &args.id, action, role).await,
        }
    });

    match outcome {
        Ok(receipt) => {
            let message = format!(
                "{entity} {} moved from `{}` to `{}` by {action}",
                receipt.entity_id, receipt.from, receipt.to
            );
            match serde_json::to_value(&receipt) {
                Ok(data) => CommandResult::success_with_data(COMMAND, message, data),
                Err(error) => {
                    warn!(
                        event_name = "cli.transition.receipt_unrendered",
                        entity_id = %receipt.entity_id,
                        error = %error,
                        "transition applied but its receipt could not be rendered"
                    );
                    CommandResult::success(COMMAND, message)
                }
            }
        }
        Err(error) => failure_for(&error),
    }
}

fn failure_for(error: &WorkflowError) -> CommandResult {
    let exit_code = if error.is_refused_locally() { EXIT_REFUSED } else { EXIT_BACKEND };
    CommandResult::failure(
        COMMAND,
        error.class(),
        format!("{} ({error})", error.user_message()),
        exit_code,
    )
}
