use std::collections::BTreeMap;

use clap::Args;
use maintflow_client::{FetchError, ListAdapter, ListView, ViewTrigger};
use maintflow_core::listing::SEARCH_FILTER;
use maintflow_core::{
    Commande, Demande, Entity, Intervention, Machine, Maintenance, Page, Panne, Piece, Resource,
    Stock, User,
};
use serde::Serialize;
use serde_json::Value;

use crate::commands::{
    http_backend, internal_failure, load_config, runtime, CommandResult, EXIT_BACKEND,
    EXIT_INVALID_ARGUMENT,
};

const COMMAND: &str = "list";

#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    #[arg(help = "Resource to list: commande, panne, demande, intervention, maintenance, machine, piece, stock or user")]
    pub resource: String,
    #[arg(long, default_value_t = 1, allow_negative_numbers = true, help = "Page to show; clamped to the available pages")]
    pub page: i64,
    #[arg(long, help = "Items per page (defaults to backend.default_page_limit)")]
    pub limit: Option<u32>,
    #[arg(long = "filter", value_name = "FIELD=VALUE", help = "Equality filter, repeatable")]
    pub filters: Vec<String>,
    #[arg(long, help = "Free-text search")]
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
struct ListOutput<T> {
    resource: Resource,
    page: u32,
    limit: u32,
    total_pages: u32,
    total_count: u64,
    filters: BTreeMap<String, String>,
    items: Vec<T>,
}

pub fn run(args: &ListArgs) -> CommandResult {
    let resource = match args.resource.parse::<Resource>() {
        Ok(resource) => resource,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                error.class(),
                error.to_string(),
                EXIT_INVALID_ARGUMENT,
            )
        }
    };
    let filters = match parse_filters(&args.filters, args.search.as_deref()) {
        Ok(filters) => filters,
        Err(message) => {
            return CommandResult::failure(
                COMMAND,
                "invalid_argument",
                message,
                EXIT_INVALID_ARGUMENT,
            )
        }
    };

    let config = match load_config(COMMAND) {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let limit = args.limit.unwrap_or(config.backend.default_page_limit);

    let parts = runtime().and_then(|runtime| Ok((runtime, http_backend(&config)?)));
    let (runtime, backend) = match parts {
        Ok(parts) => parts,
        Err(error) => return internal_failure(COMMAND, error),
    };
    let adapter = ListAdapter::new(backend);
    let page = args.page;

    let outcome = runtime.block_on(async {
        match resource {
            Resource::Commande => load::<Commande>(&adapter, limit, filters, page).await,
            Resource::Panne => load::<Panne>(&adapter, limit, filters, page).await,
            Resource::Demande => load::<Demande>(&adapter, limit, filters, page).await,
            Resource::Intervention => load::<Intervention>(&adapter, limit, filters, page).await,
            Resource::Maintenance => load::<Maintenance>(&adapter, limit, filters, page).await,
            Resource::Machine => load::<Machine>(&adapter, limit, filters, page).await,
            Resource::Piece => load::<Piece>(&adapter, limit, filters, page).await,
            Resource::Stock => load::<Stock>(&adapter, limit, filters, page).await,
            Resource::User => load::<User>(&adapter, limit, filters, page).await,
        }
    });

    match outcome {
        Ok((summary, data)) => CommandResult::success_with_data(COMMAND, summary, data),
        Err(error) => CommandResult::failure(
            COMMAND,
            error.class(),
            format!("{} ({error})", error.user_message()),
            EXIT_BACKEND,
        ),
    }
}

/// Loads the filtered first page, then moves to the requested page so it can be clamped.
async fn load<T>(
    adapter: &ListAdapter,
    limit: u32,
    filters: BTreeMap<String, String>,
    page: i64,
) -> Result<(String, Value), FetchError>
where
    T: Entity + Clone + Serialize,
{
    let view = ListView::<T>::new(limit);
    view.load(adapter, ViewTrigger::FilterChange(filters)).await;
    if page != 1 && view.snapshot().error.is_none() {
        view.load(adapter, ViewTrigger::PageChange(page)).await;
    }

    let snapshot = view.snapshot();
    if let Some(error) = snapshot.error {
        return Err(error);
    }
    let data = snapshot.data.unwrap_or_else(Page::empty);
    let summary = format!(
        "{} page {}/{}: {} item(s) shown, {} in total",
        T::RESOURCE,
        snapshot.page,
        data.total_pages.max(1),
        data.items.len(),
        data.total_count
    );
    let output = ListOutput {
        resource: T::RESOURCE,
        page: snapshot.page,
        limit: snapshot.limit,
        total_pages: data.total_pages,
        total_count: data.total_count,
        filters: snapshot.filters,
        items: data.items,
    };
    let value = serde_json::to_value(output)
        .map_err(|error| FetchError::Malformed(format!("could not render items: {error}")))?;
    Ok((summary, value))
}

fn parse_filters(
    raw: &[String],
    search: Option<&str>,
) -> Result<BTreeMap<String, String>, String> {
    let mut filters = BTreeMap::new();
    for entry in raw {
        let Some((field, value)) = entry.split_once('=') else {
            return Err(format!("filter `{entry}` must look like FIELD=VALUE"));
        };
        let field = field.trim();
        if field.is_empty() {
            return Err(format!("filter `{entry}` has an empty field name"));
        }
        filters.insert(field.to_string(), value.trim().to_string());
    }
    if let Some(search) = search {
        filters.insert(SEARCH_FILTER.to_string(), search.to_string());
    }
    Ok(filters)
}
