pub mod adapter;
pub mod auth;
pub mod backend;
pub mod errors;
pub mod executor;
pub mod http;
pub mod resources;
pub mod view;

#[cfg(test)]
mod testing;

pub use adapter::ListAdapter;
pub use auth::{Anonymous, AuthContext, StaticToken};
pub use backend::{ApiRequest, ApiResponse, Backend, Method, TransportError};
pub use errors::{FetchError, WorkflowError};
pub use executor::{TransitionReceipt, WorkflowExecutor};
pub use http::HttpBackend;
pub use resources::ResourceClient;
pub use view::{ListView, PendingFetch, Resolution, ViewPhase, ViewSnapshot, ViewTrigger};
