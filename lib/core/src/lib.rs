pub mod auth;
pub mod config;
pub mod error;
pub mod module;
pub mod types;

pub use auth::{authorize_owner, validate_reference, Principal};
pub use config::ServiceConfig;
pub use error::ServiceError;
pub use module::Module;
pub use types::{new_id, now_rfc3339, ListResult, PageParams};
