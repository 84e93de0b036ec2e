// Service exports
pub mod auth;
pub mod cache;
pub mod memory;
pub mod postgres;
pub mod provider;
pub mod rest;

pub use auth::{AuthError, CurrentUser, ProfileDirectory, SessionClaims, SessionVerifier};
pub use cache::{CacheError, CacheKey, CacheManager};
pub use memory::InMemoryProvider;
pub use postgres::PostgresProvider;
pub use provider::{DataProvider, ProviderError};
pub use rest::{RestProvider, RestTables};
