//! # dynalookup-query
//!
//! Batched entity lookups against a statement-driven data store.
//!
//! For every entity the crate builds one parameterized statement, runs the
//! statements with bounded concurrency, and projects the returned records
//! into summary tags and a detail view.
//!
//! ## Architecture
//!
//! - **StatementStore**: executes one statement and returns plain records
//! - **StoreConnector**: builds a store client from connection settings
//! - **ConnectionManager**: caches the client, rebuilding it when the
//!   connection settings change
//! - **LookupExecutor**: fans a batch out over the store and aggregates the
//!   results in input order
//! - **Projection**: compiled attribute specs that format records
//!
//! ## Attribute specs
//!
//! Summary, detail and title attributes are configured with a small
//! comma/colon language, see [`attributes`]:
//!
//! ```text
//! Name:user.name, Created:date-iso:createdAt, status
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dynalookup_query::{Entity, LookupExecutor, LookupOptions, StoreConnector};
//!
//! # async fn example(connector: Arc<dyn StoreConnector>) {
//! let executor = LookupExecutor::new(connector);
//!
//! let options = LookupOptions::new(
//!     "us-east-1",
//!     "SELECT * FROM users WHERE email = ?",
//!     "{{entity}}",
//! )
//! .with_summary_attributes("Name:name")
//! .with_detail_attributes("Name:name, Joined:date-iso:createdAt");
//!
//! match executor.lookup(&[Entity::new("ada@example.com")], &options).await {
//!     Ok(results) => println!("{} results", results.len()),
//!     Err(err) => eprintln!("{}: {}", err.message, err.detail),
//! }
//! # }
//! ```
//!
//! Backend crates:
//! - `dynalookup-dynamodb` - DynamoDB PartiQL implementation

pub mod attributes;
pub mod connection;
pub mod error;
pub mod executor;
pub mod projection;
pub mod query;
pub mod resolver;
pub mod traits;
pub mod types;

// Re-export commonly used items
pub use attributes::{parse_attribute_spec, parse_first_rule, AttributeRule, ValueParser};
pub use connection::ConnectionManager;
pub use error::{DataError, LookupError, Result};
pub use executor::{LookupExecutor, LOOKUP_ERROR_DETAIL, MAX_CONCURRENT_QUERIES};
pub use projection::Projection;
pub use query::{build_query, escape_entity_value, ENTITY_TOKEN};
pub use traits::{StatementStore, StoreConnector};
pub use types::{
    ConnectionSettings, DetailAttribute, DetailEntry, DetailView, Entity, LookupData,
    LookupOptions, LookupResult, MillisPolicy, RawRecord, StatementQuery,
};
