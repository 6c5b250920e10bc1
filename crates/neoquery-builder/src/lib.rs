//! Cypher query construction.
//!
//! [`QueryBuilder`] assembles a query string and its parameter map from a
//! fluent chain of clause calls. It performs no I/O; execution lives in
//! `neoquery-service` and the transport crates.
//!
//! ```
//! use neoquery_builder::{Properties, QueryBuilder};
//!
//! let mut qb = QueryBuilder::new();
//! qb.match_("u", "User", Properties::new())
//!     .where_("u.firstName = {firstName}", [("firstName", "Gabi")])
//!     .limit(10);
//! assert_eq!(
//!     qb.get_query(None),
//!     " MATCH (u:User) WHERE u.firstName = {firstName} RETURN u LIMIT 10"
//! );
//! ```

pub mod aggregation;
pub mod builder;
pub mod error;
pub mod format;
pub mod functions;
pub mod types;

pub use aggregation::{Aggregate, Aggregation};
pub use builder::{
    CaseKind, DEFAULT_MERGE_RELATIONSHIP_PLACEHOLDER, DEFAULT_RELATE_PLACEHOLDER, IndexAction,
    NO_PARAMS, OrderDirection, QueryBuilder,
};
pub use error::{BuilderError, BuilderErrorKind};
pub use functions::{Predicate, SizeOf};
pub use types::{LabelMap, Parameters, Properties, PropertyValue};
