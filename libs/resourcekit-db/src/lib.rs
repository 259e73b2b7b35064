#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Generic data access for resources stored through `SeaORM`.

pub mod connect;
pub mod dao;
pub mod error;
pub mod page;
pub mod stored;
pub mod tx;

pub use connect::{ConnectOpts, connect_db};
pub use dao::Dao;
pub use error::ResourceError;
pub use page::{DEFAULT_PAGE_SIZE, Filter, LimitCfg, MAX_PAGE_SIZE, Page};
pub use stored::{StoredResource, map_from_json, map_to_json, set_if_some};
pub use tx::{TxFuture, with_transaction};
