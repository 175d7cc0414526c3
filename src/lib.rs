pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod http_params;
pub mod media;
pub mod metrics;
pub mod pipeline;
pub mod rpc;
pub mod rql;
pub mod solr;
pub mod tracks;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
