pub mod classify;
pub mod config;
pub mod preference;
pub mod selector;
pub mod template;

use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::CatalogError;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("template {}: {source}", path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("template JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
