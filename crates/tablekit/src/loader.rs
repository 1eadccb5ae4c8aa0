//! Bulk loading of movie records.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tablekit_core::key::PrimaryKey;
use tablekit_core::movies::{parse_movies, MovieRecord};
use tablekit_core::storage::{PutItemRequest, TableStore};
use tracing::{info, warn};

use crate::error::{AppError, Result};

/// What to do when a record fails to write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadPolicy {
    /// Stop at the first failed write. Earlier writes stay in the table.
    #[default]
    AbortOnError,
    /// Log the failure and continue with the next record.
    KeepGoing,
}

impl LoadPolicy {
    pub fn from_keep_going(keep_going: bool) -> Self {
        if keep_going {
            Self::KeepGoing
        } else {
            Self::AbortOnError
        }
    }
}

/// A record that could not be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub key: PrimaryKey,
    pub reason: String,
}

/// Result of a bulk load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub loaded: usize,
    pub failed: Vec<LoadFailure>,
}

/// Reads and parses a bulk-load file.
pub fn read_movies(path: &Path) -> Result<Vec<MovieRecord>> {
    let file = File::open(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_movies(BufReader::new(file))?)
}

/// Writes each record with an unconditional put, in file order.
///
/// `on_loaded` is called after every successful write.
pub async fn load_movies(
    store: &dyn TableStore,
    table_name: &str,
    movies: &[MovieRecord],
    policy: LoadPolicy,
    mut on_loaded: impl FnMut(&MovieRecord),
) -> Result<LoadSummary> {
    let mut summary = LoadSummary::default();

    for movie in movies {
        let request = PutItemRequest::new(movie.to_item());
        match store.put_item(table_name, &request).await {
            Ok(_) => {
                info!(year = movie.year, title = %movie.title, "loaded movie");
                summary.loaded += 1;
                on_loaded(movie);
            }
            Err(source) => match policy {
                LoadPolicy::AbortOnError => {
                    return Err(AppError::Load {
                        key: movie.key(),
                        source,
                    });
                }
                LoadPolicy::KeepGoing => {
                    warn!(year = movie.year, title = %movie.title, error = %source, "failed to load movie");
                    summary.failed.push(LoadFailure {
                        key: movie.key(),
                        reason: source.to_string(),
                    });
                }
            },
        }
    }

    Ok(summary)
}
