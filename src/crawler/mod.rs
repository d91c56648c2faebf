//! Crawl entry points
//!
//! One worker per scope runs concurrently; scopes share nothing but the
//! configuration. Within a scope all navigation is strictly sequential
//! (see [`orchestrator`]).

mod orchestrator;

pub use orchestrator::{ScopeStats, ScopeWorker};

use crate::config::Config;
use crate::hierarchy::ScopeKey;
use crate::session::{HttpSessionFactory, PageSession, SessionFactory};
use crate::{CatalogError, Result};
use tokio::task::JoinSet;

/// Runs a complete extraction over the given scopes
///
/// Validates the requested labels against the live query form once, then
/// spawns one [`ScopeWorker`] per scope.
///
/// # Arguments
///
/// * `config` - The crawl configuration
/// * `program_type` - Program-type label exactly as the form offers it
/// * `scopes` - Enrollment years to process
pub async fn crawl(config: Config, program_type: &str, scopes: &[ScopeKey]) -> Result<Vec<ScopeStats>> {
    let factory = HttpSessionFactory::new(config.source.clone(), config.client.clone());

    // One probe session discovers the form's valid labels
    let probe = factory.open().await?;
    let type_labels = probe.option_labels(&config.source.type_selector)?;
    if !type_labels.iter().any(|l| l == program_type) {
        return Err(CatalogError::UnknownOption {
            label: program_type.to_string(),
            selector: config.source.type_selector.clone(),
        });
    }
    let scope_labels = probe.option_labels(&config.source.scope_selector)?;
    for scope in scopes {
        if !scope_labels.iter().any(|l| l == &scope.to_string()) {
            return Err(CatalogError::UnknownOption {
                label: scope.to_string(),
                selector: config.source.scope_selector.clone(),
            });
        }
    }
    drop(probe);

    run_scopes(factory, config, program_type, scopes).await
}

/// Spawns one scope worker per scope and gathers their stats
///
/// A failing scope does not stop its siblings; the first worker error is
/// reported after every scope has finished.
pub async fn run_scopes<F>(
    factory: F,
    config: Config,
    program_type: &str,
    scopes: &[ScopeKey],
) -> Result<Vec<ScopeStats>>
where
    F: SessionFactory + Clone + 'static,
{
    let mut set = JoinSet::new();
    for &scope in scopes {
        let worker = ScopeWorker::new(factory.clone(), scope, program_type, &config)?;
        set.spawn(worker.run());
    }

    let mut stats = Vec::new();
    let mut first_error = None;
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(Ok(scope_stats)) => stats.push(scope_stats),
            Ok(Err(e)) => {
                tracing::error!("Scope worker failed: {}", e);
                first_error.get_or_insert(e);
            }
            Err(join_error) => {
                tracing::error!("Scope worker panicked: {}", join_error);
                first_error.get_or_insert(CatalogError::Navigation {
                    target: "scope worker".to_string(),
                    message: join_error.to_string(),
                });
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => {
            stats.sort_by_key(|s| s.scope);
            Ok(stats)
        }
    }
}
