//! Per-scope crawl orchestration
//!
//! A [`ScopeWorker`] owns everything one scope needs: a page session, the
//! completion and failure ledgers, and the category log. Entities move
//! through Pending → Attempting → Completed/Failed; the terminal states
//! are durable across runs via ledger replay, which is the crate's whole
//! recovery mechanism.

use crate::config::{Config, CrawlConfig, SourceConfig};
use crate::hierarchy::{reconstruct, EntityNode, ScopeKey};
use crate::ledger::{CategoryLog, CategoryRecord, Ledger, LedgerEntry};
use crate::markup::{self, Link};
use crate::records::parse_record_table;
use crate::session::{PageSession, SessionFactory};
use crate::{output, CatalogError, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Outcome counts for one scope's run
#[derive(Debug, Clone, Default)]
pub struct ScopeStats {
    pub scope: ScopeKey,

    /// Entities found in the scope's table
    pub entities: usize,

    /// Skipped because a prior run already ledgered them
    pub skipped: usize,

    pub completed: usize,
    pub failed: usize,

    /// Skipped this run due to a structural error (retried next run)
    pub structural_skips: usize,
}

/// Result of a bounded navigation attempt
///
/// On anything but success the session stays with (or died with) the
/// spawned task; the caller must obtain a replacement and never touch
/// the old session again.
enum EnterOutcome<S> {
    Entered(S),
    Abandoned(String),
}

/// Navigates into a link under a hard time limit, transferring session
/// ownership to the spawned task and taking it back only on success
async fn bounded_enter<S>(mut session: S, link: Link, limit: Duration) -> EnterOutcome<S>
where
    S: PageSession + Send + 'static,
{
    let handle = tokio::spawn(async move {
        let result = session.enter(&link).await;
        (session, result)
    });

    match tokio::time::timeout(limit, handle).await {
        Ok(Ok((session, Ok(())))) => EnterOutcome::Entered(session),
        // A failed enter leaves the window stack in an unknown state;
        // the session is dropped along with the task's return value
        Ok(Ok((_, Err(e)))) => EnterOutcome::Abandoned(format!("navigation error: {}", e)),
        Ok(Err(join_error)) => EnterOutcome::Abandoned(format!("navigation task panicked: {}", join_error)),
        // The abandoned task still owns the session and may keep running;
        // dropping the handle detaches it
        Err(_) => EnterOutcome::Abandoned(format!("no response within {:?}", limit)),
    }
}

/// Crawls one scope: fetch the entity table, reconstruct the hierarchy,
/// then process every un-ledgered entity in table order
pub struct ScopeWorker<F: SessionFactory> {
    factory: F,
    scope: ScopeKey,
    program_type: String,
    source: SourceConfig,
    crawl: CrawlConfig,
    data_dir: PathBuf,
    completed: Ledger,
    failed: Ledger,
    categories: CategoryLog,
}

impl<F: SessionFactory> ScopeWorker<F> {
    /// Opens the scope's ledgers and log under the configured data
    /// directory (one file set per scope; workers never share files)
    pub fn new(factory: F, scope: ScopeKey, program_type: &str, config: &Config) -> Result<Self> {
        let data_dir = PathBuf::from(&config.output.data_dir);
        let completed = Ledger::open(data_dir.join(format!("completed-{}.csv", scope)))?;
        let failed = Ledger::open(data_dir.join(format!("failed-{}.csv", scope)))?;
        let categories = CategoryLog::open(data_dir.join(format!("categories-{}.csv", scope)))?;

        Ok(Self {
            factory,
            scope,
            program_type: program_type.to_string(),
            source: config.source.clone(),
            crawl: config.crawl.clone(),
            data_dir,
            completed,
            failed,
            categories,
        })
    }

    /// Runs the scope to completion
    pub async fn run(mut self) -> Result<ScopeStats> {
        let mut session = self.open_queried_session().await?;

        let rows = markup::hierarchy_rows(
            session.current_markup(),
            &self.source.entity_table_id,
            &self.source.entity_row_class,
        )
        .ok_or_else(|| CatalogError::MissingTable {
            id: self.source.entity_table_id.clone(),
        })?;

        let (tree, entities) = reconstruct(&rows, self.scope)?;
        tracing::info!("Scope {}: {} entities in table", self.scope, entities.len());
        for line in tree.dfs_lines() {
            tracing::debug!("hierarchy: {}", line);
        }
        for line in tree.bfs_lines() {
            tracing::debug!("hierarchy: {}", line);
        }
        output::write_hierarchy(&self.data_dir, self.scope, &entities)?;

        let mut stats = ScopeStats {
            scope: self.scope,
            entities: entities.len(),
            ..Default::default()
        };
        let timeout = Duration::from_secs(self.crawl.enter_timeout_secs);

        for entity in &entities {
            let Some(link) = entity.link() else {
                tracing::debug!("Scope {}: '{}' has no link, nothing to enter", self.scope, entity.name);
                continue;
            };

            if self.completed.exists(self.scope, &entity.name)
                || self.failed.exists(self.scope, &entity.name)
            {
                tracing::debug!("Scope {}: '{}' already ledgered, skipping", self.scope, entity.name);
                stats.skipped += 1;
                continue;
            }

            match bounded_enter(session, link, timeout).await {
                EnterOutcome::Entered(mut entered) => {
                    let outcome = self.process_entity(&mut entered, entity).await;
                    // Pair the entity-level enter even when extraction failed
                    let left = entered.leave().await;

                    match outcome {
                        Ok((resolved_address, batch)) => {
                            left?;
                            session = entered;
                            self.categories.append_batch(&batch)?;
                            self.completed.record(&LedgerEntry::new(
                                self.scope,
                                entity.name.clone(),
                                resolved_address,
                            ))?;
                            stats.completed += 1;
                        }
                        Err(e) if e.is_structural() => {
                            left?;
                            session = entered;
                            tracing::warn!(
                                "Scope {}: skipping '{}' (no ledger write): {}",
                                self.scope,
                                entity.name,
                                e
                            );
                            stats.structural_skips += 1;
                        }
                        // A failed category navigation leaves the window
                        // stack in an unknown state; same policy as a
                        // timed-out entity: failure ledger, fresh session
                        Err(e) => {
                            drop(entered);
                            tracing::warn!(
                                "Scope {}: '{}' marked failed: {}; replacing session",
                                self.scope,
                                entity.name,
                                e
                            );
                            self.failed
                                .record(&LedgerEntry::new(self.scope, entity.name.clone(), ""))?;
                            stats.failed += 1;
                            session = self.open_queried_session().await?;
                        }
                    }
                }
                EnterOutcome::Abandoned(reason) => {
                    tracing::warn!(
                        "Scope {}: '{}' marked failed: {}; replacing session",
                        self.scope,
                        entity.name,
                        reason
                    );
                    self.failed
                        .record(&LedgerEntry::new(self.scope, entity.name.clone(), ""))?;
                    stats.failed += 1;
                    session = self.open_queried_session().await?;
                }
            }
        }

        tracing::info!(
            "Scope {} done: {} completed, {} failed, {} skipped, {} structural",
            self.scope,
            stats.completed,
            stats.failed,
            stats.skipped,
            stats.structural_skips
        );
        Ok(stats)
    }

    /// Opens a fresh session and submits the scope query, absorbing
    /// transient form errors with a sleep-refresh-retry cycle
    async fn open_queried_session(&self) -> Result<F::Session> {
        let scope_label = self.scope.to_string();
        let mut session = self.factory.open().await?;

        let mut attempt = 0;
        loop {
            match session.query_scope(&self.program_type, &scope_label).await {
                Ok(()) => return Ok(session),
                Err(CatalogError::FormInteraction { control })
                    if attempt < self.crawl.form_retry_attempts =>
                {
                    attempt += 1;
                    tracing::warn!(
                        "Scope {}: form control '{}' missing, retrying ({}/{})",
                        self.scope,
                        control,
                        attempt,
                        self.crawl.form_retry_attempts
                    );
                    tokio::time::sleep(Duration::from_millis(self.crawl.form_retry_delay_ms)).await;
                    session.refresh().await?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Processes one entered entity: walk its category links in listing
    /// order, extract each record table, and report the discovered batch
    ///
    /// Category navigations are sequential; they share the session's
    /// window stack.
    async fn process_entity(
        &self,
        session: &mut F::Session,
        entity: &EntityNode,
    ) -> Result<(String, Vec<CategoryRecord>)> {
        let resolved_address = session.current_address().to_string();

        let links = markup::table_links(session.current_markup(), &self.source.category_table_id)
            .ok_or_else(|| CatalogError::MissingTable {
                id: self.source.category_table_id.clone(),
            })?;
        let categories: Vec<Link> = links
            .into_iter()
            .filter(|l| !self.source.skip_labels.iter().any(|s| s == &l.name))
            .collect();

        let mut batch = Vec::with_capacity(categories.len());
        for category in categories {
            session.enter(&category).await?;
            let extracted = self.extract_category(session, entity, &category);
            let left = session.leave().await;
            let category_address = extracted?;
            left?;

            batch.push(CategoryRecord {
                scope: self.scope,
                entity_name: entity.name.clone(),
                category_name: category.name,
                resolved_address: category_address,
            });
        }

        Ok((resolved_address, batch))
    }

    /// Parses the current view's record table and writes it out
    ///
    /// The source serves the table under one of several ids; the first
    /// present one wins. An empty table produces no file but the
    /// category still counts toward the entity's batch.
    fn extract_category(
        &self,
        session: &F::Session,
        entity: &EntityNode,
        category: &Link,
    ) -> Result<String> {
        let html = session.current_markup();

        let rows = self
            .source
            .record_table_ids
            .iter()
            .find_map(|id| markup::record_rows(html, id))
            .ok_or_else(|| CatalogError::MissingTable {
                id: self.source.record_table_ids.join("|"),
            })?;

        let records = parse_record_table(&rows)?;
        if records.is_empty() {
            tracing::debug!(
                "Scope {}: '{}' / '{}' has no records, no output file",
                self.scope,
                entity.name,
                category.name
            );
        } else {
            output::write_records(&self.data_dir, self.scope, &entity.name, &category.name, &records)?;
            tracing::info!(
                "Scope {}: '{}' / '{}': {} records",
                self.scope,
                entity.name,
                category.name,
                records.len()
            );
        }

        Ok(session.current_address().to_string())
    }
}
