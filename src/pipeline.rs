//! Sequential per-entity processing and the run tally.
use crate::drive::{extract_folder_id, RemoteFileStore};
use crate::entity::Entity;
use crate::model::{ContentRecord, LedgerEntry, RecordType, RemoteFile};
use crate::optimize::ImageOptimizer;
use crate::publisher::{self, PublishOutcome};
use crate::reconcile::{self, SyncReport};
use crate::store::{self, Pool};
use crate::summary::{self, FestivalMetadata};
use crate::template::{self, StyleConfig, TemplateData};
use crate::upsert;
use crate::wordpress::ContentBackend;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

/// Failures that stop one entity. The run moves on to the next one.
#[derive(Debug, Error)]
pub enum EntityError {
    #[error("failed to create workspace {path}: {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unrecognised drive link: {0}")]
    DriveLink(String),
    #[error("drive sync failed: {0:#}")]
    Drive(anyhow::Error),
    #[error("media publish failed: {0:#}")]
    Publish(anyhow::Error),
    #[error("post upsert failed: {0:#}")]
    Upsert(anyhow::Error),
    #[error("document export failed: {0:#}")]
    Document(anyhow::Error),
}

/// What one entity's pass produced.
#[derive(Debug, Clone)]
pub struct EntityOutcome {
    pub entity_id: String,
    pub sync: Option<SyncReport>,
    pub publish: PublishOutcome,
    pub record: ContentRecord,
    pub template: TemplateData,
    pub document: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Entity id and error message of each failure.
    pub failures: Vec<(String, String)>,
}

/// Collaborators and settings shared by every entity of a run.
pub struct Pipeline<'a> {
    pub pool: &'a Pool,
    pub drive: &'a dyn RemoteFileStore,
    pub backend: &'a dyn ContentBackend,
    pub optimizer: &'a dyn ImageOptimizer,
    pub films_dir: PathBuf,
    /// Edition year; empty when the run is not filtered by year.
    pub year: String,
    pub style: StyleConfig,
    pub festival: Option<FestivalMetadata>,
}

impl<'a> Pipeline<'a> {
    /// Process entities one after another. A failed entity is logged and
    /// counted.
    pub async fn run(&self, entities: &[Entity]) -> RunReport {
        let mut report = RunReport::default();
        for (index, entity) in entities.iter().enumerate() {
            report.processed += 1;
            let entity_id = entity.id();
            info!(index = index + 1, total = entities.len(), %entity_id, "processing entity");
            match self.process_entity(entity).await {
                Ok(outcome) => {
                    report.succeeded += 1;
                    info!(
                        %entity_id,
                        post_id = outcome.record.post_id,
                        media = outcome.publish.media_ids.len(),
                        "entity processed"
                    );
                }
                Err(err) => {
                    report.failed += 1;
                    error!(%entity_id, error = %err, "entity failed");
                    report.failures.push((entity_id, err.to_string()));
                }
            }
        }
        info!(
            processed = report.processed,
            succeeded = report.succeeded,
            failed = report.failed,
            "run finished"
        );
        report
    }

    #[instrument(skip_all, fields(entity_id = %entity.id()))]
    pub async fn process_entity(&self, entity: &Entity) -> Result<EntityOutcome, EntityError> {
        let film = entity.film();
        let entity_id = entity.id();
        let entity_dir = self.films_dir.join(&entity_id);
        tokio::fs::create_dir_all(&entity_dir)
            .await
            .map_err(|source| EntityError::Workspace {
                path: entity_dir.clone(),
                source,
            })?;

        let line = summary::summary_line(
            &film.title,
            &film.section,
            &film.director,
            &self.year,
            self.festival.as_ref(),
        );
        if let Err(err) = summary::write_summary(&entity_dir, &line).await {
            warn!(error = %err, "failed to write festival summary");
        }

        let sync = if film.links.is_empty() {
            info!("no drive link; skipping file sync");
            None
        } else {
            let folder_id = extract_folder_id(&film.links)
                .ok_or_else(|| EntityError::DriveLink(film.links.clone()))?;
            let report = reconcile::sync_entity_files(
                self.pool,
                self.drive,
                self.optimizer,
                &entity_id,
                &entity_dir,
                &folder_id,
            )
            .await
            .map_err(EntityError::Drive)?;
            Some(report)
        };

        let publish = publisher::publish(self.pool, self.backend, &entity_id, &film.title, &entity_dir)
            .await
            .map_err(EntityError::Publish)?;
        let media = publisher::describe_media(self.backend, &publish.media_ids).await;

        let record = upsert::upsert(self.pool, self.backend, &entity_id, &film, &self.year, &media)
            .await
            .map_err(EntityError::Upsert)?;

        let ledger: Vec<LedgerEntry> = self.load_or_empty(&entity_id, RecordType::MediaLedger).await;
        let snapshot: Vec<RemoteFile> = self.load_or_empty(&entity_id, RecordType::DriveFiles).await;
        let data = template::build_template_data(&film, &media, &ledger, &snapshot);
        let document = template::write_document(
            self.backend,
            &entity_dir,
            record.post_id,
            &data,
            &self.year,
            &self.style,
            &media,
        )
        .await
        .map_err(EntityError::Document)?;

        Ok(EntityOutcome {
            entity_id,
            sync,
            publish,
            record,
            template: data,
            document,
        })
    }

    async fn load_or_empty<T: DeserializeOwned + Default>(&self, entity_id: &str, kind: RecordType) -> T {
        match store::find_record(self.pool, entity_id, kind).await {
            Ok(Some(value)) => value,
            Ok(None) => T::default(),
            Err(err) => {
                warn!(record_type = kind.as_str(), error = %err, "failed to load record for document");
                T::default()
            }
        }
    }
}
