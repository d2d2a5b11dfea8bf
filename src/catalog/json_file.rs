use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::CatalogStore;
use crate::common::error::{Result, ScraperError};
use crate::common::types::{NewPerformance, Performance, Venue, VenueDescriptor};

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogDocument {
    venues: Vec<Venue>,
    performances: Vec<Performance>,
}

/// Catalog kept in a single JSON document on disk.
///
/// The file is re-read on every operation and rewritten after every insert,
/// so separate CLI runs share state and a crash leaves earlier writes intact.
pub struct JsonFileCatalog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<CatalogDocument> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(CatalogDocument::default()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(CatalogDocument::default()),
            Err(e) => Err(ScraperError::Storage(format!(
                "failed to read catalog '{}': {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn save(&self, document: &CatalogDocument) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(document)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for JsonFileCatalog {
    async fn find_venue_by_slug(&self, slug: &str) -> Result<Option<Venue>> {
        let _guard = self.lock.lock().await;
        let document = self.load().await?;
        Ok(document
            .venues
            .into_iter()
            .find(|v| v.descriptor.slug == slug))
    }

    async fn create_venue(&self, descriptor: &VenueDescriptor, actor_id: &str) -> Result<Venue> {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;
        if document.venues.iter().any(|v| v.descriptor.slug == descriptor.slug) {
            return Err(ScraperError::Storage(format!(
                "venue slug '{}' already exists",
                descriptor.slug
            )));
        }

        let venue = Venue {
            id: Uuid::new_v4(),
            descriptor: descriptor.clone(),
            submitted_by: actor_id.to_string(),
            created_at: Utc::now(),
        };
        document.venues.push(venue.clone());
        self.save(&document).await?;

        debug!("Created venue: {} with id {}", venue.descriptor.name, venue.id);
        Ok(venue)
    }

    async fn find_performance(
        &self,
        title: &str,
        date: DateTime<Utc>,
        venue_id: Uuid,
    ) -> Result<Option<Performance>> {
        let _guard = self.lock.lock().await;
        let document = self.load().await?;
        Ok(document
            .performances
            .into_iter()
            .find(|p| p.matches(title, date, venue_id)))
    }

    async fn create_performance(&self, fields: NewPerformance) -> Result<Performance> {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;

        let performance = Performance {
            id: Uuid::new_v4(),
            fields,
            created_at: Utc::now(),
        };
        document.performances.push(performance.clone());
        self.save(&document).await?;

        debug!(
            "Created performance: {} with id {}",
            performance.fields.title, performance.id
        );
        Ok(performance)
    }
}
