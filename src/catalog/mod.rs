//! Catalog persistence boundary.
//!
//! The pipeline reads and writes the external venue/performance catalog only
//! through the four operations on [`CatalogStore`].

pub mod in_memory;
pub mod integrator;
pub mod json_file;

pub use in_memory::InMemoryCatalog;
pub use integrator::CatalogIntegrator;
pub use json_file::JsonFileCatalog;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::common::error::Result;
use crate::common::types::{NewPerformance, Performance, Venue, VenueDescriptor};

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_venue_by_slug(&self, slug: &str) -> Result<Option<Venue>>;

    async fn create_venue(&self, descriptor: &VenueDescriptor, actor_id: &str) -> Result<Venue>;

    /// Looks up a performance by its uniqueness key (title, showing date, venue)
    async fn find_performance(
        &self,
        title: &str,
        date: DateTime<Utc>,
        venue_id: Uuid,
    ) -> Result<Option<Performance>>;

    async fn create_performance(&self, fields: NewPerformance) -> Result<Performance>;
}
