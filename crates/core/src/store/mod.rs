//! Content Store: one row collection per content table.
//!
//! [`ContentStore`] is the seam between the procedure layer and persistence.
//! [`PgStore`] is the production backend; [`MemoryStore`] backs tests and
//! database-less development.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::content::{
    CarouselSlide, ConfigPatch, Investment, InvestmentKind, InvestmentPatch, NewInvestment,
    NewProperty, NewSlide, Property, PropertyPatch, SettingsPatch, SiteConfig, SiteSettings,
    SlidePatch, User, UserUpsert,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors raised by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Row-level operations for every content table.
///
/// `update_*` returns `None` when the id does not exist. `delete_*` returns
/// whether a row was removed. Singleton upserts update the existing row or
/// insert one when the table is empty.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Cheap connectivity check.
    async fn ping(&self) -> StoreResult<()>;

    async fn list_slides(&self) -> StoreResult<Vec<CarouselSlide>>;
    async fn create_slide(&self, input: &NewSlide) -> StoreResult<CarouselSlide>;
    async fn update_slide(&self, id: i64, patch: &SlidePatch) -> StoreResult<Option<CarouselSlide>>;
    async fn delete_slide(&self, id: i64) -> StoreResult<bool>;

    async fn list_investments(&self, kind: Option<InvestmentKind>) -> StoreResult<Vec<Investment>>;
    async fn create_investment(&self, input: &NewInvestment) -> StoreResult<Investment>;
    async fn update_investment(
        &self,
        id: i64,
        patch: &InvestmentPatch,
    ) -> StoreResult<Option<Investment>>;
    async fn delete_investment(&self, id: i64) -> StoreResult<bool>;

    async fn list_properties(&self) -> StoreResult<Vec<Property>>;
    async fn get_property(&self, id: i64) -> StoreResult<Option<Property>>;
    async fn create_property(&self, input: &NewProperty) -> StoreResult<Property>;
    async fn update_property(&self, id: i64, patch: &PropertyPatch) -> StoreResult<Option<Property>>;
    async fn delete_property(&self, id: i64) -> StoreResult<bool>;

    async fn get_config(&self) -> StoreResult<Option<SiteConfig>>;
    async fn upsert_config(&self, patch: &ConfigPatch) -> StoreResult<SiteConfig>;

    async fn get_settings(&self) -> StoreResult<Option<SiteSettings>>;
    async fn upsert_settings(&self, patch: &SettingsPatch) -> StoreResult<SiteSettings>;

    async fn get_user_by_open_id(&self, open_id: &str) -> StoreResult<Option<User>>;
    async fn upsert_user(&self, input: &UserUpsert) -> StoreResult<User>;
}
