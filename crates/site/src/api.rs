//! The procedure surface as seen from a client.

use async_trait::async_trait;
use lobianco_core::content::{
    CarouselSlide, ConfigPatch, Investment, InvestmentKind, InvestmentPatch, NewInvestment,
    NewProperty, NewSlide, Property, PropertyPatch, SettingsPatch, SiteConfig, SiteSettings,
    SlidePatch, User, ValidationError,
};
use lobianco_core::storage::{StoredObject, UploadRequest};
use lobianco_core::ServiceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },
}

pub type ClientResult<T> = Result<T, ClientError>;

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        ClientError::Validation(err.to_string())
    }
}

impl From<ServiceError> for ClientError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::Validation(_) => ClientError::Validation(message),
            ServiceError::Unauthorized | ServiceError::Auth(_) => ClientError::Unauthorized(message),
            ServiceError::Forbidden => ClientError::Forbidden(message),
            ServiceError::NotFound(_) => ClientError::NotFound(message),
            ServiceError::StoreUnavailable => ClientError::Unavailable(message),
            _ => ClientError::Server {
                status: 500,
                message,
            },
        }
    }
}

/// One method per remote operation. Reads are public; every mutation needs
/// an admin session.
#[async_trait]
pub trait ContentApi: Send + Sync {
    async fn list_slides(&self) -> ClientResult<Vec<CarouselSlide>>;
    async fn create_slide(&self, input: &NewSlide) -> ClientResult<CarouselSlide>;
    async fn update_slide(&self, id: i64, patch: &SlidePatch) -> ClientResult<CarouselSlide>;
    async fn delete_slide(&self, id: i64) -> ClientResult<()>;

    async fn list_investments(&self, kind: Option<InvestmentKind>) -> ClientResult<Vec<Investment>>;
    async fn create_investment(&self, input: &NewInvestment) -> ClientResult<Investment>;
    async fn update_investment(&self, id: i64, patch: &InvestmentPatch) -> ClientResult<Investment>;
    async fn delete_investment(&self, id: i64) -> ClientResult<()>;

    async fn list_properties(&self) -> ClientResult<Vec<Property>>;
    async fn get_property(&self, id: i64) -> ClientResult<Property>;
    async fn create_property(&self, input: &NewProperty) -> ClientResult<Property>;
    async fn update_property(&self, id: i64, patch: &PropertyPatch) -> ClientResult<Property>;
    async fn delete_property(&self, id: i64) -> ClientResult<()>;

    async fn get_config(&self) -> ClientResult<Option<SiteConfig>>;
    async fn update_config(&self, patch: &ConfigPatch) -> ClientResult<SiteConfig>;

    async fn get_settings(&self) -> ClientResult<Option<SiteSettings>>;
    async fn update_settings(&self, patch: &SettingsPatch) -> ClientResult<SiteSettings>;

    async fn upload_file(&self, request: &UploadRequest) -> ClientResult<StoredObject>;

    /// The signed-in user, if any.
    async fn me(&self) -> ClientResult<Option<User>>;
    /// Exchange the admin password for a session held by this client.
    async fn login(&self, password: &str) -> ClientResult<User>;
    async fn logout(&self) -> ClientResult<()>;
}
