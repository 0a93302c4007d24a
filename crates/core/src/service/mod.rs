//! Remote Procedure Layer.
//!
//! [`ContentService`] exposes one operation per content table. Reads are
//! public and degrade to empty results when the store is missing or failing.
//! Every mutation requires an admin [`Caller`], validates its input before
//! touching the store and publishes a [`ChangeEvent`] once it succeeds.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use crate::auth::{AdminPassword, AuthError, SessionKeys, PASSWORD_LOGIN_METHOD};
use crate::content::validate::require_text;
use crate::content::{
    CarouselSlide, ConfigPatch, Investment, InvestmentKind, InvestmentPatch, NewInvestment,
    NewProperty, NewSlide, Property, PropertyPatch, Role, SettingsPatch, SiteConfig, SiteSettings,
    SlidePatch, User, UserUpsert, Validate, ValidationError,
};
use crate::events::{ChangeAction, ChangeEvent, ContentEvent, EventBus, Resource};
use crate::storage::{
    content_type_for, object_key, ObjectStore, StorageError, StoredObject, UploadRequest,
};
use crate::store::{ContentStore, StoreError, StoreResult};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("authentication required")]
    Unauthorized,

    #[error("admin role required")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(String),

    #[error("content store is unavailable")]
    StoreUnavailable,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Who is calling. Built per request from the session, never trusted from
/// the client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Caller {
    user: Option<User>,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(user: User) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn into_user(self) -> Option<User> {
        self.user
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_admin)
    }

    /// The admin user behind this call.
    pub fn require_admin(&self) -> ServiceResult<&User> {
        match &self.user {
            None => Err(ServiceError::Unauthorized),
            Some(user) if user.is_admin() => Ok(user),
            Some(_) => Err(ServiceError::Forbidden),
        }
    }
}

/// A freshly issued session.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

/// Result of a store health probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreHealth {
    Connected,
    NotConfigured,
    Unreachable(String),
}

pub struct ContentService {
    store: Option<Arc<dyn ContentStore>>,
    objects: Option<Arc<dyn ObjectStore>>,
    events: EventBus,
    sessions: SessionKeys,
    owner_open_id: String,
    admin_password: Option<AdminPassword>,
}

impl ContentService {
    /// A service with no backends attached. Reads return empty results and
    /// writes fail until a store is attached.
    pub fn new(events: EventBus, sessions: SessionKeys, owner_open_id: impl Into<String>) -> Self {
        Self {
            store: None,
            objects: None,
            events,
            sessions,
            owner_open_id: owner_open_id.into(),
            admin_password: None,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn ContentStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_object_store(mut self, objects: Arc<dyn ObjectStore>) -> Self {
        self.objects = Some(objects);
        self
    }

    pub fn with_admin_password(mut self, password: AdminPassword) -> Self {
        self.admin_password = Some(password);
        self
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn sessions(&self) -> &SessionKeys {
        &self.sessions
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    pub async fn store_health(&self) -> StoreHealth {
        match &self.store {
            None => StoreHealth::NotConfigured,
            Some(store) => match store.ping().await {
                Ok(()) => StoreHealth::Connected,
                Err(e) => StoreHealth::Unreachable(e.to_string()),
            },
        }
    }

    fn writer(&self) -> ServiceResult<&dyn ContentStore> {
        self.store.as_deref().ok_or(ServiceError::StoreUnavailable)
    }

    fn changed(&self, resource: Resource, action: ChangeAction, id: Option<i64>) {
        let delivered = self
            .events
            .publish(ContentEvent::Changed(ChangeEvent::now(resource, action, id)));
        tracing::debug!(%resource, ?action, ?id, delivered, "change event published");
    }

    // -----------------------------------------------------------------------
    // Carousel
    // -----------------------------------------------------------------------

    pub async fn list_slides(&self) -> Vec<CarouselSlide> {
        match &self.store {
            Some(store) => degrade("carousel.list", store.list_slides().await),
            None => Vec::new(),
        }
    }

    pub async fn create_slide(&self, caller: &Caller, input: NewSlide) -> ServiceResult<CarouselSlide> {
        caller.require_admin()?;
        input.validate()?;
        let slide = self.writer()?.create_slide(&input).await?;
        tracing::info!(id = slide.id, "carousel slide created");
        self.changed(Resource::Carousel, ChangeAction::Created, Some(slide.id));
        Ok(slide)
    }

    pub async fn update_slide(
        &self,
        caller: &Caller,
        id: i64,
        patch: SlidePatch,
    ) -> ServiceResult<CarouselSlide> {
        caller.require_admin()?;
        patch.validate()?;
        let slide = self
            .writer()?
            .update_slide(id, &patch)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("carousel slide {id}")))?;
        tracing::info!(id, "carousel slide updated");
        self.changed(Resource::Carousel, ChangeAction::Updated, Some(id));
        Ok(slide)
    }

    pub async fn delete_slide(&self, caller: &Caller, id: i64) -> ServiceResult<()> {
        caller.require_admin()?;
        if self.writer()?.delete_slide(id).await? {
            tracing::info!(id, "carousel slide deleted");
            self.changed(Resource::Carousel, ChangeAction::Deleted, Some(id));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Investments
    // -----------------------------------------------------------------------

    pub async fn list_investments(&self, kind: Option<InvestmentKind>) -> Vec<Investment> {
        match &self.store {
            Some(store) => degrade("investments.list", store.list_investments(kind).await),
            None => Vec::new(),
        }
    }

    pub async fn create_investment(
        &self,
        caller: &Caller,
        input: NewInvestment,
    ) -> ServiceResult<Investment> {
        caller.require_admin()?;
        input.validate()?;
        let investment = self.writer()?.create_investment(&input).await?;
        tracing::info!(id = investment.id, kind = %investment.kind, "investment created");
        self.changed(Resource::Investments, ChangeAction::Created, Some(investment.id));
        Ok(investment)
    }

    pub async fn update_investment(
        &self,
        caller: &Caller,
        id: i64,
        patch: InvestmentPatch,
    ) -> ServiceResult<Investment> {
        caller.require_admin()?;
        patch.validate()?;
        let investment = self
            .writer()?
            .update_investment(id, &patch)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("investment {id}")))?;
        tracing::info!(id, "investment updated");
        self.changed(Resource::Investments, ChangeAction::Updated, Some(id));
        Ok(investment)
    }

    pub async fn delete_investment(&self, caller: &Caller, id: i64) -> ServiceResult<()> {
        caller.require_admin()?;
        if self.writer()?.delete_investment(id).await? {
            tracing::info!(id, "investment deleted");
            self.changed(Resource::Investments, ChangeAction::Deleted, Some(id));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    pub async fn list_properties(&self) -> Vec<Property> {
        match &self.store {
            Some(store) => degrade("properties.list", store.list_properties().await),
            None => Vec::new(),
        }
    }

    pub async fn get_property(&self, id: i64) -> ServiceResult<Property> {
        let found = match &self.store {
            Some(store) => degrade("properties.getById", store.get_property(id).await),
            None => None,
        };
        found.ok_or_else(|| ServiceError::NotFound(format!("property {id}")))
    }

    pub async fn create_property(&self, caller: &Caller, input: NewProperty) -> ServiceResult<Property> {
        caller.require_admin()?;
        input.validate()?;
        let property = self.writer()?.create_property(&input).await?;
        tracing::info!(id = property.id, "property created");
        self.changed(Resource::Properties, ChangeAction::Created, Some(property.id));
        Ok(property)
    }

    pub async fn update_property(
        &self,
        caller: &Caller,
        id: i64,
        patch: PropertyPatch,
    ) -> ServiceResult<Property> {
        caller.require_admin()?;
        patch.validate()?;
        let property = self
            .writer()?
            .update_property(id, &patch)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("property {id}")))?;
        tracing::info!(id, "property updated");
        self.changed(Resource::Properties, ChangeAction::Updated, Some(id));
        Ok(property)
    }

    pub async fn delete_property(&self, caller: &Caller, id: i64) -> ServiceResult<()> {
        caller.require_admin()?;
        if self.writer()?.delete_property(id).await? {
            tracing::info!(id, "property deleted");
            self.changed(Resource::Properties, ChangeAction::Deleted, Some(id));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Singletons
    // -----------------------------------------------------------------------

    pub async fn get_config(&self) -> Option<SiteConfig> {
        match &self.store {
            Some(store) => degrade("config.get", store.get_config().await),
            None => None,
        }
    }

    pub async fn update_config(&self, caller: &Caller, patch: ConfigPatch) -> ServiceResult<SiteConfig> {
        caller.require_admin()?;
        patch.validate()?;
        let config = self.writer()?.upsert_config(&patch).await?;
        tracing::info!(id = config.id, "site config saved");
        self.changed(Resource::Config, ChangeAction::Updated, None);
        Ok(config)
    }

    pub async fn get_settings(&self) -> Option<SiteSettings> {
        match &self.store {
            Some(store) => degrade("settings.get", store.get_settings().await),
            None => None,
        }
    }

    pub async fn update_settings(
        &self,
        caller: &Caller,
        patch: SettingsPatch,
    ) -> ServiceResult<SiteSettings> {
        caller.require_admin()?;
        patch.validate()?;
        let settings = self.writer()?.upsert_settings(&patch).await?;
        tracing::info!(id = settings.id, "site settings saved");
        self.changed(Resource::Settings, ChangeAction::Updated, None);
        Ok(settings)
    }

    // -----------------------------------------------------------------------
    // Storage
    // -----------------------------------------------------------------------

    /// Decode, name and store an uploaded file. Nothing is written to the
    /// content tables; the caller persists the returned URL.
    pub async fn upload_file(&self, caller: &Caller, request: UploadRequest) -> ServiceResult<StoredObject> {
        caller.require_admin()?;
        require_text("filename", &request.filename)?;
        let bytes = request.decode()?;
        let objects = self.objects.as_deref().ok_or(StorageError::NotConfigured)?;

        let key = object_key(&request.filename, Utc::now().timestamp_millis());
        let content_type = content_type_for(&key);
        let size = bytes.len();
        let stored = objects
            .put(request.bucket, &key, bytes, &content_type)
            .await
            .map_err(|e| {
                tracing::error!(bucket = %request.bucket, %key, "upload failed: {e}");
                e
            })?;

        tracing::info!(bucket = %request.bucket, key = %stored.path, size, "file uploaded");
        self.changed(Resource::Storage, ChangeAction::Uploaded, None);
        Ok(stored)
    }

    // -----------------------------------------------------------------------
    // Users and sessions
    // -----------------------------------------------------------------------

    /// Record a sign-in. The configured owner identity is always admin.
    pub async fn upsert_user(&self, mut input: UserUpsert) -> ServiceResult<User> {
        if input.open_id.trim().is_empty() {
            return Err(ValidationError::Empty("openId").into());
        }
        if input.open_id == self.owner_open_id {
            input.role = Some(Role::Admin);
        }
        if input.last_signed_in.is_none() {
            input.last_signed_in = Some(Utc::now());
        }
        Ok(self.writer()?.upsert_user(&input).await?)
    }

    /// Check the admin password and open a session for the owner identity.
    pub async fn sign_in_with_password(&self, password: &str) -> ServiceResult<Session> {
        let admin = self
            .admin_password
            .clone()
            .ok_or(AuthError::PasswordLoginDisabled)?;
        let password = password.to_owned();
        let verified = tokio::task::spawn_blocking(move || admin.verify(&password))
            .await
            .map_err(|e| ServiceError::Internal(format!("password check panicked: {e}")))?;
        if let Err(e) = verified {
            tracing::warn!("admin sign-in rejected");
            return Err(e.into());
        }

        let user = self
            .upsert_user(UserUpsert {
                open_id: self.owner_open_id.clone(),
                login_method: Some(PASSWORD_LOGIN_METHOD.to_string()),
                ..UserUpsert::default()
            })
            .await?;
        let token = self.sessions.issue(&user)?;
        tracing::info!(open_id = %user.open_id, "admin signed in");
        Ok(Session { user, token })
    }

    /// Resolve a session token to a caller. Anything that does not check
    /// out yields an anonymous caller. The role comes from the store, not
    /// from the token.
    pub async fn resolve_session(&self, token: Option<&str>) -> Caller {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Caller::anonymous();
        };
        let claims = match self.sessions.verify(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!("session rejected: {e}");
                return Caller::anonymous();
            }
        };
        let Some(store) = &self.store else {
            return Caller::anonymous();
        };
        match store.get_user_by_open_id(&claims.sub).await {
            Ok(Some(user)) => Caller::signed_in(user),
            Ok(None) => Caller::anonymous(),
            Err(e) => {
                tracing::warn!("session lookup failed: {e}");
                Caller::anonymous()
            }
        }
    }
}

/// Public reads never fail; a broken store reads as empty.
fn degrade<T: Default>(operation: &'static str, result: StoreResult<T>) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!(operation, "read degraded to empty result: {e}");
        T::default()
    })
}
