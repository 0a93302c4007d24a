//! [`ContentApi`] calling a [`ContentService`] in the same process.

use std::sync::Arc;

use async_trait::async_trait;
use lobianco_core::content::{
    CarouselSlide, ConfigPatch, Investment, InvestmentKind, InvestmentPatch, NewInvestment,
    NewProperty, NewSlide, Property, PropertyPatch, SettingsPatch, SiteConfig, SiteSettings,
    SlidePatch, User,
};
use lobianco_core::storage::{StoredObject, UploadRequest};
use lobianco_core::{Caller, ContentService};
use parking_lot::RwLock;

use crate::api::{ClientResult, ContentApi};

/// Talks to the service directly. The session token is resolved on every
/// call, so a role change in the store takes effect immediately.
pub struct LocalContentApi {
    service: Arc<ContentService>,
    token: RwLock<Option<String>>,
}

impl LocalContentApi {
    pub fn new(service: Arc<ContentService>) -> Self {
        Self {
            service,
            token: RwLock::new(None),
        }
    }

    pub fn with_token(self, token: impl Into<String>) -> Self {
        *self.token.write() = Some(token.into());
        self
    }

    async fn caller(&self) -> Caller {
        let token = self.token.read().clone();
        self.service.resolve_session(token.as_deref()).await
    }
}

#[async_trait]
impl ContentApi for LocalContentApi {
    async fn list_slides(&self) -> ClientResult<Vec<CarouselSlide>> {
        Ok(self.service.list_slides().await)
    }

    async fn create_slide(&self, input: &NewSlide) -> ClientResult<CarouselSlide> {
        let caller = self.caller().await;
        Ok(self.service.create_slide(&caller, input.clone()).await?)
    }

    async fn update_slide(&self, id: i64, patch: &SlidePatch) -> ClientResult<CarouselSlide> {
        let caller = self.caller().await;
        Ok(self.service.update_slide(&caller, id, patch.clone()).await?)
    }

    async fn delete_slide(&self, id: i64) -> ClientResult<()> {
        let caller = self.caller().await;
        Ok(self.service.delete_slide(&caller, id).await?)
    }

    async fn list_investments(&self, kind: Option<InvestmentKind>) -> ClientResult<Vec<Investment>> {
        Ok(self.service.list_investments(kind).await)
    }

    async fn create_investment(&self, input: &NewInvestment) -> ClientResult<Investment> {
        let caller = self.caller().await;
        Ok(self.service.create_investment(&caller, input.clone()).await?)
    }

    async fn update_investment(&self, id: i64, patch: &InvestmentPatch) -> ClientResult<Investment> {
        let caller = self.caller().await;
        Ok(self.service.update_investment(&caller, id, patch.clone()).await?)
    }

    async fn delete_investment(&self, id: i64) -> ClientResult<()> {
        let caller = self.caller().await;
        Ok(self.service.delete_investment(&caller, id).await?)
    }

    async fn list_properties(&self) -> ClientResult<Vec<Property>> {
        Ok(self.service.list_properties().await)
    }

    async fn get_property(&self, id: i64) -> ClientResult<Property> {
        Ok(self.service.get_property(id).await?)
    }

    async fn create_property(&self, input: &NewProperty) -> ClientResult<Property> {
        let caller = self.caller().await;
        Ok(self.service.create_property(&caller, input.clone()).await?)
    }

    async fn update_property(&self, id: i64, patch: &PropertyPatch) -> ClientResult<Property> {
        let caller = self.caller().await;
        Ok(self.service.update_property(&caller, id, patch.clone()).await?)
    }

    async fn delete_property(&self, id: i64) -> ClientResult<()> {
        let caller = self.caller().await;
        Ok(self.service.delete_property(&caller, id).await?)
    }

    async fn get_config(&self) -> ClientResult<Option<SiteConfig>> {
        Ok(self.service.get_config().await)
    }

    async fn update_config(&self, patch: &ConfigPatch) -> ClientResult<SiteConfig> {
        let caller = self.caller().await;
        Ok(self.service.update_config(&caller, patch.clone()).await?)
    }

    async fn get_settings(&self) -> ClientResult<Option<SiteSettings>> {
        Ok(self.service.get_settings().await)
    }

    async fn update_settings(&self, patch: &SettingsPatch) -> ClientResult<SiteSettings> {
        let caller = self.caller().await;
        Ok(self.service.update_settings(&caller, patch.clone()).await?)
    }

    async fn upload_file(&self, request: &UploadRequest) -> ClientResult<StoredObject> {
        let caller = self.caller().await;
        Ok(self.service.upload_file(&caller, request.clone()).await?)
    }

    async fn me(&self) -> ClientResult<Option<User>> {
        Ok(self.caller().await.into_user())
    }

    async fn login(&self, password: &str) -> ClientResult<User> {
        let session = self.service.sign_in_with_password(password).await?;
        *self.token.write() = Some(session.token);
        Ok(session.user)
    }

    async fn logout(&self) -> ClientResult<()> {
        *self.token.write() = None;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use lobianco_core::content::{Role, UserUpsert};

    use super::test_support::{Fixture, PASSWORD};
    use super::*;
    use crate::api::ClientError;

    #[tokio::test]
    async fn login_then_logout() {
        let fixture = Fixture::new();
        let api = fixture.anonymous();
        assert_eq!(api.me().await.unwrap(), None);

        assert!(matches!(api.login("nope").await, Err(ClientError::Unauthorized(_))));
        let user = api.login(PASSWORD).await.unwrap();
        assert_eq!(user.role, Role::Admin);
        assert_eq!(api.me().await.unwrap().map(|u| u.open_id), Some("owner".to_string()));

        api.logout().await.unwrap();
        assert_eq!(api.me().await.unwrap(), None);
    }

    #[tokio::test]
    async fn role_is_reread_on_every_call() {
        let fixture = Fixture::new();
        let api = fixture.visitor().await;
        let input = NewSlide {
            title: "A".to_string(),
            ..NewSlide::default()
        };
        assert!(matches!(api.create_slide(&input).await, Err(ClientError::Forbidden(_))));

        fixture
            .service
            .upsert_user(UserUpsert {
                open_id: "visitor".to_string(),
                role: Some(Role::Admin),
                ..UserUpsert::default()
            })
            .await
            .unwrap();
        assert!(api.create_slide(&input).await.is_ok());
    }
}
