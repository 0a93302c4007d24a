use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use super::{ContentStore, StoreResult};
use crate::content::input::set_nullable;
use crate::content::{
    CarouselSlide, ConfigPatch, Investment, InvestmentKind, InvestmentPatch, NewInvestment,
    NewProperty, NewSlide, Property, PropertyPatch, Role, SettingsPatch, SiteConfig, SiteSettings,
    SlidePatch, User, UserUpsert, DEFAULT_FONT_SIZE, DEFAULT_PRIMARY_COLOR,
};

/// Process-local store. Rows live in insertion order, so listing order
/// matches creation order like the `created_at` sort of the SQL backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    last_id: i64,
    slides: Vec<CarouselSlide>,
    investments: Vec<Investment>,
    properties: Vec<Property>,
    config: Vec<SiteConfig>,
    settings: Vec<SiteSettings>,
    users: Vec<User>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of singleton config rows. Only one should ever exist.
    pub fn config_rows(&self) -> usize {
        self.tables.read().config.len()
    }

    pub fn settings_rows(&self) -> usize {
        self.tables.read().settings.len()
    }
}

fn apply_slide(slide: &mut CarouselSlide, patch: &SlidePatch) {
    if let Some(title) = &patch.title {
        slide.title = title.clone();
    }
    set_nullable(&mut slide.description, &patch.description);
    set_nullable(&mut slide.image_url, &patch.image_url);
}

fn apply_investment(investment: &mut Investment, patch: &InvestmentPatch) {
    if let Some(kind) = patch.kind {
        investment.kind = kind;
    }
    if let Some(title) = &patch.title {
        investment.title = title.clone();
    }
    set_nullable(&mut investment.description, &patch.description);
    set_nullable(&mut investment.image_url, &patch.image_url);
    set_nullable(&mut investment.address, &patch.address);
    patch.features().apply(&mut investment.features);
}

fn apply_property(property: &mut Property, patch: &PropertyPatch) {
    if let Some(title) = &patch.title {
        property.title = title.clone();
    }
    set_nullable(&mut property.description, &patch.description);
    if let Some(location) = &patch.location {
        property.location = location.clone();
    }
    set_nullable(&mut property.main_image, &patch.main_image);
    patch.features().apply(&mut property.features);
}

fn apply_config(config: &mut SiteConfig, patch: &ConfigPatch) {
    set_nullable(&mut config.about, &patch.about);
    if let Some(color) = &patch.primary_color {
        config.primary_color = color.clone();
    }
    if let Some(size) = patch.font_size {
        config.font_size = size;
    }
    set_nullable(&mut config.logo_url, &patch.logo_url);
    set_nullable(&mut config.banner_url, &patch.banner_url);
}

fn apply_settings(settings: &mut SiteSettings, patch: &SettingsPatch) {
    set_nullable(&mut settings.whatsapp, &patch.whatsapp);
    set_nullable(&mut settings.facebook, &patch.facebook);
    set_nullable(&mut settings.instagram, &patch.instagram);
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn list_slides(&self) -> StoreResult<Vec<CarouselSlide>> {
        Ok(self.tables.read().slides.clone())
    }

    async fn create_slide(&self, input: &NewSlide) -> StoreResult<CarouselSlide> {
        let mut tables = self.tables.write();
        let now = Utc::now();
        let slide = CarouselSlide {
            id: tables.next_id(),
            title: input.title.clone(),
            description: input.description.clone(),
            image_url: input.image_url.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.slides.push(slide.clone());
        Ok(slide)
    }

    async fn update_slide(&self, id: i64, patch: &SlidePatch) -> StoreResult<Option<CarouselSlide>> {
        let mut tables = self.tables.write();
        Ok(tables.slides.iter_mut().find(|s| s.id == id).map(|slide| {
            apply_slide(slide, patch);
            slide.updated_at = Utc::now();
            slide.clone()
        }))
    }

    async fn delete_slide(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write();
        let before = tables.slides.len();
        tables.slides.retain(|s| s.id != id);
        Ok(tables.slides.len() != before)
    }

    async fn list_investments(&self, kind: Option<InvestmentKind>) -> StoreResult<Vec<Investment>> {
        Ok(self
            .tables
            .read()
            .investments
            .iter()
            .filter(|i| kind.map_or(true, |k| i.kind == k))
            .cloned()
            .collect())
    }

    async fn create_investment(&self, input: &NewInvestment) -> StoreResult<Investment> {
        let mut tables = self.tables.write();
        let now = Utc::now();
        let investment = Investment {
            id: tables.next_id(),
            kind: input.kind,
            title: input.title.clone(),
            description: input.description.clone(),
            image_url: input.image_url.clone(),
            address: input.address.clone(),
            features: input.features(),
            created_at: now,
            updated_at: now,
        };
        tables.investments.push(investment.clone());
        Ok(investment)
    }

    async fn update_investment(
        &self,
        id: i64,
        patch: &InvestmentPatch,
    ) -> StoreResult<Option<Investment>> {
        let mut tables = self.tables.write();
        Ok(tables.investments.iter_mut().find(|i| i.id == id).map(|investment| {
            apply_investment(investment, patch);
            investment.updated_at = Utc::now();
            investment.clone()
        }))
    }

    async fn delete_investment(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write();
        let before = tables.investments.len();
        tables.investments.retain(|i| i.id != id);
        Ok(tables.investments.len() != before)
    }

    async fn list_properties(&self) -> StoreResult<Vec<Property>> {
        Ok(self.tables.read().properties.clone())
    }

    async fn get_property(&self, id: i64) -> StoreResult<Option<Property>> {
        Ok(self.tables.read().properties.iter().find(|p| p.id == id).cloned())
    }

    async fn create_property(&self, input: &NewProperty) -> StoreResult<Property> {
        let mut tables = self.tables.write();
        let now = Utc::now();
        let property = Property {
            id: tables.next_id(),
            title: input.title.clone(),
            description: input.description.clone(),
            location: input.location.clone(),
            main_image: input.main_image.clone(),
            features: input.features(),
            created_at: now,
            updated_at: now,
        };
        tables.properties.push(property.clone());
        Ok(property)
    }

    async fn update_property(&self, id: i64, patch: &PropertyPatch) -> StoreResult<Option<Property>> {
        let mut tables = self.tables.write();
        Ok(tables.properties.iter_mut().find(|p| p.id == id).map(|property| {
            apply_property(property, patch);
            property.updated_at = Utc::now();
            property.clone()
        }))
    }

    async fn delete_property(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write();
        let before = tables.properties.len();
        tables.properties.retain(|p| p.id != id);
        Ok(tables.properties.len() != before)
    }

    async fn get_config(&self) -> StoreResult<Option<SiteConfig>> {
        Ok(self.tables.read().config.first().cloned())
    }

    async fn upsert_config(&self, patch: &ConfigPatch) -> StoreResult<SiteConfig> {
        let mut tables = self.tables.write();
        let now = Utc::now();
        if let Some(config) = tables.config.first_mut() {
            apply_config(config, patch);
            config.updated_at = now;
            return Ok(config.clone());
        }

        let mut config = SiteConfig {
            id: tables.next_id(),
            about: None,
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            logo_url: None,
            banner_url: None,
            created_at: now,
            updated_at: now,
        };
        apply_config(&mut config, patch);
        tables.config.push(config.clone());
        Ok(config)
    }

    async fn get_settings(&self) -> StoreResult<Option<SiteSettings>> {
        Ok(self.tables.read().settings.first().cloned())
    }

    async fn upsert_settings(&self, patch: &SettingsPatch) -> StoreResult<SiteSettings> {
        let mut tables = self.tables.write();
        let now = Utc::now();
        if let Some(settings) = tables.settings.first_mut() {
            apply_settings(settings, patch);
            settings.updated_at = now;
            return Ok(settings.clone());
        }

        let mut settings = SiteSettings {
            id: tables.next_id(),
            whatsapp: None,
            facebook: None,
            instagram: None,
            created_at: now,
            updated_at: now,
        };
        apply_settings(&mut settings, patch);
        tables.settings.push(settings.clone());
        Ok(settings)
    }

    async fn get_user_by_open_id(&self, open_id: &str) -> StoreResult<Option<User>> {
        Ok(self
            .tables
            .read()
            .users
            .iter()
            .find(|u| u.open_id == open_id)
            .cloned())
    }

    async fn upsert_user(&self, input: &UserUpsert) -> StoreResult<User> {
        let mut tables = self.tables.write();
        let now = Utc::now();
        let signed_in = input.last_signed_in.unwrap_or(now);

        if let Some(user) = tables.users.iter_mut().find(|u| u.open_id == input.open_id) {
            if input.name.is_some() {
                user.name = input.name.clone();
            }
            if input.email.is_some() {
                user.email = input.email.clone();
            }
            if input.login_method.is_some() {
                user.login_method = input.login_method.clone();
            }
            if let Some(role) = input.role {
                user.role = role;
            }
            user.last_signed_in = signed_in;
            user.updated_at = now;
            return Ok(user.clone());
        }

        let user = User {
            id: tables.next_id(),
            open_id: input.open_id.clone(),
            name: input.name.clone(),
            email: input.email.clone(),
            login_method: input.login_method.clone(),
            role: input.role.unwrap_or(Role::User),
            created_at: now,
            updated_at: now,
            last_signed_in: signed_in,
        };
        tables.users.push(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn slide_crud_reflects_net_effect() {
        let store = MemoryStore::new();
        let a = store
            .create_slide(&NewSlide {
                title: "A".to_string(),
                description: Some("first".to_string()),
                image_url: None,
            })
            .await
            .unwrap();
        let b = store
            .create_slide(&NewSlide {
                title: "B".to_string(),
                ..NewSlide::default()
            })
            .await
            .unwrap();

        let patch = SlidePatch {
            title: Some("A2".to_string()),
            ..SlidePatch::default()
        };
        let updated = store.update_slide(a.id, &patch).await.unwrap().unwrap();
        assert_eq!(updated.title, "A2");
        assert_eq!(updated.description.as_deref(), Some("first"));
        assert!(updated.updated_at >= a.updated_at);

        assert!(store.delete_slide(b.id).await.unwrap());
        assert!(!store.delete_slide(b.id).await.unwrap());

        let slides = store.list_slides().await.unwrap();
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].id, a.id);
        assert_eq!(slides[0].title, "A2");
    }

    #[tokio::test]
    async fn update_of_missing_row_returns_none() {
        let store = MemoryStore::new();
        let patch = PropertyPatch {
            title: Some("X".to_string()),
            ..PropertyPatch::default()
        };
        assert!(store.update_property(42, &patch).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn investments_filter_by_kind() {
        let store = MemoryStore::new();
        store
            .create_investment(&NewInvestment::new(InvestmentKind::Aluguel, "Casa X"))
            .await
            .unwrap();
        store
            .create_investment(&NewInvestment::new(InvestmentKind::NaPlanta, "Torre"))
            .await
            .unwrap();

        let rentals = store
            .list_investments(Some(InvestmentKind::Aluguel))
            .await
            .unwrap();
        assert_eq!(rentals.len(), 1);
        assert_eq!(rentals[0].title, "Casa X");
        assert_eq!(store.list_investments(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn singleton_upsert_keeps_one_row() {
        let store = MemoryStore::new();
        store
            .upsert_config(&ConfigPatch {
                about: Some(Some("Quem somos".to_string())),
                ..ConfigPatch::default()
            })
            .await
            .unwrap();
        let config = store
            .upsert_config(&ConfigPatch {
                primary_color: Some("#000000".to_string()),
                ..ConfigPatch::default()
            })
            .await
            .unwrap();

        assert_eq!(store.config_rows(), 1);
        assert_eq!(config.about.as_deref(), Some("Quem somos"));
        assert_eq!(config.primary_color, "#000000");
        assert_eq!(config.font_size, DEFAULT_FONT_SIZE);
    }

    #[tokio::test]
    async fn user_upsert_updates_existing_identity() {
        let store = MemoryStore::new();
        let created = store
            .upsert_user(&UserUpsert {
                open_id: "abc".to_string(),
                name: Some("Ana".to_string()),
                ..UserUpsert::default()
            })
            .await
            .unwrap();
        assert_eq!(created.role, Role::User);

        let updated = store
            .upsert_user(&UserUpsert {
                open_id: "abc".to_string(),
                role: Some(Role::Admin),
                ..UserUpsert::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name.as_deref(), Some("Ana"));
        assert!(updated.is_admin());
    }
}
