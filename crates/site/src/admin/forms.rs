//! Form drafts for each admin tab and how they map onto remote calls.
//!
//! Drafts hold what the inputs show: free text is a plain `String`, where
//! blank means "no value". Saving an open record sends every field, so the
//! stored row ends up matching the form.

use async_trait::async_trait;
use lobianco_core::content::{
    CarouselSlide, ConfigPatch, Features, Investment, InvestmentKind, InvestmentPatch,
    NewInvestment, NewProperty, NewSlide, Property, PropertyPatch, SettingsPatch, SiteConfig,
    SiteSettings, SlidePatch, Validate, DEFAULT_FONT_SIZE, DEFAULT_PRIMARY_COLOR,
};
use lobianco_core::storage::Bucket;

use super::session::{ImageField, ImageTarget};
use crate::api::{ClientResult, ContentApi};

pub const MSG_REQUIRED: &str = "Preencha os campos obrigatórios";

/// Toast and prompt texts of one tab.
#[derive(Debug, Clone, Copy)]
pub struct Messages {
    pub created: &'static str,
    pub updated: &'static str,
    pub save_failed: &'static str,
    pub deleted: &'static str,
    pub delete_failed: &'static str,
    pub confirm_delete: &'static str,
    pub load_failed: &'static str,
}

fn optional(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// A draft for a table with many rows.
#[async_trait]
pub trait CollectionForm: ImageTarget + Clone + Default + Send + Sync {
    type Record: Clone + Send + Sync;

    const BUCKET: Bucket;
    const MESSAGES: Messages;

    fn id_of(record: &Self::Record) -> i64;
    fn from_record(record: &Self::Record) -> Self;

    /// Client-side checks. The message is shown as-is.
    fn check(&self) -> Result<(), String>;

    async fn list(api: &dyn ContentApi) -> ClientResult<Vec<Self::Record>>;
    async fn create(&self, api: &dyn ContentApi) -> ClientResult<Self::Record>;
    async fn update(&self, api: &dyn ContentApi, id: i64) -> ClientResult<Self::Record>;
    async fn delete(api: &dyn ContentApi, id: i64) -> ClientResult<()>;
}

/// A draft for a single-row table.
#[async_trait]
pub trait SingletonForm: ImageTarget + Clone + Default + Send + Sync {
    type Record: Clone + Send + Sync;

    const BUCKET: Bucket;
    const MSG_SAVED: &'static str;
    const MSG_SAVE_FAILED: &'static str;

    /// The form for the stored row, or the defaults when there is none.
    fn from_record(record: Option<&Self::Record>) -> Self;
    fn check(&self) -> Result<(), String>;

    async fn load(api: &dyn ContentApi) -> ClientResult<Option<Self::Record>>;
    async fn save(&self, api: &dyn ContentApi) -> ClientResult<Self::Record>;
}

// ---------------------------------------------------------------------------
// Carousel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlideDraft {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
}

impl SlideDraft {
    pub fn to_new(&self) -> NewSlide {
        NewSlide {
            title: self.title.trim().to_string(),
            description: optional(&self.description),
            image_url: self.image_url.clone(),
        }
    }

    pub fn to_patch(&self) -> SlidePatch {
        SlidePatch {
            title: Some(self.title.trim().to_string()),
            description: Some(optional(&self.description)),
            image_url: Some(self.image_url.clone()),
        }
    }
}

impl ImageTarget for SlideDraft {
    fn image_fields() -> &'static [ImageField] {
        &[ImageField::Image]
    }

    fn image_url(&self, _: ImageField) -> Option<&str> {
        self.image_url.as_deref()
    }

    fn set_image_url(&mut self, _: ImageField, url: String) {
        self.image_url = Some(url);
    }
}

#[async_trait]
impl CollectionForm for SlideDraft {
    type Record = CarouselSlide;

    const BUCKET: Bucket = Bucket::Carrossel;
    const MESSAGES: Messages = Messages {
        created: "Slide criado!",
        updated: "Slide atualizado!",
        save_failed: "Erro ao salvar slide",
        deleted: "Slide deletado!",
        delete_failed: "Erro ao deletar slide",
        confirm_delete: "Tem certeza que deseja deletar este slide?",
        load_failed: "Erro ao carregar slides",
    };

    fn id_of(record: &CarouselSlide) -> i64 {
        record.id
    }

    fn from_record(record: &CarouselSlide) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone().unwrap_or_default(),
            image_url: record.image_url.clone(),
        }
    }

    fn check(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err(MSG_REQUIRED.to_string());
        }
        Ok(())
    }

    async fn list(api: &dyn ContentApi) -> ClientResult<Vec<CarouselSlide>> {
        api.list_slides().await
    }

    async fn create(&self, api: &dyn ContentApi) -> ClientResult<CarouselSlide> {
        api.create_slide(&self.to_new()).await
    }

    async fn update(&self, api: &dyn ContentApi, id: i64) -> ClientResult<CarouselSlide> {
        api.update_slide(id, &self.to_patch()).await
    }

    async fn delete(api: &dyn ContentApi, id: i64) -> ClientResult<()> {
        api.delete_slide(id).await
    }
}

// ---------------------------------------------------------------------------
// Investments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct InvestmentDraft {
    pub kind: InvestmentKind,
    pub title: String,
    pub description: String,
    pub address: String,
    pub image_url: Option<String>,
    pub features: Features,
}

impl Default for InvestmentDraft {
    fn default() -> Self {
        Self {
            kind: InvestmentKind::Lancamentos,
            title: String::new(),
            description: String::new(),
            address: String::new(),
            image_url: None,
            features: Features::default(),
        }
    }
}

impl InvestmentDraft {
    /// Choices for the category selector, with their labels.
    pub fn kind_options() -> [(InvestmentKind, &'static str); 3] {
        InvestmentKind::ALL.map(|kind| (kind, kind.section_title()))
    }

    pub fn to_new(&self) -> NewInvestment {
        NewInvestment::from_parts(
            self.kind,
            self.title.trim().to_string(),
            optional(&self.description),
            self.image_url.clone(),
            optional(&self.address),
            self.features.clone(),
        )
    }

    pub fn to_patch(&self) -> InvestmentPatch {
        let mut patch = InvestmentPatch {
            kind: Some(self.kind),
            title: Some(self.title.trim().to_string()),
            description: Some(optional(&self.description)),
            image_url: Some(self.image_url.clone()),
            address: Some(optional(&self.address)),
            ..InvestmentPatch::default()
        };
        patch.set_features(&self.features);
        patch
    }
}

impl ImageTarget for InvestmentDraft {
    fn image_fields() -> &'static [ImageField] {
        &[ImageField::Image]
    }

    fn image_url(&self, _: ImageField) -> Option<&str> {
        self.image_url.as_deref()
    }

    fn set_image_url(&mut self, _: ImageField, url: String) {
        self.image_url = Some(url);
    }
}

#[async_trait]
impl CollectionForm for InvestmentDraft {
    type Record = Investment;

    const BUCKET: Bucket = Bucket::Investimentos;
    const MESSAGES: Messages = Messages {
        created: "Investimento criado!",
        updated: "Investimento atualizado!",
        save_failed: "Erro ao salvar investimento",
        deleted: "Investimento deletado!",
        delete_failed: "Erro ao deletar investimento",
        confirm_delete: "Tem certeza que deseja deletar este investimento?",
        load_failed: "Erro ao carregar investimentos",
    };

    fn id_of(record: &Investment) -> i64 {
        record.id
    }

    fn from_record(record: &Investment) -> Self {
        Self {
            kind: record.kind,
            title: record.title.clone(),
            description: record.description.clone().unwrap_or_default(),
            address: record.address.clone().unwrap_or_default(),
            image_url: record.image_url.clone(),
            features: record.features.clone(),
        }
    }

    fn check(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err(MSG_REQUIRED.to_string());
        }
        self.features.validate().map_err(|e| e.to_string())
    }

    async fn list(api: &dyn ContentApi) -> ClientResult<Vec<Investment>> {
        api.list_investments(None).await
    }

    async fn create(&self, api: &dyn ContentApi) -> ClientResult<Investment> {
        api.create_investment(&self.to_new()).await
    }

    async fn update(&self, api: &dyn ContentApi, id: i64) -> ClientResult<Investment> {
        api.update_investment(id, &self.to_patch()).await
    }

    async fn delete(api: &dyn ContentApi, id: i64) -> ClientResult<()> {
        api.delete_investment(id).await
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    pub main_image: Option<String>,
    pub features: Features,
}

impl PropertyDraft {
    pub fn to_new(&self) -> NewProperty {
        NewProperty::from_parts(
            self.title.trim().to_string(),
            optional(&self.description),
            self.location.trim().to_string(),
            self.main_image.clone(),
            self.features.clone(),
        )
    }

    pub fn to_patch(&self) -> PropertyPatch {
        let mut patch = PropertyPatch {
            title: Some(self.title.trim().to_string()),
            description: Some(optional(&self.description)),
            location: Some(self.location.trim().to_string()),
            main_image: Some(self.main_image.clone()),
            ..PropertyPatch::default()
        };
        patch.set_features(&self.features);
        patch
    }
}

impl ImageTarget for PropertyDraft {
    fn image_fields() -> &'static [ImageField] {
        &[ImageField::Image]
    }

    fn image_url(&self, _: ImageField) -> Option<&str> {
        self.main_image.as_deref()
    }

    fn set_image_url(&mut self, _: ImageField, url: String) {
        self.main_image = Some(url);
    }
}

#[async_trait]
impl CollectionForm for PropertyDraft {
    type Record = Property;

    const BUCKET: Bucket = Bucket::Investimentos;
    const MESSAGES: Messages = Messages {
        created: "Imóvel adicionado!",
        updated: "Imóvel atualizado!",
        save_failed: "Erro ao salvar imóvel",
        deleted: "Imóvel excluído!",
        delete_failed: "Erro ao excluir imóvel",
        confirm_delete: "Tem certeza que deseja excluir este imóvel?",
        load_failed: "Erro ao carregar imóveis",
    };

    fn id_of(record: &Property) -> i64 {
        record.id
    }

    fn from_record(record: &Property) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone().unwrap_or_default(),
            location: record.location.clone(),
            main_image: record.main_image.clone(),
            features: record.features.clone(),
        }
    }

    fn check(&self) -> Result<(), String> {
        if self.title.trim().is_empty() || self.location.trim().is_empty() {
            return Err(MSG_REQUIRED.to_string());
        }
        self.features.validate().map_err(|e| e.to_string())
    }

    async fn list(api: &dyn ContentApi) -> ClientResult<Vec<Property>> {
        api.list_properties().await
    }

    async fn create(&self, api: &dyn ContentApi) -> ClientResult<Property> {
        api.create_property(&self.to_new()).await
    }

    async fn update(&self, api: &dyn ContentApi, id: i64) -> ClientResult<Property> {
        api.update_property(id, &self.to_patch()).await
    }

    async fn delete(api: &dyn ContentApi, id: i64) -> ClientResult<()> {
        api.delete_property(id).await
    }
}

// ---------------------------------------------------------------------------
// Config and settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDraft {
    pub about: String,
    pub primary_color: String,
    pub font_size: i32,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
}

impl Default for ConfigDraft {
    fn default() -> Self {
        Self {
            about: String::new(),
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            logo_url: None,
            banner_url: None,
        }
    }
}

impl ConfigDraft {
    pub fn to_patch(&self) -> ConfigPatch {
        ConfigPatch {
            about: Some(optional(&self.about)),
            primary_color: Some(self.primary_color.trim().to_string()),
            font_size: Some(self.font_size),
            logo_url: Some(self.logo_url.clone()),
            banner_url: Some(self.banner_url.clone()),
        }
    }
}

impl ImageTarget for ConfigDraft {
    fn image_fields() -> &'static [ImageField] {
        &[ImageField::Logo, ImageField::Banner]
    }

    fn image_url(&self, field: ImageField) -> Option<&str> {
        match field {
            ImageField::Logo => self.logo_url.as_deref(),
            ImageField::Banner => self.banner_url.as_deref(),
            ImageField::Image => None,
        }
    }

    fn set_image_url(&mut self, field: ImageField, url: String) {
        match field {
            ImageField::Logo => self.logo_url = Some(url),
            ImageField::Banner => self.banner_url = Some(url),
            ImageField::Image => {}
        }
    }
}

#[async_trait]
impl SingletonForm for ConfigDraft {
    type Record = SiteConfig;

    const BUCKET: Bucket = Bucket::Config;
    const MSG_SAVED: &'static str = "Configurações atualizadas!";
    const MSG_SAVE_FAILED: &'static str = "Erro ao atualizar configurações";

    fn from_record(record: Option<&SiteConfig>) -> Self {
        match record {
            Some(config) => Self {
                about: config.about.clone().unwrap_or_default(),
                primary_color: config.primary_color.clone(),
                font_size: config.font_size,
                logo_url: config.logo_url.clone(),
                banner_url: config.banner_url.clone(),
            },
            None => Self::default(),
        }
    }

    fn check(&self) -> Result<(), String> {
        self.to_patch().validate().map_err(|e| e.to_string())
    }

    async fn load(api: &dyn ContentApi) -> ClientResult<Option<SiteConfig>> {
        api.get_config().await
    }

    async fn save(&self, api: &dyn ContentApi) -> ClientResult<SiteConfig> {
        api.update_config(&self.to_patch()).await
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsDraft {
    pub whatsapp: String,
    pub facebook: String,
    pub instagram: String,
}

impl SettingsDraft {
    pub fn to_patch(&self) -> SettingsPatch {
        SettingsPatch {
            whatsapp: Some(optional(&self.whatsapp)),
            facebook: Some(optional(&self.facebook)),
            instagram: Some(optional(&self.instagram)),
        }
    }
}

impl ImageTarget for SettingsDraft {
    fn image_fields() -> &'static [ImageField] {
        &[]
    }

    fn image_url(&self, _: ImageField) -> Option<&str> {
        None
    }

    fn set_image_url(&mut self, _: ImageField, _: String) {}
}

#[async_trait]
impl SingletonForm for SettingsDraft {
    type Record = SiteSettings;

    const BUCKET: Bucket = Bucket::Config;
    const MSG_SAVED: &'static str = "Redes sociais atualizadas!";
    const MSG_SAVE_FAILED: &'static str = "Erro ao atualizar redes sociais";

    fn from_record(record: Option<&SiteSettings>) -> Self {
        let Some(settings) = record else {
            return Self::default();
        };
        Self {
            whatsapp: settings.whatsapp.clone().unwrap_or_default(),
            facebook: settings.facebook.clone().unwrap_or_default(),
            instagram: settings.instagram.clone().unwrap_or_default(),
        }
    }

    fn check(&self) -> Result<(), String> {
        Ok(())
    }

    async fn load(api: &dyn ContentApi) -> ClientResult<Option<SiteSettings>> {
        api.get_settings().await
    }

    async fn save(&self, api: &dyn ContentApi) -> ClientResult<SiteSettings> {
        api.update_settings(&self.to_patch()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_optional_text_is_sent_as_null() {
        let draft = SlideDraft {
            title: "  Futuro Seguro ".to_string(),
            description: "   ".to_string(),
            image_url: None,
        };
        let patch = serde_json::to_value(draft.to_patch()).unwrap();
        assert_eq!(
            patch,
            serde_json::json!({"titulo": "Futuro Seguro", "descricao": null, "imagemUrl": null})
        );
        assert_eq!(draft.to_new().description, None);
    }

    #[test]
    fn required_fields_are_checked_locally() {
        assert_eq!(SlideDraft::default().check(), Err(MSG_REQUIRED.to_string()));
        let draft = PropertyDraft {
            title: "Casa".to_string(),
            ..PropertyDraft::default()
        };
        assert_eq!(draft.check(), Err(MSG_REQUIRED.to_string()));

        let draft = InvestmentDraft {
            title: "Casa X".to_string(),
            features: Features {
                price: Some(-1),
                ..Features::default()
            },
            ..InvestmentDraft::default()
        };
        assert!(draft.check().unwrap_err().contains("price"));
    }

    #[test]
    fn kind_selector_offers_exactly_three_choices() {
        let labels: Vec<_> = InvestmentDraft::kind_options()
            .iter()
            .map(|(_, label)| *label)
            .collect();
        assert_eq!(labels, vec!["Compra", "Compra na Planta", "Aluguel"]);
    }

    #[test]
    fn config_draft_validates_color_and_size() {
        let mut draft = ConfigDraft::default();
        assert!(draft.check().is_ok());
        draft.primary_color = "azul".to_string();
        assert!(draft.check().is_err());
        draft.primary_color = "#00FF00".to_string();
        draft.font_size = 200;
        assert!(draft.check().is_err());
    }

    #[test]
    fn investment_patch_overwrites_every_attribute() {
        let draft = InvestmentDraft {
            kind: InvestmentKind::Aluguel,
            title: "Casa X".to_string(),
            features: Features {
                bedrooms: Some(3),
                ..Features::default()
            },
            ..InvestmentDraft::default()
        };
        let patch = draft.to_patch();
        assert_eq!(patch.kind, Some(InvestmentKind::Aluguel));
        assert_eq!(patch.bedrooms, Some(Some(3)));
        assert_eq!(patch.price, Some(None));
        assert_eq!(patch.pool, Some(false));
    }
}
