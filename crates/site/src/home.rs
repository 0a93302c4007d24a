//! Public Display Surface: the home page view model and the property
//! catalogue.
//!
//! Reads never fail the page. A read that errors is logged and replaced by
//! an empty or default value, so a visitor sees "nothing configured" rather
//! than an error screen.

use lobianco_core::content::{
    CarouselSlide, Investment, InvestmentKind, Property, SiteConfig, SiteSettings,
    DEFAULT_FONT_SIZE, DEFAULT_PRIMARY_COLOR,
};

use crate::api::{ClientError, ClientResult, ContentApi};
use crate::carousel::Carousel;

pub use lobianco_core::content::DEFAULT_ABOUT;

/// Placeholder for a listing section with no entries.
pub const EMPTY_SECTION_MESSAGE: &str = "Nenhum imóvel disponível";

/// Placeholder for an empty property catalogue.
pub const EMPTY_CATALOGUE_MESSAGE: &str = "Nenhum imóvel disponível no momento";

fn or_degraded<T: Default>(what: &str, result: ClientResult<T>) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!("could not load {what}, showing defaults: {e}");
        T::default()
    })
}

/// One investment category block on the home page.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingSection {
    pub kind: InvestmentKind,
    pub title: &'static str,
    pub anchor: &'static str,
    pub listings: Vec<Investment>,
}

impl ListingSection {
    fn new(kind: InvestmentKind, listings: Vec<Investment>) -> Self {
        Self {
            kind,
            title: kind.section_title(),
            anchor: kind.anchor(),
            listings,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Text to render in place of the cards, if any.
    pub fn empty_message(&self) -> Option<&'static str> {
        self.is_empty().then_some(EMPTY_SECTION_MESSAGE)
    }
}

/// Social network links, present only when configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocialLinks {
    pub whatsapp: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
}

impl SocialLinks {
    pub fn from_settings(settings: Option<&SiteSettings>) -> Self {
        let Some(settings) = settings else {
            return Self::default();
        };
        Self {
            whatsapp: settings.whatsapp.as_deref().and_then(whatsapp_link),
            facebook: non_blank(settings.facebook.as_deref()),
            instagram: non_blank(settings.instagram.as_deref()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.whatsapp.is_none() && self.facebook.is_none() && self.instagram.is_none()
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// `https://wa.me/<digits>` for a phone number in any notation.
pub fn whatsapp_link(number: &str) -> Option<String> {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    Some(format!("https://wa.me/{digits}"))
}

/// Everything the home page renders.
#[derive(Debug, Clone, PartialEq)]
pub struct HomePage {
    pub slides: Vec<CarouselSlide>,
    pub sections: Vec<ListingSection>,
    pub about: String,
    pub primary_color: String,
    pub font_size: i32,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub social: SocialLinks,
}

impl HomePage {
    /// Fetch all home page content. The four reads run concurrently.
    pub async fn load(api: &dyn ContentApi) -> Self {
        let (slides, investments, config, settings) = tokio::join!(
            api.list_slides(),
            api.list_investments(None),
            api.get_config(),
            api.get_settings(),
        );
        Self::from_parts(
            or_degraded("carousel slides", slides),
            or_degraded("investments", investments),
            or_degraded("site config", config),
            or_degraded("site settings", settings),
        )
    }

    pub fn from_parts(
        slides: Vec<CarouselSlide>,
        investments: Vec<Investment>,
        config: Option<SiteConfig>,
        settings: Option<SiteSettings>,
    ) -> Self {
        let sections = InvestmentKind::ALL
            .into_iter()
            .map(|kind| {
                let listings = investments
                    .iter()
                    .filter(|inv| inv.kind == kind)
                    .cloned()
                    .collect();
                ListingSection::new(kind, listings)
            })
            .collect();

        let social = SocialLinks::from_settings(settings.as_ref());
        let (about, primary_color, font_size, logo_url, banner_url) = match config {
            Some(config) => (
                non_blank(config.about.as_deref()).unwrap_or_else(|| DEFAULT_ABOUT.to_string()),
                config.primary_color,
                config.font_size,
                config.logo_url,
                config.banner_url,
            ),
            None => (
                DEFAULT_ABOUT.to_string(),
                DEFAULT_PRIMARY_COLOR.to_string(),
                DEFAULT_FONT_SIZE,
                None,
                None,
            ),
        };

        Self {
            slides,
            sections,
            about,
            primary_color,
            font_size,
            logo_url,
            banner_url,
            social,
        }
    }

    pub fn section(&self, kind: InvestmentKind) -> Option<&ListingSection> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// A fresh carousel over the loaded slides.
    pub fn carousel(&self) -> Carousel {
        Carousel::new(self.slides.clone())
    }
}

/// The properties page: a list plus one optional open detail view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyCatalogue {
    properties: Vec<Property>,
    selected: Option<Property>,
}

impl PropertyCatalogue {
    pub async fn load(api: &dyn ContentApi) -> Self {
        Self {
            properties: or_degraded("properties", api.list_properties().await),
            selected: None,
        }
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn empty_message(&self) -> Option<&'static str> {
        self.properties.is_empty().then_some(EMPTY_CATALOGUE_MESSAGE)
    }

    pub fn selected(&self) -> Option<&Property> {
        self.selected.as_ref()
    }

    /// Open the detail view, fetching the record fresh from the server.
    pub async fn open(&mut self, api: &dyn ContentApi, id: i64) -> ClientResult<&Property> {
        let property = api.get_property(id).await?;
        Ok(self.selected.insert(property))
    }

    pub fn close(&mut self) {
        self.selected = None;
    }

    /// Re-read the list. A failed read keeps what is already shown.
    pub async fn refresh(&mut self, api: &dyn ContentApi) -> Result<(), ClientError> {
        self.properties = api.list_properties().await?;
        Ok(())
    }
}
