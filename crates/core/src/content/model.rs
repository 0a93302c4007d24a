use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validate::ValidationError;

/// Default brand color used until an editor picks one.
pub const DEFAULT_PRIMARY_COLOR: &str = "#1E40AF";
/// Default base font size, in pixels.
pub const DEFAULT_FONT_SIZE: i32 = 16;
/// Company blurb used when no "about us" text has been written yet.
pub const DEFAULT_ABOUT: &str = "Lobianco Investimentos é uma empresa especializada em investimentos imobiliários, oferecendo oportunidades de crescimento patrimonial através de projetos imobiliários de qualidade. Com anos de experiência no mercado, garantimos transparência e segurança em cada investimento.";

/// Category tag of an investment listing.
///
/// Serialized as `lancamentos`, `na_planta` or `aluguel` on the wire and
/// stored as the `investment_kind` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "investment_kind", rename_all = "snake_case")]
pub enum InvestmentKind {
    Lancamentos,
    NaPlanta,
    Aluguel,
}

impl InvestmentKind {
    /// Every kind, in the order sections are shown on the home page.
    pub const ALL: [InvestmentKind; 3] = [
        InvestmentKind::Lancamentos,
        InvestmentKind::NaPlanta,
        InvestmentKind::Aluguel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvestmentKind::Lancamentos => "lancamentos",
            InvestmentKind::NaPlanta => "na_planta",
            InvestmentKind::Aluguel => "aluguel",
        }
    }

    /// Heading of the public section listing this kind.
    pub fn section_title(&self) -> &'static str {
        match self {
            InvestmentKind::Lancamentos => "Compra",
            InvestmentKind::NaPlanta => "Compra na Planta",
            InvestmentKind::Aluguel => "Aluguel",
        }
    }

    /// Anchor id of the public section listing this kind.
    pub fn anchor(&self) -> &'static str {
        match self {
            InvestmentKind::Lancamentos => "compra",
            InvestmentKind::NaPlanta => "compra-planta",
            InvestmentKind::Aluguel => "aluguel",
        }
    }
}

impl fmt::Display for InvestmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvestmentKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lancamentos" => Ok(InvestmentKind::Lancamentos),
            "na_planta" => Ok(InvestmentKind::NaPlanta),
            "aluguel" => Ok(InvestmentKind::Aluguel),
            other => Err(ValidationError::UnknownKind(other.to_string())),
        }
    }
}

/// Permission level of a signed-in identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// An identity known to the site. Created on first sign-in, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub open_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub login_method: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_signed_in: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// One entry of the home page carousel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CarouselSlide {
    pub id: i64,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    #[serde(rename = "imagemUrl")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Property attributes shared by investments and standalone properties.
///
/// Money and area are whole units; amenities are plain flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    pub area_mt2: Option<i32>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub suites: Option<i32>,
    pub garage: Option<i32>,
    #[serde(default)]
    pub pool: bool,
    #[serde(default)]
    pub gym: bool,
    #[serde(default)]
    pub bbq: bool,
    pub condominium: Option<i64>,
    pub iptu: Option<i64>,
    pub price: Option<i64>,
}

impl Features {
    /// Amenity labels that are switched on, in display order.
    pub fn amenities(&self) -> Vec<&'static str> {
        [
            (self.pool, "Piscina"),
            (self.gym, "Academia"),
            (self.bbq, "Churrasqueira"),
        ]
        .into_iter()
        .filter_map(|(on, label)| on.then_some(label))
        .collect()
    }
}

/// A category-tagged investment card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    pub id: i64,
    #[serde(rename = "tipo")]
    pub kind: InvestmentKind,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    #[serde(rename = "imagemUrl")]
    pub image_url: Option<String>,
    #[serde(rename = "endereco")]
    pub address: Option<String>,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub features: Features,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A standalone property with its own detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub main_image: Option<String>,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub features: Features,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Site-wide presentation settings. At most one row exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    pub id: i64,
    #[serde(rename = "quemSomos")]
    pub about: Option<String>,
    #[serde(rename = "corPrimaria")]
    pub primary_color: String,
    #[serde(rename = "tamanho")]
    pub font_size: i32,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Social contact links. At most one row exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub id: i64,
    pub whatsapp: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
