//! Create and partial-update payloads for every content table.
//!
//! Update payloads only touch supplied fields. Nullable columns use
//! `Option<Option<T>>`: an absent key leaves the column alone, an explicit
//! `null` clears it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::model::{Features, InvestmentKind, Role};
use super::validate::{
    non_negative, require_text, require_text_if_set, validate_font_size, validate_hex_color,
    Validate, ValidationError,
};

/// Keeps `null` distinct from an absent key.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ---------------------------------------------------------------------------
// Carousel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewSlide {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "imagemUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Validate for NewSlide {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("titulo", &self.title)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlidePatch {
    #[serde(rename = "titulo", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        rename = "descricao",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(
        rename = "imagemUrl",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_url: Option<Option<String>>,
}

impl Validate for SlidePatch {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text_if_set("titulo", self.title.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Shared property attributes
// ---------------------------------------------------------------------------

/// Partial update of [`Features`]. Not a wire type: investments and
/// properties carry these keys inline in their own payloads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeaturesPatch {
    pub area_mt2: Option<Option<i32>>,
    pub bedrooms: Option<Option<i32>>,
    pub bathrooms: Option<Option<i32>>,
    pub suites: Option<Option<i32>>,
    pub garage: Option<Option<i32>>,
    pub pool: Option<bool>,
    pub gym: Option<bool>,
    pub bbq: Option<bool>,
    pub condominium: Option<Option<i64>>,
    pub iptu: Option<Option<i64>>,
    pub price: Option<Option<i64>>,
}

impl FeaturesPatch {
    pub fn apply(&self, features: &mut Features) {
        set_nullable(&mut features.area_mt2, &self.area_mt2);
        set_nullable(&mut features.bedrooms, &self.bedrooms);
        set_nullable(&mut features.bathrooms, &self.bathrooms);
        set_nullable(&mut features.suites, &self.suites);
        set_nullable(&mut features.garage, &self.garage);
        if let Some(pool) = self.pool {
            features.pool = pool;
        }
        if let Some(gym) = self.gym {
            features.gym = gym;
        }
        if let Some(bbq) = self.bbq {
            features.bbq = bbq;
        }
        set_nullable(&mut features.condominium, &self.condominium);
        set_nullable(&mut features.iptu, &self.iptu);
        set_nullable(&mut features.price, &self.price);
    }
}

impl Validate for Features {
    fn validate(&self) -> Result<(), ValidationError> {
        non_negative("areaMt2", self.area_mt2)?;
        non_negative("bedrooms", self.bedrooms)?;
        non_negative("bathrooms", self.bathrooms)?;
        non_negative("suites", self.suites)?;
        non_negative("garage", self.garage)?;
        non_negative("condominium", self.condominium)?;
        non_negative("iptu", self.iptu)?;
        non_negative("price", self.price)
    }
}

impl Validate for FeaturesPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        non_negative("areaMt2", self.area_mt2.flatten())?;
        non_negative("bedrooms", self.bedrooms.flatten())?;
        non_negative("bathrooms", self.bathrooms.flatten())?;
        non_negative("suites", self.suites.flatten())?;
        non_negative("garage", self.garage.flatten())?;
        non_negative("condominium", self.condominium.flatten())?;
        non_negative("iptu", self.iptu.flatten())?;
        non_negative("price", self.price.flatten())
    }
}

/// Overlay a nullable patch value onto a field.
pub fn set_nullable<T: Clone>(field: &mut Option<T>, patch: &Option<Option<T>>) {
    if let Some(value) = patch {
        *field = value.clone();
    }
}

// ---------------------------------------------------------------------------
// Investments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewInvestment {
    #[serde(rename = "tipo")]
    pub kind: InvestmentKind,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "imagemUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "endereco", default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_mt2: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suites: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub garage: Option<i32>,
    #[serde(default)]
    pub pool: bool,
    #[serde(default)]
    pub gym: bool,
    #[serde(default)]
    pub bbq: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condominium: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iptu: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
}

impl NewInvestment {
    /// A listing with only the required fields set.
    pub fn new(kind: InvestmentKind, title: impl Into<String>) -> Self {
        Self::from_parts(kind, title.into(), None, None, None, Features::default())
    }

    pub fn from_parts(
        kind: InvestmentKind,
        title: String,
        description: Option<String>,
        image_url: Option<String>,
        address: Option<String>,
        features: Features,
    ) -> Self {
        Self {
            kind,
            title,
            description,
            image_url,
            address,
            area_mt2: features.area_mt2,
            bedrooms: features.bedrooms,
            bathrooms: features.bathrooms,
            suites: features.suites,
            garage: features.garage,
            pool: features.pool,
            gym: features.gym,
            bbq: features.bbq,
            condominium: features.condominium,
            iptu: features.iptu,
            price: features.price,
        }
    }

    pub fn features(&self) -> Features {
        Features {
            area_mt2: self.area_mt2,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            suites: self.suites,
            garage: self.garage,
            pool: self.pool,
            gym: self.gym,
            bbq: self.bbq,
            condominium: self.condominium,
            iptu: self.iptu,
            price: self.price,
        }
    }
}

impl Validate for NewInvestment {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("titulo", &self.title)?;
        self.features().validate()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InvestmentPatch {
    #[serde(rename = "tipo", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<InvestmentKind>,
    #[serde(rename = "titulo", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        rename = "descricao",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(
        rename = "imagemUrl",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_url: Option<Option<String>>,
    #[serde(
        rename = "endereco",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub area_mt2: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub suites: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub garage: Option<Option<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gym: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbq: Option<bool>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub condominium: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub iptu: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub price: Option<Option<i64>>,
}

impl InvestmentPatch {
    pub fn features(&self) -> FeaturesPatch {
        FeaturesPatch {
            area_mt2: self.area_mt2,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            suites: self.suites,
            garage: self.garage,
            pool: self.pool,
            gym: self.gym,
            bbq: self.bbq,
            condominium: self.condominium,
            iptu: self.iptu,
            price: self.price,
        }
    }

    /// A patch that overwrites every attribute with the given full set.
    pub fn set_features(&mut self, features: &Features) {
        self.area_mt2 = Some(features.area_mt2);
        self.bedrooms = Some(features.bedrooms);
        self.bathrooms = Some(features.bathrooms);
        self.suites = Some(features.suites);
        self.garage = Some(features.garage);
        self.pool = Some(features.pool);
        self.gym = Some(features.gym);
        self.bbq = Some(features.bbq);
        self.condominium = Some(features.condominium);
        self.iptu = Some(features.iptu);
        self.price = Some(features.price);
    }
}

impl Validate for InvestmentPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text_if_set("titulo", self.title.as_deref())?;
        self.features().validate()
    }
}

/// Query string of `investments.list`.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InvestmentFilter {
    #[serde(rename = "tipo", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<InvestmentKind>,
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewProperty {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_mt2: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suites: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub garage: Option<i32>,
    #[serde(default)]
    pub pool: bool,
    #[serde(default)]
    pub gym: bool,
    #[serde(default)]
    pub bbq: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condominium: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iptu: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
}

impl NewProperty {
    pub fn from_parts(
        title: String,
        description: Option<String>,
        location: String,
        main_image: Option<String>,
        features: Features,
    ) -> Self {
        Self {
            title,
            description,
            location,
            main_image,
            area_mt2: features.area_mt2,
            bedrooms: features.bedrooms,
            bathrooms: features.bathrooms,
            suites: features.suites,
            garage: features.garage,
            pool: features.pool,
            gym: features.gym,
            bbq: features.bbq,
            condominium: features.condominium,
            iptu: features.iptu,
            price: features.price,
        }
    }

    pub fn features(&self) -> Features {
        Features {
            area_mt2: self.area_mt2,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            suites: self.suites,
            garage: self.garage,
            pool: self.pool,
            gym: self.gym,
            bbq: self.bbq,
            condominium: self.condominium,
            iptu: self.iptu,
            price: self.price,
        }
    }
}

impl Validate for NewProperty {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        require_text("location", &self.location)?;
        self.features().validate()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PropertyPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub main_image: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub area_mt2: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub suites: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub garage: Option<Option<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gym: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbq: Option<bool>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub condominium: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub iptu: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub price: Option<Option<i64>>,
}

impl PropertyPatch {
    pub fn features(&self) -> FeaturesPatch {
        FeaturesPatch {
            area_mt2: self.area_mt2,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            suites: self.suites,
            garage: self.garage,
            pool: self.pool,
            gym: self.gym,
            bbq: self.bbq,
            condominium: self.condominium,
            iptu: self.iptu,
            price: self.price,
        }
    }

    pub fn set_features(&mut self, features: &Features) {
        self.area_mt2 = Some(features.area_mt2);
        self.bedrooms = Some(features.bedrooms);
        self.bathrooms = Some(features.bathrooms);
        self.suites = Some(features.suites);
        self.garage = Some(features.garage);
        self.pool = Some(features.pool);
        self.gym = Some(features.gym);
        self.bbq = Some(features.bbq);
        self.condominium = Some(features.condominium);
        self.iptu = Some(features.iptu);
        self.price = Some(features.price);
    }
}

impl Validate for PropertyPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text_if_set("title", self.title.as_deref())?;
        require_text_if_set("location", self.location.as_deref())?;
        self.features().validate()
    }
}

// ---------------------------------------------------------------------------
// Singletons
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigPatch {
    #[serde(
        rename = "quemSomos",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub about: Option<Option<String>>,
    #[serde(rename = "corPrimaria", default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(rename = "tamanho", default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<i32>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<Option<String>>,
}

impl Validate for ConfigPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(color) = &self.primary_color {
            validate_hex_color(color)?;
        }
        if let Some(size) = self.font_size {
            validate_font_size(size)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsPatch {
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub facebook: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub instagram: Option<Option<String>>,
}

impl Validate for SettingsPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Sign-in record for an external identity. `None` fields are left alone on
/// an existing user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserUpsert {
    pub open_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub login_method: Option<String>,
    pub role: Option<Role>,
    pub last_signed_in: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_fields_are_rejected() {
        let err = serde_json::from_str::<NewSlide>(r#"{"titulo":"A","botaoTexto":"Ver"}"#);
        assert!(err.is_err());
        let err = serde_json::from_str::<SettingsPatch>(r#"{"twitter":"x"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn mistyped_fields_are_rejected() {
        assert!(serde_json::from_str::<NewInvestment>(r#"{"tipo":"aluguel","titulo":1}"#).is_err());
        assert!(serde_json::from_str::<NewInvestment>(r#"{"tipo":"venda","titulo":"X"}"#).is_err());
        assert!(serde_json::from_str::<PropertyPatch>(r#"{"bedrooms":"two"}"#).is_err());
    }

    #[test]
    fn null_is_distinct_from_absent() {
        let patch: SlidePatch = serde_json::from_str(r#"{"descricao":null}"#).unwrap();
        assert_eq!(patch.description, Some(None));
        assert_eq!(patch.image_url, None);
        assert_eq!(patch.title, None);

        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "descricao": null }));
    }

    #[test]
    fn investment_payload_uses_wire_names() {
        let input: NewInvestment = serde_json::from_str(
            r#"{"tipo":"aluguel","titulo":"Casa X","areaMt2":120,"pool":true,"price":350000}"#,
        )
        .unwrap();
        assert_eq!(input.kind, InvestmentKind::Aluguel);
        assert_eq!(input.features().area_mt2, Some(120));
        assert!(input.features().pool);
        assert!(!input.features().gym);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn features_patch_applies_only_supplied_fields() {
        let mut features = Features {
            bedrooms: Some(3),
            price: Some(100),
            pool: true,
            ..Features::default()
        };
        let patch = FeaturesPatch {
            bedrooms: Some(Some(4)),
            price: Some(None),
            ..FeaturesPatch::default()
        };
        patch.apply(&mut features);
        assert_eq!(features.bedrooms, Some(4));
        assert_eq!(features.price, None);
        assert!(features.pool);
    }

    #[test]
    fn validation_rejects_blank_titles_and_negative_numbers() {
        let slide = NewSlide {
            title: " ".to_string(),
            ..NewSlide::default()
        };
        assert_eq!(slide.validate(), Err(ValidationError::Empty("titulo")));

        let mut property = NewProperty {
            title: "Apto".to_string(),
            location: "Centro".to_string(),
            ..NewProperty::default()
        };
        assert!(property.validate().is_ok());
        property.garage = Some(-1);
        assert_eq!(property.validate(), Err(ValidationError::Negative("garage")));

        let patch = ConfigPatch {
            primary_color: Some("blue".to_string()),
            ..ConfigPatch::default()
        };
        assert!(patch.validate().is_err());
    }
}
