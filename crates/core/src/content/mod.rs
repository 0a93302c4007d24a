pub mod input;
pub mod model;
pub mod validate;

pub use input::{
    ConfigPatch, FeaturesPatch, InvestmentFilter, InvestmentPatch, NewInvestment, NewProperty,
    NewSlide, PropertyPatch, SettingsPatch, SlidePatch, UserUpsert,
};
pub use model::{
    CarouselSlide, Features, Investment, InvestmentKind, Property, Role, SiteConfig, SiteSettings,
    User, DEFAULT_ABOUT, DEFAULT_FONT_SIZE, DEFAULT_PRIMARY_COLOR,
};
pub use validate::{Validate, ValidationError};
