//! Client side of the Lobianco site: the remote procedure client, the public
//! pages, the admin panel and the access gate, as UI-agnostic state.

pub mod admin;
pub mod api;
pub mod carousel;
pub mod gate;
pub mod home;
pub mod http;
pub mod local;
pub mod notify;

pub use api::{ClientError, ClientResult, ContentApi};
pub use carousel::{Carousel, CarouselRotator};
pub use gate::{AccessGate, GateState};
pub use home::{HomePage, ListingSection, PropertyCatalogue, SocialLinks};
pub use http::HttpContentApi;
pub use local::LocalContentApi;
pub use notify::{Notifications, Toast, ToastKind};
