//! Admin Management Surface: one tab per table, each with its own edit
//! session. Every call goes through [`ContentApi`], so the server decides
//! whether the caller may write.

pub mod collection;
pub mod forms;
pub mod session;
pub mod singleton;

pub use collection::CollectionTab;
pub use forms::{
    CollectionForm, ConfigDraft, InvestmentDraft, PropertyDraft, SettingsDraft, SingletonForm,
    SlideDraft,
};
pub use session::{EditSession, ImageField, ImageTarget, PendingImage};
pub use singleton::SingletonTab;

use crate::api::ContentApi;
use crate::notify::Notifications;

/// Asks the user a yes/no question before a destructive call.
pub trait Confirm: Send + Sync {
    fn confirm(&self, question: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, question: &str) -> bool {
        self(question)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminTab {
    #[default]
    Carousel,
    Investments,
    Properties,
    Config,
    Settings,
}

impl AdminTab {
    pub const ALL: [AdminTab; 5] = [
        AdminTab::Carousel,
        AdminTab::Investments,
        AdminTab::Properties,
        AdminTab::Config,
        AdminTab::Settings,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AdminTab::Carousel => "Carrossel",
            AdminTab::Investments => "Investimentos",
            AdminTab::Properties => "Imóveis",
            AdminTab::Config => "Configurações",
            AdminTab::Settings => "Redes Sociais",
        }
    }
}

/// All admin tabs plus the one on screen.
#[derive(Default)]
pub struct AdminPanel {
    pub active: AdminTab,
    pub carousel: CollectionTab<SlideDraft>,
    pub investments: CollectionTab<InvestmentDraft>,
    pub properties: CollectionTab<PropertyDraft>,
    pub config: SingletonTab<ConfigDraft>,
    pub settings: SingletonTab<SettingsDraft>,
}

impl AdminPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every tab. Returns `false` if any read failed; each failure has
    /// already been reported as a toast.
    pub async fn load(&mut self, api: &dyn ContentApi, toasts: &Notifications) -> bool {
        let carousel = self.carousel.refresh(api, toasts).await;
        let investments = self.investments.refresh(api, toasts).await;
        let properties = self.properties.refresh(api, toasts).await;
        let config = self.config.refresh(api, toasts).await;
        let settings = self.settings.refresh(api, toasts).await;
        carousel && investments && properties && config && settings
    }

    /// Switch tabs. Unsaved edits on the tab being left are kept.
    pub fn select(&mut self, tab: AdminTab) {
        self.active = tab;
    }
}

#[cfg(test)]
mod tests {
    use lobianco_core::seed::seed_demo_content;

    use super::*;
    use crate::local::test_support::Fixture;

    #[tokio::test]
    async fn loads_seeded_content_into_every_tab() {
        let fixture = Fixture::new();
        seed_demo_content(fixture.store.as_ref()).await.unwrap();
        let api = fixture.admin().await;
        let toasts = Notifications::default();

        let mut panel = AdminPanel::new();
        assert!(panel.load(&api, &toasts).await);
        assert!(toasts.is_empty());
        assert_eq!(panel.carousel.rows().len(), 3);
        assert_eq!(panel.investments.rows().len(), 3);
        assert!(panel.config.record().is_some());
        assert_eq!(panel.settings.session().draft().whatsapp, "5511999999999");

        panel.select(AdminTab::Settings);
        assert_eq!(panel.active.label(), "Redes Sociais");
    }

    #[test]
    fn closures_answer_confirmations() {
        let deny = |_: &str| false;
        let confirm: &dyn Confirm = &deny;
        assert!(!confirm.confirm("Tem certeza?"));
    }
}
