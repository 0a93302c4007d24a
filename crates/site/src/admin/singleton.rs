use super::forms::SingletonForm;
use super::session::EditSession;
use crate::api::ContentApi;
use crate::notify::Notifications;

pub const MSG_LOAD_FAILED: &str = "Erro ao carregar configurações";

/// Admin tab over a single-row table. The form always mirrors the stored
/// row, or the defaults while there is none.
pub struct SingletonTab<F: SingletonForm> {
    record: Option<F::Record>,
    session: EditSession<F>,
}

impl<F: SingletonForm> Default for SingletonTab<F> {
    fn default() -> Self {
        Self {
            record: None,
            session: EditSession::default(),
        }
    }
}

impl<F: SingletonForm> SingletonTab<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self) -> Option<&F::Record> {
        self.record.as_ref()
    }

    pub fn session(&self) -> &EditSession<F> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EditSession<F> {
        &mut self.session
    }

    /// Read the row and reset the form to it.
    pub async fn refresh(&mut self, api: &dyn ContentApi, toasts: &Notifications) -> bool {
        match F::load(api).await {
            Ok(record) => {
                self.session.load(F::from_record(record.as_ref()));
                self.record = record;
                true
            }
            Err(e) => {
                tracing::warn!("admin singleton refresh failed: {e}");
                toasts.error(MSG_LOAD_FAILED);
                false
            }
        }
    }

    /// Throw away unsaved changes.
    pub fn reset(&mut self) {
        self.session.load(F::from_record(self.record.as_ref()));
    }

    /// Validate, upload staged images, then upsert the row.
    pub async fn save(&mut self, api: &dyn ContentApi, toasts: &Notifications) -> bool {
        if let Err(message) = self.session.draft().check() {
            toasts.error(message);
            return false;
        }
        if !self.session.upload_images(F::BUCKET, api, toasts).await {
            return false;
        }

        let saved = self.session.draft().save(api).await;
        match saved {
            Ok(record) => {
                toasts.success(F::MSG_SAVED);
                self.session.load(F::from_record(Some(&record)));
                self.record = Some(record);
                true
            }
            Err(e) => {
                tracing::warn!("admin singleton save failed: {e}");
                toasts.error(F::MSG_SAVE_FAILED);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use lobianco_core::content::{DEFAULT_FONT_SIZE, DEFAULT_PRIMARY_COLOR};
    use lobianco_core::store::ContentStore;

    use super::*;
    use crate::admin::forms::{ConfigDraft, SettingsDraft};
    use crate::admin::session::{ImageField, PendingImage};
    use crate::local::test_support::Fixture;

    #[tokio::test]
    async fn empty_store_shows_defaults_and_first_save_inserts() {
        let fixture = Fixture::new();
        let api = fixture.admin().await;
        let toasts = Notifications::default();
        let mut tab = SingletonTab::<ConfigDraft>::new();

        assert!(tab.refresh(&api, &toasts).await);
        assert!(tab.record().is_none());
        assert_eq!(tab.session().draft().primary_color, DEFAULT_PRIMARY_COLOR);
        assert_eq!(tab.session().draft().font_size, DEFAULT_FONT_SIZE);

        tab.session_mut().draft_mut().about = "Quem somos".to_string();
        tab.session_mut()
            .attach_image(ImageField::Logo, PendingImage::new("logo.svg", b"<svg/>".to_vec()));
        assert!(tab.save(&api, &toasts).await);

        let saved = tab.record().cloned().unwrap();
        assert_eq!(saved.about.as_deref(), Some("Quem somos"));
        assert!(saved.logo_url.as_deref().unwrap().contains("/config/"));
        assert_eq!(saved.banner_url, None);
        assert_eq!(tab.session().draft().logo_url, saved.logo_url);

        tab.session_mut().draft_mut().font_size = 20;
        assert!(tab.save(&api, &toasts).await);
        let stored = fixture.store.get_config().await.unwrap().unwrap();
        assert_eq!(stored.font_size, 20);
        assert_eq!(stored.about.as_deref(), Some("Quem somos"));
        assert_eq!(stored.id, saved.id);
        assert_eq!(stored.logo_url, saved.logo_url);
    }

    #[tokio::test]
    async fn invalid_color_never_leaves_the_form() {
        let fixture = Fixture::new();
        let api = fixture.admin().await;
        let toasts = Notifications::default();
        let mut tab = SingletonTab::<ConfigDraft>::new();
        tab.session_mut().draft_mut().primary_color = "vermelho".to_string();

        assert!(!tab.save(&api, &toasts).await);
        assert!(fixture.store.get_config().await.unwrap().is_none());
        assert!(toasts.last().unwrap().message.contains("vermelho"));
    }

    #[tokio::test]
    async fn settings_reset_discards_edits() {
        let fixture = Fixture::new();
        let api = fixture.admin().await;
        let toasts = Notifications::default();
        let mut tab = SingletonTab::<SettingsDraft>::new();

        tab.session_mut().draft_mut().whatsapp = "5511999999999".to_string();
        assert!(tab.save(&api, &toasts).await);
        assert_eq!(toasts.last().unwrap().message, SettingsDraft::MSG_SAVED);

        tab.session_mut().draft_mut().whatsapp = "0".to_string();
        tab.reset();
        assert_eq!(tab.session().draft().whatsapp, "5511999999999");
        assert!(!tab
            .session_mut()
            .attach_image(ImageField::Banner, PendingImage::new("b.png", vec![1])));
    }
}
