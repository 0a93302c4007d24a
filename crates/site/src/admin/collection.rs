use lobianco_core::content::{Investment, InvestmentKind};

use super::forms::{CollectionForm, InvestmentDraft};
use super::session::EditSession;
use super::Confirm;
use crate::api::ContentApi;
use crate::notify::Notifications;

/// Shown in the investments tab when a category has no rows.
pub const EMPTY_INVESTMENTS_MESSAGE: &str = "Nenhum investimento cadastrado";

/// Admin tab over a multi-row table: the rows as last read from the server
/// plus the create/edit form.
pub struct CollectionTab<F: CollectionForm> {
    rows: Vec<F::Record>,
    session: EditSession<F>,
}

impl<F: CollectionForm> Default for CollectionTab<F> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            session: EditSession::default(),
        }
    }
}

impl<F: CollectionForm> CollectionTab<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[F::Record] {
        &self.rows
    }

    pub fn session(&self) -> &EditSession<F> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EditSession<F> {
        &mut self.session
    }

    /// Re-read the rows. On failure the old rows stay on screen.
    pub async fn refresh(&mut self, api: &dyn ContentApi, toasts: &Notifications) -> bool {
        match F::list(api).await {
            Ok(rows) => {
                self.rows = rows;
                true
            }
            Err(e) => {
                tracing::warn!("admin list refresh failed: {e}");
                toasts.error(F::MESSAGES.load_failed);
                false
            }
        }
    }

    /// Fill the form from a listed row. Returns `false` for an unknown id.
    pub fn edit(&mut self, id: i64) -> bool {
        let Some(record) = self.rows.iter().find(|r| F::id_of(r) == id) else {
            return false;
        };
        let draft = F::from_record(record);
        self.session.start_edit(id, draft);
        true
    }

    /// Drop the form contents without touching the server.
    pub fn cancel(&mut self) {
        self.session.clear();
    }

    /// Validate, upload staged images, then create or update. On success the
    /// form is reset and the list re-read. On failure the draft is kept.
    pub async fn save(&mut self, api: &dyn ContentApi, toasts: &Notifications) -> bool {
        if let Err(message) = self.session.draft().check() {
            toasts.error(message);
            return false;
        }
        if !self.session.upload_images(F::BUCKET, api, toasts).await {
            return false;
        }

        let draft = self.session.draft();
        let outcome = match self.session.editing_id() {
            Some(id) => draft.update(api, id).await.map(|_| F::MESSAGES.updated),
            None => draft.create(api).await.map(|_| F::MESSAGES.created),
        };
        match outcome {
            Ok(message) => {
                toasts.success(message);
                self.session.clear();
                self.refresh(api, toasts).await;
                true
            }
            Err(e) => {
                tracing::warn!(editing = ?self.session.editing_id(), "admin save failed: {e}");
                toasts.error(F::MESSAGES.save_failed);
                false
            }
        }
    }

    /// Delete a row once the user confirms.
    pub async fn delete(
        &mut self,
        id: i64,
        api: &dyn ContentApi,
        confirm: &dyn Confirm,
        toasts: &Notifications,
    ) -> bool {
        if !confirm.confirm(F::MESSAGES.confirm_delete) {
            return false;
        }
        match F::delete(api, id).await {
            Ok(()) => {
                toasts.success(F::MESSAGES.deleted);
                if self.session.editing_id() == Some(id) {
                    self.session.clear();
                }
                self.refresh(api, toasts).await;
                true
            }
            Err(e) => {
                tracing::warn!(id, "admin delete failed: {e}");
                toasts.error(F::MESSAGES.delete_failed);
                false
            }
        }
    }
}

impl CollectionTab<InvestmentDraft> {
    /// Rows of one category, in list order.
    pub fn by_kind(&self, kind: InvestmentKind) -> Vec<&Investment> {
        self.rows.iter().filter(|inv| inv.kind == kind).collect()
    }

    pub fn empty_message(&self, kind: InvestmentKind) -> Option<&'static str> {
        self.by_kind(kind)
            .is_empty()
            .then_some(EMPTY_INVESTMENTS_MESSAGE)
    }
}

#[cfg(test)]
mod tests {
    use lobianco_core::content::Features;
    use lobianco_core::store::ContentStore;

    use super::*;
    use crate::admin::forms::{PropertyDraft, SlideDraft, MSG_REQUIRED};
    use crate::admin::session::{ImageField, PendingImage, MSG_UPLOAD_FAILED};
    use crate::local::test_support::Fixture;
    use crate::notify::ToastKind;

    fn yes(_: &str) -> bool {
        true
    }

    fn no(_: &str) -> bool {
        false
    }

    #[tokio::test]
    async fn create_edit_delete_round() {
        let fixture = Fixture::new();
        let api = fixture.admin().await;
        let toasts = Notifications::default();
        let mut tab = CollectionTab::<InvestmentDraft>::new();

        {
            let draft = tab.session_mut().draft_mut();
            draft.kind = InvestmentKind::Aluguel;
            draft.title = "Casa X".to_string();
        }
        assert!(tab.save(&api, &toasts).await);
        assert_eq!(toasts.last().unwrap().message, "Investimento criado!");
        assert_eq!(tab.rows().len(), 1);
        assert_eq!(tab.by_kind(InvestmentKind::Aluguel).len(), 1);
        assert_eq!(tab.rows()[0].image_url, None);
        assert_eq!(
            tab.empty_message(InvestmentKind::NaPlanta),
            Some(EMPTY_INVESTMENTS_MESSAGE)
        );
        assert!(!tab.session().is_editing());

        let id = tab.rows()[0].id;
        assert!(tab.edit(id));
        assert_eq!(tab.session().draft().title, "Casa X");
        tab.session_mut().draft_mut().features = Features {
            bedrooms: Some(3),
            ..Features::default()
        };
        assert!(tab.save(&api, &toasts).await);
        assert_eq!(toasts.last().unwrap().message, "Investimento atualizado!");
        assert_eq!(tab.rows().len(), 1);
        assert_eq!(tab.rows()[0].features.bedrooms, Some(3));

        assert!(!tab.delete(id, &api, &no, &toasts).await);
        assert_eq!(fixture.store.list_investments(None).await.unwrap().len(), 1);
        assert!(tab.delete(id, &api, &yes, &toasts).await);
        assert!(tab.rows().is_empty());
        assert_eq!(toasts.last().unwrap().message, "Investimento deletado!");
    }

    #[tokio::test]
    async fn blank_title_is_rejected_before_any_call() {
        let fixture = Fixture::new();
        let api = fixture.admin().await;
        let toasts = Notifications::default();
        let mut tab = CollectionTab::<SlideDraft>::new();
        tab.session_mut()
            .attach_image(ImageField::Image, PendingImage::new("a.png", b"png".to_vec()));

        assert!(!tab.save(&api, &toasts).await);
        assert_eq!(toasts.last().unwrap().message, MSG_REQUIRED);
        assert!(fixture.objects.is_empty());
        assert!(fixture.store.list_slides().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn image_is_uploaded_before_the_record_is_saved() {
        let fixture = Fixture::new();
        let api = fixture.admin().await;
        let toasts = Notifications::default();
        let mut tab = CollectionTab::<SlideDraft>::new();
        tab.session_mut().draft_mut().title = "Futuro Seguro".to_string();
        tab.session_mut()
            .attach_image(ImageField::Image, PendingImage::new("Praia.PNG", b"png".to_vec()));

        assert!(tab.save(&api, &toasts).await);
        let url = tab.rows()[0].image_url.clone().unwrap();
        assert!(url.starts_with("memory://storage/carrossel/"));
        let kinds: Vec<_> = toasts.drain().into_iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![ToastKind::Success, ToastKind::Success]);
    }

    #[tokio::test]
    async fn failed_upload_aborts_the_save() {
        let fixture = Fixture::without_storage();
        let api = fixture.admin().await;
        let toasts = Notifications::default();
        let mut tab = CollectionTab::<PropertyDraft>::new();
        {
            let draft = tab.session_mut().draft_mut();
            draft.title = "Cobertura".to_string();
            draft.location = "Santos".to_string();
        }
        tab.session_mut()
            .attach_image(ImageField::Image, PendingImage::new("c.jpg", b"jpg".to_vec()));

        assert!(!tab.save(&api, &toasts).await);
        assert_eq!(toasts.last().unwrap().message, MSG_UPLOAD_FAILED);
        assert!(fixture.store.list_properties().await.unwrap().is_empty());
        assert_eq!(tab.session().draft().title, "Cobertura");
        assert!(tab.session().has_pending_images());
    }

    #[tokio::test]
    async fn forbidden_save_keeps_the_draft() {
        let fixture = Fixture::new();
        let api = fixture.visitor().await;
        let toasts = Notifications::default();
        let mut tab = CollectionTab::<SlideDraft>::new();
        tab.session_mut().draft_mut().title = "Intruso".to_string();

        assert!(!tab.save(&api, &toasts).await);
        assert_eq!(toasts.last().unwrap().message, "Erro ao salvar slide");
        assert_eq!(tab.session().draft().title, "Intruso");
        assert!(fixture.store.list_slides().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancel_and_unknown_edit_touch_nothing() {
        let fixture = Fixture::new();
        let api = fixture.admin().await;
        let toasts = Notifications::default();
        let mut tab = CollectionTab::<SlideDraft>::new();
        assert!(!tab.edit(42));

        tab.session_mut().draft_mut().title = "Rascunho".to_string();
        tab.cancel();
        assert_eq!(tab.session().draft(), &SlideDraft::default());
        assert!(tab.refresh(&api, &toasts).await);
        assert!(toasts.is_empty());
    }
}
