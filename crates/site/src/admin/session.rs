//! Per-tab edit state: which record is open, the draft being typed, and any
//! image picked but not yet uploaded.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use lobianco_core::storage::{Bucket, UploadRequest};

use crate::api::ContentApi;
use crate::notify::Notifications;

pub const MSG_UPLOAD_OK: &str = "Imagem enviada com sucesso!";
pub const MSG_UPLOAD_FAILED: &str = "Erro ao fazer upload da imagem";

/// Image slots a draft can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageField {
    Image,
    Logo,
    Banner,
}

/// A draft with image URL fields.
pub trait ImageTarget {
    /// Slots this draft accepts.
    fn image_fields() -> &'static [ImageField];
    fn image_url(&self, field: ImageField) -> Option<&str>;
    fn set_image_url(&mut self, field: ImageField, url: String);
}

/// A file chosen in the form, held locally until the draft is saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingImage {
    filename: String,
    bytes: Vec<u8>,
    content_type: String,
}

impl PendingImage {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        let content_type = mime_guess::from_path(&filename)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            filename,
            bytes,
            content_type,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `data:` URL for showing the file before it is uploaded.
    pub fn preview_url(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.bytes))
    }

    pub fn to_upload(&self, bucket: Bucket) -> UploadRequest {
        UploadRequest {
            bucket,
            filename: self.filename.clone(),
            file_base64: STANDARD.encode(&self.bytes),
        }
    }
}

/// At most one record is being edited per tab. `editing_id` is `None` while
/// the form is creating a new record.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession<D> {
    editing_id: Option<i64>,
    draft: D,
    images: Vec<(ImageField, PendingImage)>,
}

impl<D: Default> Default for EditSession<D> {
    fn default() -> Self {
        Self {
            editing_id: None,
            draft: D::default(),
            images: Vec::new(),
        }
    }
}

impl<D: Default + ImageTarget> EditSession<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a record for editing. Replaces whatever was in the form.
    pub fn start_edit(&mut self, id: i64, draft: D) {
        self.editing_id = Some(id);
        self.draft = draft;
        self.images.clear();
    }

    /// Load a draft without marking a record as edited.
    pub fn load(&mut self, draft: D) {
        self.editing_id = None;
        self.draft = draft;
        self.images.clear();
    }

    pub fn editing_id(&self) -> Option<i64> {
        self.editing_id
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id.is_some()
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut D {
        &mut self.draft
    }

    /// Stage a file for `field`, replacing any earlier pick. Returns `false`
    /// when the draft has no such slot.
    pub fn attach_image(&mut self, field: ImageField, image: PendingImage) -> bool {
        if !D::image_fields().contains(&field) {
            return false;
        }
        self.images.retain(|(f, _)| *f != field);
        self.images.push((field, image));
        true
    }

    pub fn pending_image(&self, field: ImageField) -> Option<&PendingImage> {
        self.images
            .iter()
            .find_map(|(f, image)| (*f == field).then_some(image))
    }

    pub fn has_pending_images(&self) -> bool {
        !self.images.is_empty()
    }

    /// What the form shows for `field`: the staged file if any, else the
    /// saved URL.
    pub fn preview(&self, field: ImageField) -> Option<String> {
        match self.pending_image(field) {
            Some(image) => Some(image.preview_url()),
            None => self.draft.image_url(field).map(str::to_string),
        }
    }

    /// Upload every staged file and write the returned URLs into the draft.
    /// Stops at the first failure; the draft and the remaining files are
    /// left in place so the user can retry.
    pub async fn upload_images(
        &mut self,
        bucket: Bucket,
        api: &dyn ContentApi,
        toasts: &Notifications,
    ) -> bool {
        while let Some((field, image)) = self.images.first() {
            match api.upload_file(&image.to_upload(bucket)).await {
                Ok(stored) => {
                    tracing::debug!(%bucket, path = %stored.path, "image uploaded");
                    let field = *field;
                    self.draft.set_image_url(field, stored.url);
                    self.images.remove(0);
                    toasts.success(MSG_UPLOAD_OK);
                }
                Err(e) => {
                    tracing::warn!(%bucket, filename = %image.filename, "image upload failed: {e}");
                    toasts.error(MSG_UPLOAD_FAILED);
                    return false;
                }
            }
        }
        true
    }

    /// Back to an empty create form.
    pub fn clear(&mut self) {
        self.editing_id = None;
        self.draft = D::default();
        self.images.clear();
    }
}
