use tracing::{Level, event};

use crate::gateway::{MutationGateway, QueryGateway};
use crate::types::form::{QuestionSetForm, RowField, RowId};
use crate::types::question::{QuestionSetId, Visibility};
use crate::validate::{ErrorMap, FieldKey, validate};
use handle_errors::Error;

use super::{Navigation, Notice};

const DEFAULT_GENRE: u32 = 1;

/// Controller of the bulk create/edit screen. Holds the form, the last
/// validation result and the submission lifecycle; the form is discarded
/// with the screen, never persisted.
pub struct FixQuestionScreen {
    set_id: Option<QuestionSetId>,
    form: QuestionSetForm,
    errors: ErrorMap,
    notice: Option<Notice>,
    submitting: bool,
}

impl FixQuestionScreen {
    /// Create flow: one empty seed row, private, first genre.
    pub fn create() -> Self {
        Self::with_set_id(None)
    }

    /// Edit flow: the form stays at its seed until `mount` hydrates it.
    pub fn edit(set_id: QuestionSetId) -> Self {
        Self::with_set_id(Some(set_id))
    }

    fn with_set_id(set_id: Option<QuestionSetId>) -> Self {
        FixQuestionScreen {
            set_id,
            form: QuestionSetForm::new(DEFAULT_GENRE, Visibility::Private),
            errors: ErrorMap::new(),
            notice: None,
            submitting: false,
        }
    }

    pub fn form(&self) -> &QuestionSetForm {
        &self.form
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn notice(&mut self) -> Option<&Notice> {
        if self.notice.as_ref().is_some_and(Notice::is_expired) {
            self.notice = None;
        }
        self.notice.as_ref()
    }

    /// Hydrate the edit flow. When the server says the set cannot be
    /// edited by this user, the screen asks to go back to where the user
    /// came from.
    pub async fn mount(&mut self, queries: &mut QueryGateway) -> Navigation {
        let Some(set_id) = self.set_id else {
            return Navigation::Stay;
        };
        match queries.fetch_for_edit(set_id).await {
            Ok(rows) => {
                self.form.hydrate(&rows);
                Navigation::Stay
            }
            Err(e) if denies_edit(&e) => {
                event!(target: "ecoran_client", Level::ERROR, error = %e, %set_id, "edit access rejected");
                self.notice = Some(Notice::failure(
                    "You do not have permission to edit this question set",
                ));
                Navigation::Back
            }
            Err(e) => {
                event!(target: "ecoran_client", Level::ERROR, error = %e, %set_id, "could not fetch question set");
                self.notice = Some(Notice::failure("Failed to load the question set"));
                Navigation::Stay
            }
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.form.title = title.into();
    }

    pub fn add_row(&mut self) -> RowId {
        self.form.add_row()
    }

    pub fn remove_row(&mut self, id: RowId) {
        if self.form.remove_row(id) {
            self.errors
                .retain(|key, _| !matches!(key, FieldKey::Row(row, _) if *row == id));
        }
    }

    /// Editing a field withdraws its current message; the field is judged
    /// again on the next submission, not live.
    pub fn edit_field(&mut self, id: RowId, field: RowField, value: impl Into<String>) {
        if self.form.edit_field(id, field, value) {
            self.errors.remove(&FieldKey::Row(id, field));
        }
    }

    pub fn set_shared_genre(&mut self, genre_id: u32) {
        self.form.set_shared_genre(genre_id);
    }

    pub fn set_shared_visibility(&mut self, visibility: Visibility) {
        self.form.set_shared_visibility(visibility);
    }

    /// Validate, then create or update. Validation failures keep the user
    /// on the screen with the full error map; so does a failed request,
    /// with the form intact for a retry.
    pub async fn submit(
        &mut self,
        queries: &mut QueryGateway,
        mutations: &MutationGateway,
    ) -> Navigation {
        if self.submitting {
            return Navigation::Stay;
        }
        self.errors = validate(&self.form);
        if !self.errors.is_empty() {
            return Navigation::Stay;
        }

        self.submitting = true;
        let payload = self.form.clone().into_payload(self.set_id);
        let result = match self.set_id {
            Some(_) => mutations.update(queries, &payload).await,
            None => mutations.create(queries, &payload).await,
        };
        self.submitting = false;

        match result {
            Ok(()) => {
                self.notice = Some(Notice::success("Question set saved"));
                Navigation::FixSearch
            }
            Err(e) => {
                event!(target: "ecoran_client", Level::ERROR, error = %e, "could not save question set");
                self.notice = Some(Notice::failure("Failed to save the question set"));
                Navigation::Stay
            }
        }
    }
}

fn denies_edit(error: &Error) -> bool {
    matches!(error.status(), Some(401 | 403 | 500))
}
