use super::question::{FetchedQuestion, QuestionPayload, QuestionSetId, SaveQuestionSet, Visibility};

/// Identifier of one editable row. Rows loaded from the server keep their
/// id; rows added locally get a placeholder that exists only to key the row
/// in the list and is stripped from the submitted payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RowId {
    Existing(u64),
    Placeholder(u64),
}

impl RowId {
    pub fn is_new(&self) -> bool {
        matches!(self, RowId::Placeholder(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RowField {
    Question,
    Answer,
    Choices1,
    Choices2,
}

impl RowField {
    pub const ALL: [RowField; 4] = [
        RowField::Question,
        RowField::Answer,
        RowField::Choices1,
        RowField::Choices2,
    ];
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionRow {
    pub id: RowId,
    pub genre_id: u32,
    pub visibility: Visibility,
    pub question: String,
    pub answer: String,
    pub choices1: String,
    pub choices2: String,
}

impl QuestionRow {
    fn empty(id: RowId, genre_id: u32, visibility: Visibility) -> Self {
        QuestionRow {
            id,
            genre_id,
            visibility,
            question: String::new(),
            answer: String::new(),
            choices1: String::new(),
            choices2: String::new(),
        }
    }

    pub fn field(&self, field: RowField) -> &str {
        match field {
            RowField::Question => &self.question,
            RowField::Answer => &self.answer,
            RowField::Choices1 => &self.choices1,
            RowField::Choices2 => &self.choices2,
        }
    }

    fn field_mut(&mut self, field: RowField) -> &mut String {
        match field {
            RowField::Question => &mut self.question,
            RowField::Answer => &mut self.answer,
            RowField::Choices1 => &mut self.choices1,
            RowField::Choices2 => &mut self.choices2,
        }
    }
}

/// The bulk-edit form: a growable list of rows plus title, genre and
/// visibility shared by every row. Genre and visibility cannot diverge per
/// row; changing either re-stamps the whole list.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionSetForm {
    pub title: String,
    genre_id: u32,
    visibility: Visibility,
    rows: Vec<QuestionRow>,
    next_placeholder: u64,
}

impl QuestionSetForm {
    /// A fresh form always starts with one empty row.
    pub fn new(genre_id: u32, visibility: Visibility) -> Self {
        let mut form = QuestionSetForm {
            title: String::new(),
            genre_id,
            visibility,
            rows: Vec::new(),
            next_placeholder: 1,
        };
        form.add_row();
        form
    }

    pub fn genre_id(&self) -> u32 {
        self.genre_id
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn rows(&self) -> &[QuestionRow] {
        &self.rows
    }

    /// Append an empty row carrying the current shared genre/visibility.
    pub fn add_row(&mut self) -> RowId {
        let id = RowId::Placeholder(self.next_placeholder);
        self.next_placeholder += 1;
        self.rows
            .push(QuestionRow::empty(id, self.genre_id, self.visibility));
        id
    }

    /// Remove a row, except the last remaining one; the form never goes
    /// below one row. Returns whether a row was removed.
    pub fn remove_row(&mut self, id: RowId) -> bool {
        if self.rows.len() <= 1 {
            return false;
        }
        let before = self.rows.len();
        self.rows.retain(|row| row.id != id);
        self.rows.len() != before
    }

    /// Replace one field on one row. Returns false for an unknown row id.
    pub fn edit_field(&mut self, id: RowId, field: RowField, value: impl Into<String>) -> bool {
        match self.rows.iter_mut().find(|row| row.id == id) {
            Some(row) => {
                *row.field_mut(field) = value.into();
                true
            }
            None => false,
        }
    }

    pub fn set_shared_genre(&mut self, genre_id: u32) {
        self.genre_id = genre_id;
        for row in &mut self.rows {
            row.genre_id = genre_id;
        }
    }

    pub fn set_shared_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
        for row in &mut self.rows {
            row.visibility = visibility;
        }
    }

    /// Replace the whole form from a fetched set. The first row seeds the
    /// shared title/genre/visibility.
    pub fn hydrate(&mut self, set: &[FetchedQuestion]) {
        let Some(first) = set.first() else {
            return;
        };
        self.title = first.title.clone();
        self.genre_id = first.genre_id;
        self.visibility = first.visibility;
        self.rows = set
            .iter()
            .map(|fetched| QuestionRow {
                id: RowId::Existing(fetched.id),
                genre_id: fetched.genre_id,
                visibility: fetched.visibility,
                question: fetched.question.clone(),
                answer: fetched.answer.clone(),
                choices1: fetched.choices1.clone(),
                choices2: fetched.choices2.clone(),
            })
            .collect();
    }

    /// Wire payload for create/update. Placeholder ids do not survive this
    /// conversion; existing rows keep their server id.
    pub fn into_payload(self, question_set_id: Option<QuestionSetId>) -> SaveQuestionSet {
        SaveQuestionSet {
            question_set_id,
            title: self.title,
            genre_id: self.genre_id,
            visibility: self.visibility,
            questions: self
                .rows
                .into_iter()
                .map(|row| QuestionPayload {
                    id: match row.id {
                        RowId::Existing(id) => Some(id),
                        RowId::Placeholder(_) => None,
                    },
                    genre_id: row.genre_id,
                    visibility: row.visibility,
                    question: row.question,
                    answer: row.answer,
                    choices1: row.choices1,
                    choices2: row.choices2,
                })
                .collect(),
        }
    }
}
