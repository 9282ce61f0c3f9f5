use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug, Clone, Copy, Eq, Hash, Deserialize, PartialEq)]
pub struct QuestionSetId(pub u64);

impl std::fmt::Display for QuestionSetId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Owner-only or listable-by-others scope of a question set.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Public,
}

/// Learning progress of a registered question set.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LearningStatus {
    NotStarted,
    InProgress,
    Completed,
}

/// One row of a list-screen result. The optional fields differ per list:
/// the learning list reports progress and deadline, the created-sets list
/// reports visibility and timestamps.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSummary {
    pub question_set_id: QuestionSetId,
    pub title: String,
    pub genre_name: String,
    pub total_questions: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LearningStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// One server-returned page of a list query.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPage {
    pub questions: Vec<QuestionSummary>,
    pub total_count: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GenreList {
    pub genres: Vec<Genre>,
}

/// Wire shape of one row of an existing set, as returned by the
/// fetch-for-edit query. Title and shared fields are repeated on every row;
/// the first row seeds the form.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FetchedQuestion {
    pub id: u64,
    pub title: String,
    pub genre_id: u32,
    pub visibility: Visibility,
    pub question: String,
    pub answer: String,
    pub choices1: String,
    pub choices2: String,
}

/// One question row as submitted. Rows added locally have no `id` yet; the
/// server assigns one on insert.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub genre_id: u32,
    pub visibility: Visibility,
    pub question: String,
    pub answer: String,
    pub choices1: String,
    pub choices2: String,
}

/// Create/update request body. `question_set_id` is only present on update.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaveQuestionSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_set_id: Option<QuestionSetId>,
    pub title: String,
    pub genre_id: u32,
    pub visibility: Visibility,
    pub questions: Vec<QuestionPayload>,
}
