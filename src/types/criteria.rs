use serde::{Deserialize, Serialize};

/// Persisted-storage scope of one search screen. Each scope keeps its own
/// criteria under a stable key, so screens never see each other's filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    QuestionSearch,
    MyQuestionSearch,
    MyCreatedQuestionSearch,
    FavoriteQuestionFilter,
}

impl Scope {
    pub fn storage_key(&self) -> &'static str {
        match self {
            Scope::QuestionSearch => "questionSearch",
            Scope::MyQuestionSearch => "myQuestionSearch",
            Scope::MyCreatedQuestionSearch => "myCreatedQuestionSearch",
            Scope::FavoriteQuestionFilter => "filterFavoriteQuestion",
        }
    }

    /// Page state survives reloads only for the screens with a
    /// back-from-detail flow.
    pub fn persists_page(&self) -> bool {
        matches!(self, Scope::MyQuestionSearch | Scope::MyCreatedQuestionSearch)
    }

    pub fn default_criteria(&self) -> FilterCriteria {
        match self {
            Scope::QuestionSearch | Scope::FavoriteQuestionFilter => FilterCriteria {
                title: String::new(),
                status: None,
                visibility: Some(VisibilityFilter::Private),
                genre_id: 1,
            },
            Scope::MyQuestionSearch => FilterCriteria {
                title: String::new(),
                status: Some(StatusFilter::All),
                visibility: None,
                genre_id: 0,
            },
            Scope::MyCreatedQuestionSearch => FilterCriteria {
                title: String::new(),
                status: None,
                visibility: Some(VisibilityFilter::All),
                genre_id: 0,
            },
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    All,
    NotStarted,
    InProgress,
    Completed,
}

impl StatusFilter {
    pub fn as_param(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::NotStarted => "not_started",
            StatusFilter::InProgress => "in_progress",
            StatusFilter::Completed => "completed",
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityFilter {
    All,
    Private,
    Public,
}

impl VisibilityFilter {
    pub fn as_param(&self) -> &'static str {
        match self {
            VisibilityFilter::All => "all",
            VisibilityFilter::Private => "private",
            VisibilityFilter::Public => "public",
        }
    }
}

/// Filter fields a list screen sends with its queries. `genre_id` 0 means
/// any genre; `status`/`visibility` are only present on the screens that
/// filter by them.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterCriteria {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<VisibilityFilter>,
    pub genre_id: u32,
}

/// One user edit to the criteria. Fields left `None` keep their stored value.
#[derive(Debug, Default, Clone)]
pub struct CriteriaUpdate {
    pub title: Option<String>,
    pub status: Option<StatusFilter>,
    pub visibility: Option<VisibilityFilter>,
    pub genre_id: Option<u32>,
}

impl CriteriaUpdate {
    pub fn title(title: impl Into<String>) -> Self {
        CriteriaUpdate {
            title: Some(title.into()),
            ..CriteriaUpdate::default()
        }
    }

    pub fn status(status: StatusFilter) -> Self {
        CriteriaUpdate {
            status: Some(status),
            ..CriteriaUpdate::default()
        }
    }

    pub fn visibility(visibility: VisibilityFilter) -> Self {
        CriteriaUpdate {
            visibility: Some(visibility),
            ..CriteriaUpdate::default()
        }
    }

    pub fn genre(genre_id: u32) -> Self {
        CriteriaUpdate {
            genre_id: Some(genre_id),
            ..CriteriaUpdate::default()
        }
    }
}

impl FilterCriteria {
    /// Shallow merge of one edit onto the current criteria.
    pub fn apply(&mut self, update: CriteriaUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(status) = update.status {
            self.status = Some(status);
        }
        if let Some(visibility) = update.visibility {
            self.visibility = Some(visibility);
        }
        if let Some(genre_id) = update.genre_id {
            self.genre_id = genre_id;
        }
    }
}
