use tracing::{Level, event};

use crate::gateway::{ListEndpoint, MutationGateway, QueryGateway};
use crate::store::{FilterStore, StorageBackend};
use crate::types::criteria::{
    CriteriaUpdate, FilterCriteria, Scope, StatusFilter, VisibilityFilter,
};
use crate::types::pagination::Pagination;
use crate::types::question::{Genre, QuestionPage, QuestionSetId};
use handle_errors::Error;

use super::Notice;

/// When a list screen re-queries after a criteria edit. The learning list
/// refreshes on every keystroke; the other lists wait for the search
/// action (the page still resets immediately either way).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    OnEveryChange,
    OnSearch,
}

/// The four states a listing can render.
#[derive(Debug)]
pub enum ListState {
    Loading,
    Error(Error),
    Empty,
    Populated(QuestionPage),
}

/// Ticket handed out by `begin_query`. A result presented with a ticket
/// that is no longer current belongs to an abandoned query and is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTicket(u64);

/// Set selected for deletion, awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub id: QuestionSetId,
    pub title: String,
}

/// Controller behind every list screen: persisted criteria, page state and
/// the query lifecycle. The criteria live in the injected store, so they
/// survive navigation and reloads; everything else is per-mount.
pub struct ListScreen<B: StorageBackend> {
    scope: Scope,
    endpoint: ListEndpoint,
    mode: QueryMode,
    store: FilterStore<B>,
    criteria: FilterCriteria,
    pagination: Pagination,
    state: ListState,
    genres: Vec<Genre>,
    notice: Option<Notice>,
    pending_delete: Option<PendingDelete>,
    ticket: u64,
}

impl<B: StorageBackend> ListScreen<B> {
    /// The learning list: filters by status, re-queries per keystroke.
    pub fn my_question_list(store: FilterStore<B>) -> Self {
        Self::with_parts(
            Scope::MyQuestionSearch,
            ListEndpoint::MyQuestions,
            QueryMode::OnEveryChange,
            store,
        )
    }

    /// The created-sets list behind the edit flow: filters by visibility,
    /// queries on the search action, owns the delete flow.
    pub fn fix_search(store: FilterStore<B>) -> Self {
        Self::with_parts(
            Scope::MyCreatedQuestionSearch,
            ListEndpoint::MyCreatedQuestions,
            QueryMode::OnSearch,
            store,
        )
    }

    pub fn question_search(store: FilterStore<B>) -> Self {
        Self::with_parts(
            Scope::QuestionSearch,
            ListEndpoint::Search,
            QueryMode::OnSearch,
            store,
        )
    }

    pub fn favorite_search(store: FilterStore<B>) -> Self {
        Self::with_parts(
            Scope::FavoriteQuestionFilter,
            ListEndpoint::FavoriteQuestions,
            QueryMode::OnSearch,
            store,
        )
    }

    fn with_parts(
        scope: Scope,
        endpoint: ListEndpoint,
        mode: QueryMode,
        store: FilterStore<B>,
    ) -> Self {
        let criteria = store.get(scope);
        let pagination = Pagination::with_page(store.page(scope));
        ListScreen {
            scope,
            endpoint,
            mode,
            store,
            criteria,
            pagination,
            state: ListState::Loading,
            genres: Vec::new(),
            notice: None,
            pending_delete: None,
            ticket: 0,
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn genres(&self) -> &[Genre] {
        &self.genres
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ListState::Loading)
    }

    /// Current banner, dropping it once it has expired.
    pub fn notice(&mut self) -> Option<&Notice> {
        if self.notice.as_ref().is_some_and(Notice::is_expired) {
            self.notice = None;
        }
        self.notice.as_ref()
    }

    /// First query of the mount. Every screen fetches once on mount, even
    /// the ones that otherwise wait for the search action.
    pub async fn mount(&mut self, queries: &mut QueryGateway) {
        self.refresh(queries).await;
    }

    pub async fn set_title(
        &mut self,
        queries: &mut QueryGateway,
        title: impl Into<String>,
    ) -> Result<(), Error> {
        self.apply_update(queries, CriteriaUpdate::title(title)).await
    }

    pub async fn set_status(
        &mut self,
        queries: &mut QueryGateway,
        status: StatusFilter,
    ) -> Result<(), Error> {
        self.apply_update(queries, CriteriaUpdate::status(status)).await
    }

    pub async fn set_visibility(
        &mut self,
        queries: &mut QueryGateway,
        visibility: VisibilityFilter,
    ) -> Result<(), Error> {
        self.apply_update(queries, CriteriaUpdate::visibility(visibility))
            .await
    }

    pub async fn set_genre(&mut self, queries: &mut QueryGateway, genre_id: u32) -> Result<(), Error> {
        self.apply_update(queries, CriteriaUpdate::genre(genre_id)).await
    }

    async fn apply_update(
        &mut self,
        queries: &mut QueryGateway,
        update: CriteriaUpdate,
    ) -> Result<(), Error> {
        self.criteria = self.store.set(self.scope, update)?;
        self.pagination.reset();
        if self.mode == QueryMode::OnEveryChange {
            self.refresh(queries).await;
        }
        Ok(())
    }

    /// The search action. A no-op while a query is in flight, since the button
    /// is disabled until the previous one settles.
    pub async fn search(&mut self, queries: &mut QueryGateway) -> Result<(), Error> {
        if self.is_loading() {
            return Ok(());
        }
        self.pagination.reset();
        self.store.set_page(self.scope, 1)?;
        self.refresh(queries).await;
        Ok(())
    }

    /// Page navigation. Out-of-range targets were never rendered as
    /// enabled buttons, so they change nothing and trigger no query.
    pub async fn set_page(&mut self, queries: &mut QueryGateway, page: u32) -> Result<(), Error> {
        if self.pagination.set_page(page) {
            self.store.set_page(self.scope, page)?;
            self.refresh(queries).await;
        }
        Ok(())
    }

    /// Run the current query and apply its result. Errors land in the
    /// screen state; they never escape to the caller.
    pub async fn refresh(&mut self, queries: &mut QueryGateway) {
        let ticket = self.begin_query();
        let result = queries
            .query(self.endpoint, &self.criteria, self.pagination.page())
            .await;
        self.finish_query(ticket, result);
    }

    /// Start a query, superseding whatever was in flight.
    pub fn begin_query(&mut self) -> QueryTicket {
        self.ticket += 1;
        self.state = ListState::Loading;
        QueryTicket(self.ticket)
    }

    /// Apply a finished query. A result carrying a superseded ticket
    /// arrived after the screen moved on and is dropped.
    pub fn finish_query(&mut self, ticket: QueryTicket, result: Result<QuestionPage, Error>) {
        if ticket.0 != self.ticket {
            event!(target: "ecoran_client", Level::DEBUG, "dropping result of a superseded query");
            return;
        }
        match result {
            Ok(page) => {
                self.pagination.apply_total(page.total_count);
                if let Err(e) = self.store.set_page(self.scope, self.pagination.page()) {
                    event!(target: "ecoran_client", Level::WARN, error = %e, "could not persist page state");
                }
                self.state = if page.total_count == 0 {
                    ListState::Empty
                } else {
                    ListState::Populated(page)
                };
            }
            Err(e) => {
                event!(target: "ecoran_client", Level::ERROR, error = %e, "list query failed");
                self.state = ListState::Error(e);
            }
        }
    }

    /// Abandon the screen; any response still in flight will be dropped.
    pub fn leave(&mut self) {
        self.ticket += 1;
    }

    /// Genres arrive independently of the question list; whichever settles
    /// first is fine.
    pub async fn load_genres(&mut self, queries: &mut QueryGateway) {
        match queries.genres().await {
            Ok(list) => self.genres = list.genres,
            Err(e) => {
                event!(target: "ecoran_client", Level::WARN, error = %e, "could not load genres");
            }
        }
    }

    pub fn pending_delete(&self) -> Option<&PendingDelete> {
        self.pending_delete.as_ref()
    }

    pub fn request_delete(&mut self, id: QuestionSetId, title: impl Into<String>) {
        self.pending_delete = Some(PendingDelete {
            id,
            title: title.into(),
        });
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Delete the selected set. On success the cache is already
    /// invalidated, so the follow-up refresh hits the server.
    pub async fn confirm_delete(
        &mut self,
        queries: &mut QueryGateway,
        mutations: &MutationGateway,
    ) -> Result<(), Error> {
        let Some(pending) = self.pending_delete.take() else {
            return Ok(());
        };
        match mutations.delete(queries, pending.id).await {
            Ok(()) => {
                self.notice = Some(Notice::success("Delete complete"));
                self.refresh(queries).await;
            }
            Err(e) => {
                event!(target: "ecoran_client", Level::ERROR, error = %e, "could not delete question set");
                self.notice = Some(Notice::failure("Failed to delete the question set"));
            }
        }
        Ok(())
    }
}
