use std::collections::HashMap;
use std::future::Future;

use chrono::Utc;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::RetryPolicy;
use retry_policies::RetryDecision;
use serde::{Deserialize, Serialize};
use tracing::{Level, event};
use uuid::Uuid;

use crate::types::criteria::FilterCriteria;
use crate::types::pagination::PAGE_LIMIT;
use crate::types::question::{
    FetchedQuestion, GenreList, QuestionPage, QuestionSetId, SaveQuestionSet,
};
use handle_errors::{APIError, Error};

/// Extra attempts after the first failed one. Terminal statuses skip the
/// retry loop entirely.
pub const MAX_QUERY_RETRIES: u32 = 2;

/// The list endpoint a screen queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListEndpoint {
    Search,
    MyQuestions,
    MyCreatedQuestions,
    FavoriteQuestions,
}

impl ListEndpoint {
    pub fn path(&self) -> &'static str {
        match self {
            ListEndpoint::Search => "question/search",
            ListEndpoint::MyQuestions => "question/my-question-list",
            ListEndpoint::MyCreatedQuestions => "question/my-created-question-list",
            ListEndpoint::FavoriteQuestions => "question/favorite/search",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct QueryKey {
    endpoint: ListEndpoint,
    criteria: FilterCriteria,
    page: u32,
    limit: u32,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
struct APIResponse {
    message: String,
}

/// Plain HTTP boundary of the remote quiz API. Retries and caching live in
/// the gateways above it, so terminal statuses can opt out of retrying.
#[derive(Clone)]
pub struct ApiClient {
    client: ClientWithMiddleware,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = ClientBuilder::new(reqwest::Client::new()).build();
        ApiClient {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    pub async fn list(
        &self,
        endpoint: ListEndpoint,
        criteria: &FilterCriteria,
        page: u32,
        limit: u32,
    ) -> Result<QuestionPage, Error> {
        let mut params: Vec<(&str, String)> = vec![
            ("title", criteria.title.clone()),
            ("genreId", criteria.genre_id.to_string()),
            ("page", page.to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(status) = criteria.status {
            params.push(("status", status.as_param().to_string()));
        }
        if let Some(visibility) = criteria.visibility {
            params.push(("visibility", visibility.as_param().to_string()));
        }

        let res = self
            .client
            .get(self.url(endpoint.path()))
            .query(&params)
            .send()
            .await
            .map_err(Error::MiddlewareReqwestAPIError)?;
        parse_json(res).await
    }

    pub async fn question_set_for_fix(
        &self,
        id: QuestionSetId,
    ) -> Result<Vec<FetchedQuestion>, Error> {
        let res = self
            .client
            .get(self.url(&format!("question/fix/{}", id)))
            .send()
            .await
            .map_err(Error::MiddlewareReqwestAPIError)?;
        parse_json(res).await
    }

    pub async fn genres(&self) -> Result<GenreList, Error> {
        let res = self
            .client
            .get(self.url("genre/all"))
            .send()
            .await
            .map_err(Error::MiddlewareReqwestAPIError)?;
        parse_json(res).await
    }

    pub async fn create_question_set(&self, payload: &SaveQuestionSet) -> Result<(), Error> {
        let res = self
            .client
            .post(self.url("question/create"))
            .json(payload)
            .send()
            .await
            .map_err(Error::MiddlewareReqwestAPIError)?;
        expect_success(res).await
    }

    pub async fn update_question_set(&self, payload: &SaveQuestionSet) -> Result<(), Error> {
        let res = self
            .client
            .put(self.url("question/fix"))
            .json(payload)
            .send()
            .await
            .map_err(Error::MiddlewareReqwestAPIError)?;
        expect_success(res).await
    }

    pub async fn delete_question_set(&self, id: QuestionSetId) -> Result<(), Error> {
        let res = self
            .client
            .delete(self.url(&format!("question/set/{}", id)))
            .send()
            .await
            .map_err(Error::MiddlewareReqwestAPIError)?;
        expect_success(res).await
    }
}

async fn parse_json<T: serde::de::DeserializeOwned>(res: reqwest::Response) -> Result<T, Error> {
    let status = res.status();
    if !status.is_success() {
        let err = transform_error(res).await;
        return Err(if status.is_client_error() {
            Error::ClientError(err)
        } else {
            Error::ServerError(err)
        });
    }
    res.json::<T>().await.map_err(Error::ReqwestAPIError)
}

async fn expect_success(res: reqwest::Response) -> Result<(), Error> {
    let status = res.status();
    if !status.is_success() {
        let err = transform_error(res).await;
        return Err(if status.is_client_error() {
            Error::ClientError(err)
        } else {
            Error::ServerError(err)
        });
    }
    Ok(())
}

async fn transform_error(res: reqwest::Response) -> APIError {
    let status = res.status().as_u16();
    let message = match res.json::<APIResponse>().await {
        Ok(body) => body.message,
        Err(_) => String::new(),
    };
    APIError { status, message }
}

/// Read side of the remote API. Pages are cached per
/// `(endpoint, criteria, page, limit)` so an identical query is answered
/// without a request until a mutation invalidates the cache.
pub struct QueryGateway {
    api: ApiClient,
    retry_policy: ExponentialBackoff,
    cache: HashMap<QueryKey, QuestionPage>,
    genres: Option<GenreList>,
}

impl QueryGateway {
    pub fn new(api: ApiClient) -> Self {
        Self::with_retry_policy(
            api,
            ExponentialBackoff::builder().build_with_max_retries(MAX_QUERY_RETRIES),
        )
    }

    /// Same gateway with a caller-chosen backoff. The retry budget is part
    /// of the policy, so tests can shrink the delays without changing it.
    pub fn with_retry_policy(api: ApiClient, retry_policy: ExponentialBackoff) -> Self {
        QueryGateway {
            api,
            retry_policy,
            cache: HashMap::new(),
            genres: None,
        }
    }

    pub async fn query(
        &mut self,
        endpoint: ListEndpoint,
        criteria: &FilterCriteria,
        page: u32,
    ) -> Result<QuestionPage, Error> {
        let key = QueryKey {
            endpoint,
            criteria: criteria.clone(),
            page,
            limit: PAGE_LIMIT,
        };
        if let Some(cached) = self.cache.get(&key) {
            event!(target: "ecoran_client", Level::DEBUG, endpoint = endpoint.path(), page, "serving question list from cache");
            return Ok(cached.clone());
        }

        let request_id = Uuid::new_v4();
        event!(target: "ecoran_client", Level::INFO, %request_id, endpoint = endpoint.path(), page, "querying question list");
        let api = self.api.clone();
        let criteria = criteria.clone();
        let fresh = with_retries(&self.retry_policy, move || {
            let api = api.clone();
            let criteria = criteria.clone();
            async move { api.list(endpoint, &criteria, page, PAGE_LIMIT).await }
        })
        .await?;

        self.cache.insert(key, fresh.clone());
        Ok(fresh)
    }

    /// Fetch an existing set for the edit flow. Not cached: the form must
    /// hydrate from the server's current state every time it opens.
    pub async fn fetch_for_edit(
        &mut self,
        id: QuestionSetId,
    ) -> Result<Vec<FetchedQuestion>, Error> {
        let request_id = Uuid::new_v4();
        event!(target: "ecoran_client", Level::INFO, %request_id, %id, "fetching question set for edit");
        let api = self.api.clone();
        with_retries(&self.retry_policy, move || {
            let api = api.clone();
            async move { api.question_set_for_fix(id).await }
        })
        .await
    }

    pub async fn genres(&mut self) -> Result<GenreList, Error> {
        if let Some(cached) = &self.genres {
            return Ok(cached.clone());
        }
        let api = self.api.clone();
        let list = with_retries(&self.retry_policy, move || {
            let api = api.clone();
            async move { api.genres().await }
        })
        .await?;
        self.genres = Some(list.clone());
        Ok(list)
    }

    /// Drop every cached list page so the next query hits the server.
    /// Mutations call this after a successful write.
    pub fn invalidate_lists(&mut self) {
        self.cache.clear();
    }
}

async fn with_retries<T, F, Fut>(policy: &ExponentialBackoff, mut attempt: F) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    let mut past_retries = 0;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_terminal() => return Err(e),
            Err(e) => match policy.should_retry(past_retries) {
                RetryDecision::Retry { execute_after } => {
                    let delay = (execute_after - Utc::now()).to_std().unwrap_or_default();
                    event!(target: "ecoran_client", Level::WARN, error = %e, past_retries, "query attempt failed, retrying");
                    tokio::time::sleep(delay).await;
                    past_retries += 1;
                }
                RetryDecision::DoNotRetry => return Err(e),
            },
        }
    }
}

/// Write side of the remote API. Thin: each call strips nothing further
/// (the form already produced the payload) and on success invalidates the
/// query cache so the list screens refresh.
pub struct MutationGateway {
    api: ApiClient,
}

impl MutationGateway {
    pub fn new(api: ApiClient) -> Self {
        MutationGateway { api }
    }

    pub async fn create(
        &self,
        queries: &mut QueryGateway,
        payload: &SaveQuestionSet,
    ) -> Result<(), Error> {
        self.api.create_question_set(payload).await?;
        queries.invalidate_lists();
        Ok(())
    }

    pub async fn update(
        &self,
        queries: &mut QueryGateway,
        payload: &SaveQuestionSet,
    ) -> Result<(), Error> {
        self.api.update_question_set(payload).await?;
        queries.invalidate_lists();
        Ok(())
    }

    pub async fn delete(
        &self,
        queries: &mut QueryGateway,
        id: QuestionSetId,
    ) -> Result<(), Error> {
        self.api.delete_question_set(id).await?;
        queries.invalidate_lists();
        Ok(())
    }
}
