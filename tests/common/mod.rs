#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use reqwest_retry::policies::ExponentialBackoff;
use warp::Filter;
use warp::http::StatusCode;

use ecoran_client::gateway::{ApiClient, MAX_QUERY_RETRIES, QueryGateway};
use ecoran_client::types::question::{
    FetchedQuestion, Genre, GenreList, LearningStatus, QuestionPage, QuestionPayload,
    QuestionSetId, QuestionSummary, SaveQuestionSet, Visibility,
};

/// In-process stand-in for the remote quiz API. Counts how often each kind
/// of endpoint is hit so tests can observe caching and retry behavior.
pub struct MockApi {
    addr: SocketAddr,
    list: Arc<AtomicUsize>,
    genres: Arc<AtomicUsize>,
    fix: Arc<AtomicUsize>,
    mutations: Arc<AtomicUsize>,
}

impl MockApi {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn list_hits(&self) -> usize {
        self.list.load(Ordering::SeqCst)
    }

    pub fn genre_hits(&self) -> usize {
        self.genres.load(Ordering::SeqCst)
    }

    pub fn fix_hits(&self) -> usize {
        self.fix.load(Ordering::SeqCst)
    }

    pub fn mutation_hits(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    pub fn hits(&self) -> usize {
        self.list_hits() + self.genre_hits() + self.fix_hits() + self.mutation_hits()
    }
}

/// The production backoff shrunk to milliseconds; same retry budget.
pub fn fast_retry_policy() -> ExponentialBackoff {
    ExponentialBackoff::builder()
        .retry_bounds(Duration::from_millis(10), Duration::from_millis(50))
        .build_with_max_retries(MAX_QUERY_RETRIES)
}

pub fn gateway(base_url: &str) -> QueryGateway {
    QueryGateway::with_retry_policy(ApiClient::new(base_url), fast_retry_policy())
}

pub fn page_of(total_count: u64) -> QuestionPage {
    let rows = total_count.min(10);
    QuestionPage {
        questions: (1..=rows)
            .map(|i| QuestionSummary {
                question_set_id: QuestionSetId(i),
                title: format!("Question set {}", i),
                genre_name: "General".to_string(),
                total_questions: 5,
                progress: Some(40),
                deadline: None,
                status: Some(LearningStatus::InProgress),
                visibility: Some(Visibility::Private),
                created_at: None,
                updated_at: None,
            })
            .collect(),
        total_count,
    }
}

pub fn genre_list() -> GenreList {
    GenreList {
        genres: vec![
            Genre {
                id: 1,
                name: "General".to_string(),
            },
            Genre {
                id: 7,
                name: "History".to_string(),
            },
        ],
    }
}

pub fn fetched_rows(set_id: u64) -> Vec<FetchedQuestion> {
    vec![
        FetchedQuestion {
            id: set_id * 10 + 1,
            title: "European capitals".to_string(),
            genre_id: 3,
            visibility: Visibility::Public,
            question: "Capital of France?".to_string(),
            answer: "Paris".to_string(),
            choices1: "Lyon".to_string(),
            choices2: "Nice".to_string(),
        },
        FetchedQuestion {
            id: set_id * 10 + 2,
            title: "European capitals".to_string(),
            genre_id: 3,
            visibility: Visibility::Public,
            question: "Capital of Spain?".to_string(),
            answer: "Madrid".to_string(),
            choices1: "Barcelona".to_string(),
            choices2: "Seville".to_string(),
        },
    ]
}

pub fn sample_payload(question_set_id: Option<QuestionSetId>) -> SaveQuestionSet {
    SaveQuestionSet {
        question_set_id,
        title: "European capitals".to_string(),
        genre_id: 3,
        visibility: Visibility::Public,
        questions: vec![QuestionPayload {
            id: Some(31),
            genre_id: 3,
            visibility: Visibility::Public,
            question: "Capital of France?".to_string(),
            answer: "Paris".to_string(),
            choices1: "Lyon".to_string(),
            choices2: "Nice".to_string(),
        }],
    }
}

/// A healthy server: every list query answers one page of `total_count`
/// rows, genres and fetch-for-edit answer fixtures, mutations succeed.
pub async fn serve_ok(total_count: u64) -> MockApi {
    let list = Arc::new(AtomicUsize::new(0));
    let genres = Arc::new(AtomicUsize::new(0));
    let fix = Arc::new(AtomicUsize::new(0));
    let mutations = Arc::new(AtomicUsize::new(0));

    let lists = {
        let counter = list.clone();
        let page = page_of(total_count);
        warp::get()
            .and(
                warp::path!("question" / "my-question-list")
                    .or(warp::path!("question" / "my-created-question-list"))
                    .unify()
                    .or(warp::path!("question" / "search"))
                    .unify()
                    .or(warp::path!("question" / "favorite" / "search"))
                    .unify(),
            )
            .and(warp::query::<HashMap<String, String>>())
            .map(move |_params: HashMap<String, String>| {
                counter.fetch_add(1, Ordering::SeqCst);
                warp::reply::json(&page)
            })
    };

    let genre_route = {
        let counter = genres.clone();
        warp::get().and(warp::path!("genre" / "all")).map(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            warp::reply::json(&genre_list())
        })
    };

    let fix_route = {
        let counter = fix.clone();
        warp::get()
            .and(warp::path!("question" / "fix" / u64))
            .map(move |set_id: u64| {
                counter.fetch_add(1, Ordering::SeqCst);
                warp::reply::json(&fetched_rows(set_id))
            })
    };

    let create_route = {
        let counter = mutations.clone();
        warp::post()
            .and(warp::path!("question" / "create"))
            .and(warp::body::json::<serde_json::Value>())
            .map(move |_body: serde_json::Value| {
                counter.fetch_add(1, Ordering::SeqCst);
                warp::reply::json(&serde_json::json!({ "message": "created" }))
            })
    };

    let update_route = {
        let counter = mutations.clone();
        warp::put()
            .and(warp::path!("question" / "fix"))
            .and(warp::body::json::<serde_json::Value>())
            .map(move |_body: serde_json::Value| {
                counter.fetch_add(1, Ordering::SeqCst);
                warp::reply::json(&serde_json::json!({ "message": "updated" }))
            })
    };

    let delete_route = {
        let counter = mutations.clone();
        warp::delete()
            .and(warp::path!("question" / "set" / u64))
            .map(move |_set_id: u64| {
                counter.fetch_add(1, Ordering::SeqCst);
                warp::reply::json(&serde_json::json!({ "message": "deleted" }))
            })
    };

    let routes = lists
        .or(genre_route)
        .or(fix_route)
        .or(create_route)
        .or(update_route)
        .or(delete_route);

    let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);

    MockApi {
        addr,
        list,
        genres,
        fix,
        mutations,
    }
}

/// A broken server: every request is answered with `status` and counted,
/// so tests can assert exact attempt counts.
pub async fn serve_failing(status: u16) -> MockApi {
    let list = Arc::new(AtomicUsize::new(0));
    let counter = list.clone();

    let routes = warp::path::tail().map(move |_tail: warp::path::Tail| {
        counter.fetch_add(1, Ordering::SeqCst);
        warp::reply::with_status(
            warp::reply::json(&serde_json::json!({ "message": "simulated failure" })),
            StatusCode::from_u16(status).expect("valid status code"),
        )
    });

    let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);

    MockApi {
        addr,
        list: list.clone(),
        genres: Arc::new(AtomicUsize::new(0)),
        fix: Arc::new(AtomicUsize::new(0)),
        mutations: Arc::new(AtomicUsize::new(0)),
    }
}
