#![warn(clippy::all)]

use tracing_subscriber::fmt::format::FmtSpan;

use ecoran_client::config::Config;
use ecoran_client::gateway::{ApiClient, QueryGateway};
use ecoran_client::screens::list::{ListScreen, ListState};
use ecoran_client::store::{FileStorage, FilterStore};

/// One-shot driver: mount the public search screen against the configured
/// API, optionally apply a title filter, and print the resulting page.
#[tokio::main]
async fn main() -> Result<(), handle_errors::Error> {
    let config = Config::new()?;

    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        format!(
            "ecoran_client={},reqwest={}",
            config.log_level, config.log_level
        )
    });
    tracing_subscriber::fmt()
        .with_env_filter(log_filter)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    let storage = FileStorage::open(&config.storage_path)?;
    let store = FilterStore::new(storage);
    let api = ApiClient::new(&config.api_base_url);
    let mut queries = QueryGateway::new(api);

    let mut screen = ListScreen::question_search(store);
    screen.load_genres(&mut queries).await;
    screen.mount(&mut queries).await;

    if let Some(title) = &config.search_title {
        screen.set_title(&mut queries, title).await?;
        screen.search(&mut queries).await?;
    }

    match screen.state() {
        ListState::Populated(page) => {
            println!(
                "page {} of {} ({} sets)",
                screen.pagination().page(),
                screen.pagination().total_pages().unwrap_or(1),
                page.total_count
            );
            for question in &page.questions {
                println!(
                    "  [{}] {} / {} ({} questions)",
                    question.question_set_id,
                    question.title,
                    question.genre_name,
                    question.total_questions
                );
            }
        }
        ListState::Empty => println!("No question sets matched."),
        ListState::Error(e) => eprintln!("Query failed: {}", e),
        ListState::Loading => unreachable!("mount settles before we render"),
    }

    Ok(())
}
