use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use chroma_core::pagination::PaginatedFetcher;
use chroma_core::view::FetchOutcome;

use crate::render;

/// Interactive pager over one collection. A watcher task renders every state
/// the fetcher publishes; this loop only issues navigation requests.
pub async fn run(fetcher: PaginatedFetcher) -> Result<()> {
    let mut rx = fetcher.subscribe();
    let watcher = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            if state.loading {
                println!("Loading...");
                continue;
            }
            if let Some(error) = &state.error {
                println!("! {} (still showing page {})", error, state.data.page + 1);
                continue;
            }
            print!("{}", render::page(&state.data));
        }
    });

    println!("Browsing {}: [n]ext [p]revious [r]eload [q]uit", fetcher.collection());
    let _ = fetcher.go_to(0).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let outcome = match line.trim() {
            "n" | "next" => fetcher.next().await,
            "p" | "prev" | "previous" => fetcher.previous().await,
            "r" | "reload" => fetcher.reload().await,
            "q" | "quit" | "exit" => break,
            "" => continue,
            other => {
                println!("Unknown command '{}'", other);
                continue;
            }
        };
        match outcome {
            Ok(FetchOutcome::Unchanged) => println!("No page in that direction."),
            Ok(_) => {}
            Err(e) => debug!("{}", e),
        }
    }

    watcher.abort();
    Ok(())
}
