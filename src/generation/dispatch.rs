// src/generation/dispatch.rs
use crate::generation::client::TextGenerator;
use crate::generation::models::RawReview;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

/// Result of generating one item. Failures are kept as messages so one bad
/// item never aborts the batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemOutcome {
    pub index: usize,
    pub item: String,
    pub result: Result<String, String>,
}

impl ItemOutcome {
    pub fn review(&self) -> Option<RawReview> {
        self.result.as_ref().ok().map(|text| RawReview {
            movie_name: self.item.clone(),
            review: text.clone(),
        })
    }
}

/// Blank lines dropped, surrounding whitespace trimmed.
pub fn clean_items<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .map(|line| line.as_ref().trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Generates every item with at most `concurrency` requests in flight.
/// Successful reviews are also pushed to `sink` as they complete. Outcomes
/// come back in input order.
pub async fn dispatch(
    generator: Arc<dyn TextGenerator>,
    items: Vec<String>,
    concurrency: usize,
    sink: Option<mpsc::Sender<RawReview>>,
) -> Vec<ItemOutcome> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();
    let total = items.len();

    for (index, item) in items.into_iter().enumerate() {
        let generator = Arc::clone(&generator);
        let semaphore = Arc::clone(&semaphore);
        let sink = sink.clone();

        tasks.spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    return ItemOutcome {
                        index,
                        item,
                        result: Err("dispatcher closed".to_string()),
                    }
                }
            };

            match generator.generate(&item).await {
                Ok(text) => {
                    tracing::info!("Review for {} generated ({} bytes)", item, text.len());
                    if let Some(sink) = &sink {
                        let review = RawReview {
                            movie_name: item.clone(),
                            review: text.clone(),
                        };
                        if sink.send(review).await.is_err() {
                            tracing::warn!("Review writer stopped; {} not saved incrementally", item);
                        }
                    }
                    ItemOutcome { index, item, result: Ok(text) }
                }
                Err(e) => {
                    tracing::error!("Error processing {}: {}", item, e);
                    ItemOutcome {
                        index,
                        item,
                        result: Err(e.to_string()),
                    }
                }
            }
        });
    }
    drop(sink);

    let mut outcomes = Vec::with_capacity(total);
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => tracing::error!("Generation task failed to complete: {}", e),
        }
    }
    outcomes.sort_by_key(|o| o.index);
    outcomes
}
