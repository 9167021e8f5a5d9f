//! Join-all fan-out with per-task outcomes
//!
//! Every task is started before any is awaited, and the caller gets one
//! outcome per input once all of them have settled. A failure never cancels
//! its siblings.

use std::future::Future;

use futures::future::join_all;

/// Run `task` for every item concurrently and pair each item with its result.
///
/// Output order matches input order.
pub async fn settle_all<I, T, E, F, Fut>(items: I, task: F) -> Vec<(I::Item, Result<T, E>)>
where
    I: IntoIterator,
    I::Item: Clone,
    F: Fn(I::Item) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    join_all(items.into_iter().map(|item| {
        let fut = task(item.clone());
        async move { (item, fut.await) }
    }))
    .await
}
