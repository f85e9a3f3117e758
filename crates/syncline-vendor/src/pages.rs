//! Bounded-concurrency pagination and abortable fetches
//!
//! Page fetches are independent, so they run through a concurrency-
//! limited stream instead of one sequential `await` chain, with the cap
//! sized to the vendor's rate limit. Order is preserved: page 3's items
//! land after page 2's regardless of completion order.

use crate::error::VendorError;
use futures::future::{AbortHandle, Abortable};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::future::Future;
use std::ops::RangeInclusive;

/// Default cap on simultaneous page requests
pub const DEFAULT_PAGE_CONCURRENCY: usize = 10;

/// Fetch a range of pages with at most `concurrency` requests in flight
///
/// # Errors
/// The first page error aborts the remaining fetches and is returned.
pub async fn fetch_pages<T, F, Fut>(
    pages: RangeInclusive<usize>,
    concurrency: usize,
    fetch: F,
) -> Result<Vec<T>, VendorError>
where
    F: Fn(usize) -> Fut,
    Fut: Future<Output = Result<Vec<T>, VendorError>>,
{
    let batches: Vec<Vec<T>> = stream::iter(pages.map(fetch))
        .buffered(concurrency.max(1))
        .try_collect()
        .await?;
    Ok(batches.into_iter().flatten().collect())
}

/// Wrap a session fetch so unmounting the UI can cancel it
///
/// The returned handle aborts the future at its next suspension point;
/// the wrapped future then resolves to [`VendorError::Aborted`].
pub fn abortable<T, F>(
    future: F,
) -> (AbortHandle, impl Future<Output = Result<T, VendorError>>)
where
    F: Future<Output = Result<T, VendorError>>,
{
    let (handle, registration) = AbortHandle::new_pair();
    let wrapped = Abortable::new(future, registration);
    let mapped = async move {
        match wrapped.await {
            Ok(result) => result,
            Err(_aborted) => Err(VendorError::Aborted),
        }
    };
    (handle, mapped)
}
