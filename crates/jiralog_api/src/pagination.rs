//! Generic offset pagination shared by the search and worklog listings.

use std::future::Future;

use crate::error::Result;

/// One page of an offset-paginated listing together with the server-reported
/// total number of matches.
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Drains an offset-paginated endpoint.
///
/// `fetch_page` is called with the current offset and must return that page
/// plus the server total. The loop stops once the cumulative item count
/// reaches the total, or when a page comes back empty (inconsistent totals
/// must not spin forever). Pages are requested strictly one at a time.
pub async fn fetch_all<T, F, Fut>(mut fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut collected = Vec::new();
    let mut offset = 0u64;

    loop {
        let page = fetch_page(offset).await?;
        let count = page.items.len() as u64;
        collected.extend(page.items);
        offset += count;

        if count == 0 || offset >= page.total {
            break;
        }
    }

    Ok(collected)
}
