//! Lazy search-criteria pagination
//!
//! A listing is a stream that fetches one page at a time, only when the
//! consumer pulls past the items already buffered. Dropping the stream
//! stops the listing; no further page is requested.

use super::types::{ListOptions, PageResponse, PaginationState};
use crate::error::Result;
use crate::http::{MagentoClient, RequestOptions};
use crate::query::{CURRENT_PAGE_KEY, PAGE_SIZE_KEY};
use crate::types::{Entity, Query};
use futures::stream::{self, Stream};
use std::collections::VecDeque;
use std::pin::Pin;
use tracing::debug;

/// Stream of entities from a paginated endpoint
pub type EntityStream<'a> = Pin<Box<dyn Stream<Item = Result<Entity>> + Send + 'a>>;

/// Log progress every this many items
const PROGRESS_LOG_INTERVAL: usize = 1000;

/// Cursor over the pages of one listing
struct PageCursor<'a> {
    client: &'a MagentoClient,
    path: String,
    query: Query,
    limit: Option<usize>,
    retry: u32,
    buffer: VecDeque<Entity>,
    state: PaginationState,
}

impl<'a> PageCursor<'a> {
    fn new(client: &'a MagentoClient, path: String, options: ListOptions) -> Self {
        let page_size = options.page_size(client.page_size());
        let mut query = options.query.unwrap_or_default();
        query.insert(PAGE_SIZE_KEY, page_size);

        let mut state = PaginationState::new();
        if options.limit == Some(0) {
            state.mark_done();
        }

        Self {
            client,
            path,
            query,
            limit: options.limit,
            retry: options.retry,
            buffer: VecDeque::new(),
            state,
        }
    }

    async fn next_item(&mut self) -> Result<Option<Entity>> {
        if self.buffer.is_empty() {
            if self.state.done {
                return Ok(None);
            }
            self.fetch_page().await?;
        }

        let Some(item) = self.buffer.pop_front() else {
            return Ok(None);
        };

        let yielded = self.state.yielded;
        if yielded > 0 && yielded % PROGRESS_LOG_INTERVAL == 0 {
            debug!(path = %self.path, "loaded {} items", yielded);
        }

        if self.state.item_yielded(self.limit) {
            self.buffer.clear();
        }
        Ok(Some(item))
    }

    async fn fetch_page(&mut self) -> Result<()> {
        let mut page_query = self.query.clone();
        page_query.insert(CURRENT_PAGE_KEY, self.state.current_page);

        let options = RequestOptions::raising()
            .query(page_query)
            .retry(self.retry);
        let mut page: PageResponse = self.client.get_api(&self.path, options).await?.json()?;

        let items = page.take_items();
        if items.is_empty() {
            self.state.mark_done();
            return Ok(());
        }

        self.state.page_fetched(page.total_count()?);
        self.buffer = items.into();
        Ok(())
    }
}

impl MagentoClient {
    /// Lazily list all entities of a search endpoint.
    ///
    /// The caller's query is copied before the page keys are added, so the
    /// same [`ListOptions`] can be reused. A limit of zero yields nothing
    /// without issuing a request.
    pub fn paginate(&self, path: impl Into<String>, options: ListOptions) -> EntityStream<'_> {
        let cursor = PageCursor::new(self, path.into(), options);
        Box::pin(stream::try_unfold(cursor, |mut cursor| async move {
            Ok(cursor.next_item().await?.map(|item| (item, cursor)))
        }))
    }
}
