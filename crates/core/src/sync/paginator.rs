//! Paged walk over one organization's estimates

use quotesync_domain::constants::FIRST_PAGE;
use quotesync_domain::{Organization, RawEstimate, RetentionWindow};
use tracing::debug;

use super::errors::PageError;
use super::ports::{AccessToken, EstimateSource};

/// One non-empty page handed to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage {
    pub number: u32,
    pub estimates: Vec<RawEstimate>,
}

/// Walks an organization's listing page by page, in provider order.
///
/// The walk ends when the provider reports no further pages, a page comes
/// back empty, a page fails, or a page lies entirely before the retention
/// window (see [`page_precedes_window`]). Pages are requested one at a
/// time so the caller can finish writing a page before the next request.
pub struct EstimatePaginator<'a> {
    source: &'a dyn EstimateSource,
    token: &'a AccessToken,
    organization: &'a Organization,
    window: RetentionWindow,
    per_page: u32,
    next: u32,
    done: bool,
}

impl<'a> EstimatePaginator<'a> {
    pub fn new(
        source: &'a dyn EstimateSource,
        token: &'a AccessToken,
        organization: &'a Organization,
        window: RetentionWindow,
        per_page: u32,
    ) -> Self {
        Self { source, token, organization, window, per_page, next: FIRST_PAGE, done: false }
    }

    /// Fetch the next page. `Ok(None)` once the walk is over.
    pub async fn next_page(&mut self) -> Result<Option<FetchedPage>, PageError> {
        if self.done {
            return Ok(None);
        }
        let number = self.next;
        let page = match self
            .source
            .fetch_page(self.token, self.organization, number, self.per_page)
            .await
        {
            Ok(page) => page,
            Err(source) => {
                self.done = true;
                return Err(PageError { office: self.organization.office, page: number, source });
            }
        };

        if page.estimates.is_empty() {
            self.done = true;
            return Ok(None);
        }

        if page_precedes_window(&page.estimates, self.window) {
            debug!(
                office = %self.organization.office,
                page = number,
                "page predates retention window, stopping"
            );
            self.done = true;
        } else {
            self.done = !page.has_more;
        }
        self.next += 1;

        Ok(Some(FetchedPage { number, estimates: page.estimates }))
    }
}

/// Early-termination heuristic.
///
/// Assumes the provider returns estimates newest first: when both the first
/// and the last record of a page fall before the window's lower bound, no
/// later page can contain in-window records. Undated records never trigger
/// it. The page that triggers it is still processed.
pub fn page_precedes_window(estimates: &[RawEstimate], window: RetentionWindow) -> bool {
    let before = |raw: Option<&RawEstimate>| {
        raw.and_then(RawEstimate::year).is_some_and(|year| window.precedes(year))
    };
    before(estimates.first()) && before(estimates.last())
}
