//! Backend commands queued from UI to backend worker.

use shared::domain::{CountryCode, PageId};

/// Generation tag for outgoing lookups. Completion events echo it back so
/// the controller can discard responses whose request has been superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(pub u64);

pub enum BackendCommand {
    SearchAdvertisers {
        request_id: RequestId,
        query: String,
        country: CountryCode,
    },
    FetchPageAds {
        request_id: RequestId,
        page_id: PageId,
        country: CountryCode,
    },
}
