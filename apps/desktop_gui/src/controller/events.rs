//! Events flowing from the backend worker to the UI thread.

use shared::{
    domain::{AdCreative, Advertiser},
    error::ApiError,
};

use crate::backend_bridge::commands::RequestId;

pub enum UiEvent {
    Info(String),
    SearchFinished {
        request_id: RequestId,
        result: Result<Vec<Advertiser>, ApiError>,
    },
    AdsFinished {
        request_id: RequestId,
        result: Result<Vec<AdCreative>, ApiError>,
    },
}
