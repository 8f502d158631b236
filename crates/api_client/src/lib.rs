use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shared::{
    domain::{
        AdCreative, Advertiser, ArchiveId, CountryCode, ImageAsset, PageId, Platform, VideoAsset,
    },
    error::ApiError,
};
use tracing::{debug, warn};

pub const DEFAULT_API_BASE_URL: &str = "https://ad-research-api.onrender.com";

const GENERIC_SEARCH_FAILURE: &str = "Failed to fetch data";
const GENERIC_ADS_FAILURE: &str = "Failed to fetch ads";

/// The two remote lookups the dashboard performs. `AdLibraryClient` is the
/// production implementation; the backend worker and tests substitute fakes
/// through this seam.
#[async_trait]
pub trait AdsApi: Send + Sync {
    async fn search_advertisers(
        &self,
        query: &str,
        country: CountryCode,
    ) -> Result<Vec<Advertiser>, ApiError>;

    async fn fetch_page_ads(
        &self,
        page_id: &PageId,
        country: CountryCode,
    ) -> Result<Vec<AdCreative>, ApiError>;
}

/// Stateless client for the ad-research API. Every call is one independent
/// round trip: no caching, no retries, no timeout.
pub struct AdLibraryClient {
    http: Client,
    base_url: String,
}

impl AdLibraryClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn search_advertisers(
        &self,
        query: &str,
        country: CountryCode,
    ) -> Result<Vec<Advertiser>, ApiError> {
        let response = self
            .http
            .get(format!("{}/api/search-advertisers", self.base_url))
            .query(&[("query", query), ("country_code", country.code())])
            .send()
            .await
            .map_err(|err| {
                warn!("search-advertisers request failed: {err}");
                ApiError::SearchFailed(GENERIC_SEARCH_FAILURE.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            // A structured { "error": ... } body wins over the generic message.
            let message = response
                .json::<SearchErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| GENERIC_SEARCH_FAILURE.to_string());
            warn!(%status, "search-advertisers returned an error");
            return Err(ApiError::SearchFailed(message));
        }

        let body: SearchResponseBody = response.json().await.map_err(|err| {
            warn!("search-advertisers response did not parse: {err}");
            ApiError::SearchFailed(GENERIC_SEARCH_FAILURE.to_string())
        })?;

        debug!(results = body.results.len(), "search-advertisers succeeded");
        Ok(body.results.into_iter().map(map_advertiser).collect())
    }

    pub async fn fetch_page_ads(
        &self,
        page_id: &PageId,
        country: CountryCode,
    ) -> Result<Vec<AdCreative>, ApiError> {
        let response = self
            .http
            .get(format!("{}/api/page-ads/{}", self.base_url, page_id.0))
            .query(&[
                ("country_code", country.code()),
                ("platform", "facebook,instagram"),
                ("media_types", "all"),
                ("active_status", "all"),
            ])
            .send()
            .await
            .map_err(|err| {
                warn!("page-ads request failed: {err}");
                ApiError::AdsFetchFailed(GENERIC_ADS_FAILURE.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            // Unlike search, the error body is not inspected for this endpoint.
            warn!(%status, page_id = %page_id.0, "page-ads returned an error");
            return Err(ApiError::AdsFetchFailed(GENERIC_ADS_FAILURE.to_string()));
        }

        let body: PageAdsResponseBody = response.json().await.map_err(|err| {
            warn!("page-ads response did not parse: {err}");
            ApiError::AdsFetchFailed(GENERIC_ADS_FAILURE.to_string())
        })?;

        // The endpoint returns one array of ads per platform/language
        // variant; flatten one level in order.
        let creatives: Vec<AdCreative> =
            body.results.into_iter().flatten().map(map_creative).collect();
        debug!(
            creatives = creatives.len(),
            page_id = %page_id.0,
            "page-ads succeeded"
        );
        Ok(creatives)
    }
}

#[async_trait]
impl AdsApi for AdLibraryClient {
    async fn search_advertisers(
        &self,
        query: &str,
        country: CountryCode,
    ) -> Result<Vec<Advertiser>, ApiError> {
        self.search_advertisers(query, country).await
    }

    async fn fetch_page_ads(
        &self,
        page_id: &PageId,
        country: CountryCode,
    ) -> Result<Vec<AdCreative>, ApiError> {
        self.fetch_page_ads(page_id, country).await
    }
}

#[derive(Debug, Deserialize)]
struct SearchErrorBody {
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponseBody {
    #[serde(default)]
    results: Vec<AdvertiserJson>,
}

#[derive(Debug, Deserialize)]
struct AdvertiserJson {
    id: String,
    name: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    verification: Option<String>,
    #[serde(default, rename = "imageURI")]
    image_uri: Option<String>,
    #[serde(default)]
    likes: Option<u64>,
    #[serde(default, rename = "igFollowers")]
    ig_followers: Option<u64>,
    #[serde(default, rename = "igUsername")]
    ig_username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PageAdsResponseBody {
    #[serde(default)]
    results: Vec<Vec<AdJson>>,
}

#[derive(Debug, Deserialize)]
struct AdJson {
    #[serde(rename = "adArchiveID")]
    ad_archive_id: String,
    #[serde(default, rename = "publisherPlatform")]
    publisher_platform: Vec<String>,
    #[serde(default, rename = "startDate")]
    start_date: i64,
    #[serde(default)]
    snapshot: SnapshotJson,
}

#[derive(Debug, Default, Deserialize)]
struct SnapshotJson {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    body: Option<SnapshotBodyJson>,
    #[serde(default)]
    images: Vec<SnapshotImageJson>,
    #[serde(default)]
    videos: Vec<SnapshotVideoJson>,
    #[serde(default)]
    cta_text: Option<String>,
    #[serde(default)]
    link_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SnapshotBodyJson {
    #[serde(default)]
    markup: Option<SnapshotMarkupJson>,
}

#[derive(Debug, Deserialize)]
struct SnapshotMarkupJson {
    #[serde(default, rename = "__html")]
    html: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SnapshotImageJson {
    #[serde(default)]
    original_image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SnapshotVideoJson {
    #[serde(default)]
    video_preview_image_url: Option<String>,
    #[serde(default)]
    video_sd_url: Option<String>,
}

fn map_advertiser(entry: AdvertiserJson) -> Advertiser {
    Advertiser {
        id: PageId(entry.id),
        name: entry.name,
        category: entry.category,
        verified: entry.verification.as_deref() == Some("blue_verified"),
        image_url: entry.image_uri,
        facebook_likes: entry.likes.unwrap_or(0),
        instagram_followers: entry.ig_followers.unwrap_or(0),
        instagram_username: entry.ig_username,
    }
}

fn map_creative(entry: AdJson) -> AdCreative {
    let snapshot = entry.snapshot;
    let body_html = snapshot
        .body
        .and_then(|body| body.markup)
        .and_then(|markup| markup.html);
    AdCreative {
        archive_id: ArchiveId(entry.ad_archive_id),
        platforms: entry
            .publisher_platform
            .iter()
            .filter_map(|name| Platform::from_wire(name))
            .collect(),
        start_epoch_seconds: entry.start_date,
        // Many creatives carry no title; the feed shows the body markup in
        // the same slot.
        title: snapshot.title.or_else(|| body_html.clone()),
        body_html,
        cta_text: snapshot.cta_text,
        cta_link_url: snapshot.link_url,
        images: snapshot
            .images
            .into_iter()
            .take(1)
            .map(|image| ImageAsset {
                url: image.original_image_url,
            })
            .collect(),
        videos: snapshot
            .videos
            .into_iter()
            .take(1)
            .map(|video| VideoAsset {
                preview_image_url: video.video_preview_image_url,
                sd_url: video.video_sd_url,
            })
            .collect(),
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
