use std::{collections::HashMap, sync::Arc};

use super::*;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use serde_json::json;
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

struct CapturedRequest {
    page_id: Option<String>,
    params: HashMap<String, String>,
}

#[derive(Clone)]
struct ScriptedEndpoint {
    status: StatusCode,
    body: String,
    captured: Arc<Mutex<Option<oneshot::Sender<CapturedRequest>>>>,
}

async fn handle_search(
    State(endpoint): State<ScriptedEndpoint>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    if let Some(tx) = endpoint.captured.lock().await.take() {
        let _ = tx.send(CapturedRequest {
            page_id: None,
            params,
        });
    }
    (endpoint.status, endpoint.body.clone())
}

async fn handle_page_ads(
    State(endpoint): State<ScriptedEndpoint>,
    Path(page_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    if let Some(tx) = endpoint.captured.lock().await.take() {
        let _ = tx.send(CapturedRequest {
            page_id: Some(page_id),
            params,
        });
    }
    (endpoint.status, endpoint.body.clone())
}

async fn spawn_api_server(
    status: StatusCode,
    body: String,
) -> (String, oneshot::Receiver<CapturedRequest>) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let (tx, rx) = oneshot::channel();
    let endpoint = ScriptedEndpoint {
        status,
        body,
        captured: Arc::new(Mutex::new(Some(tx))),
    };
    let app = Router::new()
        .route("/api/search-advertisers", get(handle_search))
        .route("/api/page-ads/:page_id", get(handle_page_ads))
        .with_state(endpoint);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), rx)
}

#[tokio::test]
async fn search_sends_query_and_country_params() {
    let (base_url, captured_rx) =
        spawn_api_server(StatusCode::OK, json!({ "results": [] }).to_string()).await;
    let client = AdLibraryClient::new(base_url);

    let results = client
        .search_advertisers("nike shoes", CountryCode::Gb)
        .await
        .expect("search");
    assert!(results.is_empty());

    let request = captured_rx.await.expect("captured request");
    assert_eq!(
        request.params.get("query").map(String::as_str),
        Some("nike shoes")
    );
    assert_eq!(
        request.params.get("country_code").map(String::as_str),
        Some("GB")
    );
}

#[tokio::test]
async fn search_parses_full_and_minimal_records_in_order() {
    let body = json!({
        "results": [
            {
                "id": "101",
                "name": "Acme Outdoors",
                "category": "Retail",
                "verification": "blue_verified",
                "imageURI": "https://cdn.example/acme.png",
                "likes": 12345,
                "igFollowers": 678,
                "igUsername": "acme.outdoors"
            },
            { "id": "102", "name": "Tiny Shop" },
            { "id": "103", "name": "Null Metrics", "likes": null, "igFollowers": null }
        ]
    })
    .to_string();
    let (base_url, _captured_rx) = spawn_api_server(StatusCode::OK, body).await;
    let client = AdLibraryClient::new(base_url);

    let results = client
        .search_advertisers("acme", CountryCode::Us)
        .await
        .expect("search");

    assert_eq!(results.len(), 3);
    assert_eq!(
        results[0],
        Advertiser {
            id: PageId("101".to_string()),
            name: "Acme Outdoors".to_string(),
            category: Some("Retail".to_string()),
            verified: true,
            image_url: Some("https://cdn.example/acme.png".to_string()),
            facebook_likes: 12345,
            instagram_followers: 678,
            instagram_username: Some("acme.outdoors".to_string()),
        }
    );
    assert_eq!(results[1].id, PageId("102".to_string()));
    assert!(!results[1].verified);
    assert_eq!(results[1].category, None);
    assert_eq!(results[1].facebook_likes, 0);
    assert_eq!(results[2].facebook_likes, 0);
    assert_eq!(results[2].instagram_followers, 0);
}

#[tokio::test]
async fn search_surfaces_structured_error_body_message() {
    let body = json!({ "error": "Country PL is not enabled for this key" }).to_string();
    let (base_url, _captured_rx) = spawn_api_server(StatusCode::BAD_GATEWAY, body).await;
    let client = AdLibraryClient::new(base_url);

    let err = client
        .search_advertisers("nike", CountryCode::Pl)
        .await
        .expect_err("must fail");
    assert_eq!(
        err,
        ApiError::SearchFailed("Country PL is not enabled for this key".to_string())
    );
}

#[tokio::test]
async fn search_error_without_parseable_body_is_generic() {
    let (base_url, _captured_rx) = spawn_api_server(
        StatusCode::INTERNAL_SERVER_ERROR,
        "upstream exploded".to_string(),
    )
    .await;
    let client = AdLibraryClient::new(base_url);

    let err = client
        .search_advertisers("nike", CountryCode::Us)
        .await
        .expect_err("must fail");
    assert_eq!(err, ApiError::SearchFailed(GENERIC_SEARCH_FAILURE.to_string()));
}

#[tokio::test]
async fn search_error_body_without_error_field_is_generic() {
    let body = json!({ "detail": "quota exceeded" }).to_string();
    let (base_url, _captured_rx) = spawn_api_server(StatusCode::TOO_MANY_REQUESTS, body).await;
    let client = AdLibraryClient::new(base_url);

    let err = client
        .search_advertisers("nike", CountryCode::Us)
        .await
        .expect_err("must fail");
    assert_eq!(err, ApiError::SearchFailed(GENERIC_SEARCH_FAILURE.to_string()));
}

#[tokio::test]
async fn search_with_malformed_success_body_is_generic() {
    let (base_url, _captured_rx) =
        spawn_api_server(StatusCode::OK, "this is not json".to_string()).await;
    let client = AdLibraryClient::new(base_url);

    let err = client
        .search_advertisers("nike", CountryCode::Us)
        .await
        .expect_err("must fail");
    assert_eq!(err, ApiError::SearchFailed(GENERIC_SEARCH_FAILURE.to_string()));
}

#[tokio::test]
async fn search_response_without_results_field_is_empty() {
    let (base_url, _captured_rx) = spawn_api_server(StatusCode::OK, "{}".to_string()).await;
    let client = AdLibraryClient::new(base_url);

    let results = client
        .search_advertisers("nike", CountryCode::Us)
        .await
        .expect("search");
    assert!(results.is_empty());
}

#[tokio::test]
async fn page_ads_sends_fixed_filter_params_and_flattens_variant_arrays() {
    let body = json!({
        "results": [
            [
                { "adArchiveID": "a1", "publisherPlatform": ["facebook"], "startDate": 1, "snapshot": {} }
            ],
            [
                { "adArchiveID": "a2", "publisherPlatform": ["instagram"], "startDate": 2, "snapshot": {} },
                { "adArchiveID": "a3", "publisherPlatform": ["facebook", "instagram"], "startDate": 3, "snapshot": {} }
            ]
        ]
    })
    .to_string();
    let (base_url, captured_rx) = spawn_api_server(StatusCode::OK, body).await;
    let client = AdLibraryClient::new(base_url);

    let creatives = client
        .fetch_page_ads(&PageId("314159".to_string()), CountryCode::Us)
        .await
        .expect("ads");

    let ids: Vec<&str> = creatives
        .iter()
        .map(|creative| creative.archive_id.0.as_str())
        .collect();
    assert_eq!(ids, ["a1", "a2", "a3"]);

    let request = captured_rx.await.expect("captured request");
    assert_eq!(request.page_id.as_deref(), Some("314159"));
    assert_eq!(
        request.params.get("country_code").map(String::as_str),
        Some("US")
    );
    assert_eq!(
        request.params.get("platform").map(String::as_str),
        Some("facebook,instagram")
    );
    assert_eq!(
        request.params.get("media_types").map(String::as_str),
        Some("all")
    );
    assert_eq!(
        request.params.get("active_status").map(String::as_str),
        Some("all")
    );
}

#[tokio::test]
async fn page_ads_error_is_generic_even_with_structured_body() {
    let body = json!({ "error": "page not found" }).to_string();
    let (base_url, _captured_rx) = spawn_api_server(StatusCode::NOT_FOUND, body).await;
    let client = AdLibraryClient::new(base_url);

    let err = client
        .fetch_page_ads(&PageId("404".to_string()), CountryCode::Us)
        .await
        .expect_err("must fail");
    assert_eq!(err, ApiError::AdsFetchFailed(GENERIC_ADS_FAILURE.to_string()));
}

#[tokio::test]
async fn creative_mapping_applies_title_fallback_and_first_asset_rule() {
    let body = json!({
        "results": [[
            {
                "adArchiveID": "summer-1",
                "publisherPlatform": ["facebook", "audience_network", "instagram", "facebook"],
                "startDate": 1_700_000_000,
                "snapshot": {
                    "body": { "markup": { "__html": "Big summer <b>sale</b>" } },
                    "images": [
                        { "original_image_url": "https://cdn.example/first.jpg" },
                        { "original_image_url": "https://cdn.example/second.jpg" }
                    ],
                    "videos": [
                        {
                            "video_preview_image_url": "https://cdn.example/poster.jpg",
                            "video_sd_url": "https://cdn.example/clip.mp4"
                        },
                        { "video_sd_url": "https://cdn.example/ignored.mp4" }
                    ],
                    "cta_text": "Shop Now",
                    "link_url": "https://shop.example/sale"
                }
            }
        ]]
    })
    .to_string();
    let (base_url, _captured_rx) = spawn_api_server(StatusCode::OK, body).await;
    let client = AdLibraryClient::new(base_url);

    let creatives = client
        .fetch_page_ads(&PageId("7".to_string()), CountryCode::Gb)
        .await
        .expect("ads");
    assert_eq!(creatives.len(), 1);

    let creative = &creatives[0];
    assert_eq!(creative.archive_id, ArchiveId("summer-1".to_string()));
    assert_eq!(creative.start_epoch_seconds, 1_700_000_000);
    // Unknown platform names are dropped; duplicates collapse into the set.
    assert_eq!(creative.platforms.len(), 2);
    assert!(creative.platforms.contains(&Platform::Facebook));
    assert!(creative.platforms.contains(&Platform::Instagram));
    assert_eq!(creative.title.as_deref(), Some("Big summer <b>sale</b>"));
    assert_eq!(creative.body_html.as_deref(), Some("Big summer <b>sale</b>"));
    assert_eq!(creative.cta_text.as_deref(), Some("Shop Now"));
    assert_eq!(creative.cta_link_url.as_deref(), Some("https://shop.example/sale"));
    assert_eq!(creative.images.len(), 1);
    assert_eq!(
        creative.images[0].url.as_deref(),
        Some("https://cdn.example/first.jpg")
    );
    assert_eq!(creative.videos.len(), 1);
    assert_eq!(
        creative.videos[0].preview_image_url.as_deref(),
        Some("https://cdn.example/poster.jpg")
    );
    assert_eq!(
        creative.videos[0].sd_url.as_deref(),
        Some("https://cdn.example/clip.mp4")
    );
}

#[tokio::test]
async fn creative_without_snapshot_fields_maps_to_empty_media() {
    let body = json!({
        "results": [[
            { "adArchiveID": "bare-1", "publisherPlatform": ["facebook"], "startDate": 5, "snapshot": {} },
            { "adArchiveID": "bare-2" }
        ]]
    })
    .to_string();
    let (base_url, _captured_rx) = spawn_api_server(StatusCode::OK, body).await;
    let client = AdLibraryClient::new(base_url);

    let creatives = client
        .fetch_page_ads(&PageId("7".to_string()), CountryCode::Us)
        .await
        .expect("ads");
    assert_eq!(creatives.len(), 2);

    for creative in &creatives {
        assert!(creative.images.is_empty());
        assert!(creative.videos.is_empty());
        assert_eq!(creative.title, None);
        assert_eq!(creative.body_html, None);
        assert_eq!(creative.cta_text, None);
        assert_eq!(creative.cta_link_url, None);
    }
    assert!(creatives[1].platforms.is_empty());
    assert_eq!(creatives[1].start_epoch_seconds, 0);
}

#[tokio::test]
async fn unreachable_server_normalizes_to_generic_failures() {
    // Nothing listens on the discard port; both calls fail at the transport
    // layer and must surface the generic messages.
    let client = AdLibraryClient::new("http://127.0.0.1:9");

    let search_err = client
        .search_advertisers("nike", CountryCode::Us)
        .await
        .expect_err("search must fail");
    assert_eq!(
        search_err,
        ApiError::SearchFailed(GENERIC_SEARCH_FAILURE.to_string())
    );

    let ads_err = client
        .fetch_page_ads(&PageId("1".to_string()), CountryCode::Us)
        .await
        .expect_err("ads must fail");
    assert_eq!(
        ads_err,
        ApiError::AdsFetchFailed(GENERIC_ADS_FAILURE.to_string())
    );
}
