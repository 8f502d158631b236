use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);
    };
}

id_newtype!(PageId);
id_newtype!(ArchiveId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CountryCode {
    #[default]
    Us,
    Pl,
    Gb,
}

impl CountryCode {
    pub const ALL: [CountryCode; 3] = [CountryCode::Us, CountryCode::Pl, CountryCode::Gb];

    /// Two-letter code as the search API expects it in `country_code`.
    pub fn code(self) -> &'static str {
        match self {
            CountryCode::Us => "US",
            CountryCode::Pl => "PL",
            CountryCode::Gb => "GB",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            CountryCode::Us => "United States",
            CountryCode::Pl => "Poland",
            CountryCode::Gb => "United Kingdom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Instagram,
}

impl Platform {
    /// Maps a `publisherPlatform` entry to a known platform. Names the
    /// dashboard never inspects (e.g. `audience_network`) map to `None`
    /// and are dropped during ingestion.
    pub fn from_wire(name: &str) -> Option<Platform> {
        match name {
            "facebook" => Some(Platform::Facebook),
            "instagram" => Some(Platform::Instagram),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advertiser {
    pub id: PageId,
    pub name: String,
    pub category: Option<String>,
    pub verified: bool,
    pub image_url: Option<String>,
    pub facebook_likes: u64,
    pub instagram_followers: u64,
    pub instagram_username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoAsset {
    pub preview_image_url: Option<String>,
    pub sd_url: Option<String>,
}

/// One active ad variant of an advertiser page. `images`/`videos` carry at
/// most one asset each: the ad archive reports asset lists per creative, but
/// only the first entry is ever rendered, so only the first is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdCreative {
    pub archive_id: ArchiveId,
    pub platforms: BTreeSet<Platform>,
    /// Campaign start in epoch seconds, verbatim from the wire. Converted
    /// to a calendar date at display time only.
    pub start_epoch_seconds: i64,
    pub title: Option<String>,
    pub body_html: Option<String>,
    pub cta_text: Option<String>,
    pub cta_link_url: Option<String>,
    pub images: Vec<ImageAsset>,
    pub videos: Vec<VideoAsset>,
}

/// Platform breakdown over a page's creatives. A creative running on both
/// platforms counts once in each of `facebook_count` and `instagram_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdStats {
    pub total: usize,
    pub facebook_count: usize,
    pub instagram_count: usize,
}

impl AdStats {
    pub fn from_creatives(ads: &[AdCreative]) -> Self {
        Self {
            total: ads.len(),
            facebook_count: ads
                .iter()
                .filter(|ad| ad.platforms.contains(&Platform::Facebook))
                .count(),
            instagram_count: ads
                .iter()
                .filter(|ad| ad.platforms.contains(&Platform::Instagram))
                .count(),
        }
    }
}
