//! [`Config`]-related definitions.

use std::time::Duration;

use serde::Deserialize;
use smart_default::SmartDefault;

/// Client configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Config {
    /// Base URL of the server, without a trailing slash.
    #[default("http://127.0.0.1:8080".to_owned())]
    pub base_url: String,

    /// [`Freshness`] windows of the cached reads.
    pub freshness: Freshness,
}

/// Windows a cached read is served without re-fetching for.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Freshness {
    /// General listings.
    #[default(Duration::from_secs(5 * 60))]
    #[serde(with = "humantime_serde")]
    pub list: Duration,

    /// Single property reads.
    #[default(Duration::from_secs(5 * 60))]
    #[serde(with = "humantime_serde")]
    pub property: Duration,

    /// Featured listings.
    #[default(Duration::from_secs(10 * 60))]
    #[serde(with = "humantime_serde")]
    pub featured: Duration,

    /// Listings saved by the current user.
    #[default(Duration::from_secs(2 * 60))]
    #[serde(with = "humantime_serde")]
    pub saved: Duration,

    /// Listings of the current user.
    #[default(Duration::from_secs(5 * 60))]
    #[serde(with = "humantime_serde")]
    pub my: Duration,
}
