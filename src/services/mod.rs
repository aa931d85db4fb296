//! External data providers and the plumbing that keeps them polite.

pub mod credentials;
pub mod fetcher;
pub mod price_feed;
pub mod rate_limit;
pub mod taapi;

pub use credentials::CredentialPool;
pub use fetcher::{FetcherConfig, IndicatorFetcher, SnapshotSource};
pub use price_feed::PriceFeedClient;
pub use rate_limit::KeyRateLimiter;
pub use taapi::{IndicatorKind, IndicatorReading, TaapiClient};
