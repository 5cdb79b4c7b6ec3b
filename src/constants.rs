/// Trailing block window scanned for pre-sale transfer events.
pub const DEFAULT_EVENT_BLOCK_RANGE: u64 = 1_500_000;

/// Item ids at or above this value are community items; below it are social/game items.
pub const DEFAULT_COMMUNITY_ITEM_THRESHOLD: u64 = 14;

/// Minimum power the vendor check must report before a vendor SBT can be issued.
pub const DEFAULT_VENDOR_MIN_POWER: u64 = 1_000_000;

pub const DEFAULT_BACKEND_API_BASE: &str = "http://localhost:3000";
pub const DEFAULT_IPFS_GATEWAY: &str = "https://ipfs.io";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

// Backend endpoints, relative to BACKEND_API_BASE
pub const FETCH_WITH_CORS_PATH: &str = "api/fetch-with-cors";
pub const ENGINE_MINT_PATH: &str = "api/engine";
pub const SBT_REFRESH_PATH: &str = "api/sbt-refresh";
pub const VENDOR_SBT_CHECK_PATH: &str = "api/vendor-sbt-check";
pub const VENDOR_SBT_MINT_PATH: &str = "api/vendor-sbt-mint";

/// Substring the engine uses when every requested item is already minted.
pub const ALREADY_MINTED_MARKER: &str = "already minted";
pub const ALREADY_MINTED_MESSAGE: &str = "All of these SBTs have already been imported.";
pub const UNEXPECTED_MINT_ERROR: &str = "An unexpected error occurred during minting.";
