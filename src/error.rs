use axum::{Json, http::StatusCode};
use serde::Serialize;
use serde_json::{Value, json};

/// Reasons the vendor SBT backend refuses a code or a mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "message", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VendorRejection {
    MissingCode,
    NotEnoughPower,
    CodeNotExists,
    InvalidCode,
    AlreadyUsed,
    PlayerNotExists,
    /// The item was already minted; the user should look in their wallet.
    AlreadyMinted,
    CodeUsed,
    PowerBelowThreshold(u64),
    MintFailed(String),
    Other(String),
}

impl VendorRejection {
    /// Classify the `detail` text of a failed vendor check response.
    pub fn from_detail(detail: &str) -> Self {
        const CODES: [(&str, VendorRejection); 7] = [
            ("NOT_ENOUGH_POWER", VendorRejection::NotEnoughPower),
            ("CODE_NOT_EXISTS", VendorRejection::CodeNotExists),
            ("INVALID_CODE", VendorRejection::InvalidCode),
            ("ALREADY_USED", VendorRejection::AlreadyUsed),
            ("PLAYER_NOT_EXISTS", VendorRejection::PlayerNotExists),
            ("ALREADY_MINTED", VendorRejection::AlreadyMinted),
            ("CODE_USED", VendorRejection::CodeUsed),
        ];

        CODES
            .into_iter()
            .find(|(code, _)| detail.contains(code))
            .map(|(_, rejection)| rejection)
            .unwrap_or_else(|| VendorRejection::Other(detail.to_string()))
    }

    pub fn message(&self) -> String {
        match self {
            Self::MissingCode => "Please enter both the code and the password.".to_string(),
            Self::NotEnoughPower => "Your combat power is not high enough.".to_string(),
            Self::CodeNotExists => "The code does not exist.".to_string(),
            Self::InvalidCode => "The code or password is invalid.".to_string(),
            Self::AlreadyUsed => "This code has already been used.".to_string(),
            Self::PlayerNotExists => "No player is linked to this code.".to_string(),
            Self::AlreadyMinted => {
                "This SBT has already been issued. Please check your wallet.".to_string()
            }
            Self::CodeUsed => "This code was used by another account.".to_string(),
            Self::PowerBelowThreshold(min) => {
                format!("Power value is below the required threshold of {}.", min)
            }
            Self::MintFailed(_) => "Failed to issue the SBT.".to_string(),
            Self::Other(detail) => detail.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SbtError {
    #[error("Chain error: {0}")]
    Chain(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Metadata error: {0}")]
    Metadata(String),
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Token id {0} does not fit in 64 bits")]
    TokenIdOverflow(String),
    #[error("Vendor SBT rejected: {}", .0.message())]
    VendorRejected(VendorRejection),
}

impl From<reqwest::Error> for SbtError {
    fn from(e: reqwest::Error) -> Self {
        SbtError::Transport(e.to_string())
    }
}

impl SbtError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SbtError::InvalidAddress(_) => StatusCode::BAD_REQUEST,
            SbtError::VendorRejected(VendorRejection::MintFailed(_)) => StatusCode::BAD_GATEWAY,
            SbtError::VendorRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SbtError::Config(_) | SbtError::TokenIdOverflow(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            SbtError::Chain(_)
            | SbtError::Transport(_)
            | SbtError::Api { .. }
            | SbtError::Metadata(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// JSON error response in the shape every handler returns.
    pub fn into_response_parts(self) -> (StatusCode, Json<Value>) {
        let status = self.status_code();
        let body = match &self {
            SbtError::VendorRejected(rejection) => json!({
                "error": rejection.message(),
                "rejection": rejection,
            }),
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body))
    }
}
