pub mod chain;
pub mod eligibility;
pub mod events;
pub mod import;
pub mod metadata;
pub mod mint;
pub mod mint_status;
pub mod pipeline;
pub mod tally;
