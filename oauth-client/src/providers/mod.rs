//! Provider adapters.

pub mod github;
pub mod google;

pub use github::GitHub;
pub use google::Google;
