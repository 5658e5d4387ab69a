pub mod compatibility;
pub mod episodes;
pub mod follows;
pub mod friendships;
pub mod metadata;
pub mod movies;
pub mod notifications;
pub mod onboarding;
pub mod profiles;
pub mod provider_sync;
pub mod ratings;
pub mod subscriptions;
pub mod watchlist;

#[cfg(test)]
pub(crate) mod test_support;

pub use metadata::{MetadataProvider, TmdbProvider};
