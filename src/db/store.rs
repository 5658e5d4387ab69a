//! Storage abstraction
//!
//! One trait per table family so services only see what they use. `Store`
//! bundles them for the application state; `PgStore` and `MemoryStore`
//! implement every trait. Lists documented as "newest first" order by
//! `created_at` descending.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        Episode, Follow, Friendship, FriendshipStatus, Movie, NewEpisode, NewMovie,
        NewNotification, NewProfile, NewProvider, Notification, Profile, ProfileUpdate, Rating,
        StreamingProvider, WatchlistEntry,
    },
};

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fails with `Conflict` when the id or username is taken
    async fn create_profile(&self, profile: NewProfile) -> AppResult<Profile>;
    async fn get_profile(&self, id: Uuid) -> AppResult<Option<Profile>>;
    async fn find_profile_by_username(&self, username: &str) -> AppResult<Option<Profile>>;
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<Option<Profile>>;
    /// Case-insensitive substring match on username or display name
    async fn search_profiles(
        &self,
        query: &str,
        exclude: Uuid,
        limit: i64,
    ) -> AppResult<Vec<Profile>>;
    async fn profiles_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Profile>>;
}

#[async_trait]
pub trait MovieStore: Send + Sync {
    /// Inserts or refreshes the row keyed by (media_type, tmdb_id)
    async fn upsert_movie(&self, movie: NewMovie) -> AppResult<Movie>;
    async fn get_movie(&self, id: Uuid) -> AppResult<Option<Movie>>;
    async fn movies_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Movie>>;
}

#[async_trait]
pub trait RatingStore: Send + Sync {
    /// Inserts or updates the single rating for (user, movie)
    async fn upsert_rating(
        &self,
        user_id: Uuid,
        movie_id: Uuid,
        score: i32,
        comment: Option<String>,
    ) -> AppResult<Rating>;
    async fn get_rating(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<Option<Rating>>;
    async fn delete_rating(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<bool>;
    /// Newest first
    async fn ratings_for_user(&self, user_id: Uuid) -> AppResult<Vec<Rating>>;
    /// Newest first, paginated
    async fn ratings_by_users(
        &self,
        user_ids: &[Uuid],
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Rating>>;
    /// Newest first
    async fn ratings_for_movie(&self, movie_id: Uuid) -> AppResult<Vec<Rating>>;
}

#[async_trait]
pub trait FriendshipStore: Send + Sync {
    async fn create_friendship(&self, requester_id: Uuid, addressee_id: Uuid)
        -> AppResult<Friendship>;
    async fn get_friendship(&self, id: Uuid) -> AppResult<Option<Friendship>>;
    /// The row linking `a` and `b` in either direction
    async fn friendship_between(&self, a: Uuid, b: Uuid) -> AppResult<Option<Friendship>>;
    /// Moves a pending request to `status`; `None` unless it was still pending
    async fn resolve_friend_request(
        &self,
        id: Uuid,
        status: FriendshipStatus,
    ) -> AppResult<Option<Friendship>>;
    async fn delete_friendship(&self, id: Uuid) -> AppResult<bool>;
    /// Rows where the user is either party, newest first
    async fn friendships_for_user(
        &self,
        user_id: Uuid,
        status: FriendshipStatus,
    ) -> AppResult<Vec<Friendship>>;
}

#[async_trait]
pub trait FollowStore: Send + Sync {
    /// Fails with `Conflict` when already following
    async fn create_follow(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<Follow>;
    async fn delete_follow(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<bool>;
    async fn get_follow(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<Option<Follow>>;
    /// Newest first
    async fn follows_for_user(&self, user_id: Uuid) -> AppResult<Vec<Follow>>;
}

#[async_trait]
pub trait WatchlistStore: Send + Sync {
    /// Fails with `Conflict` when already listed
    async fn add_to_watchlist(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<WatchlistEntry>;
    async fn remove_from_watchlist(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<bool>;
    async fn get_watchlist_entry(
        &self,
        user_id: Uuid,
        movie_id: Uuid,
    ) -> AppResult<Option<WatchlistEntry>>;
    /// Newest first
    async fn watchlist_for_user(&self, user_id: Uuid) -> AppResult<Vec<WatchlistEntry>>;
}

#[async_trait]
pub trait EpisodeStore: Send + Sync {
    /// Upserts on (movie_id, season_number, episode_number); returns rows written
    async fn upsert_episodes(&self, episodes: &[NewEpisode]) -> AppResult<u64>;
    /// Ordered by season, then episode
    async fn episodes_for_show(&self, movie_id: Uuid) -> AppResult<Vec<Episode>>;
    /// Episodes with `start <= air_date <= end`, ascending by air date
    async fn episodes_airing_between(
        &self,
        movie_ids: &[Uuid],
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<Episode>>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create_notification(&self, notification: NewNotification)
        -> AppResult<Notification>;
    /// Newest first
    async fn notifications_for_user(&self, user_id: Uuid, limit: i64)
        -> AppResult<Vec<Notification>>;
    async fn unread_count(&self, user_id: Uuid) -> AppResult<i64>;
    /// Only marks the notification if it belongs to `user_id`
    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> AppResult<bool>;
    async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64>;
}

#[async_trait]
pub trait ProviderStore: Send + Sync {
    /// Ascending by TMDB provider id, so the "All" sentinel comes first
    async fn list_providers(&self) -> AppResult<Vec<StreamingProvider>>;
    async fn providers_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<StreamingProvider>>;
    /// Upserts on tmdb_provider_id and returns the stored rows
    async fn upsert_providers(&self, providers: &[NewProvider])
        -> AppResult<Vec<StreamingProvider>>;
    async fn subscribed_providers(&self, user_id: Uuid) -> AppResult<Vec<StreamingProvider>>;
    /// Atomically replaces the user's whole subscription set
    async fn replace_subscriptions(&self, user_id: Uuid, provider_ids: &[Uuid]) -> AppResult<()>;
    /// Atomically replaces the providers a title is available on
    async fn replace_movie_providers(&self, movie_id: Uuid, provider_ids: &[Uuid])
        -> AppResult<()>;
    async fn providers_for_movie(&self, movie_id: Uuid) -> AppResult<Vec<StreamingProvider>>;
    /// Distinct titles available on any of the given providers
    async fn movie_ids_for_providers(&self, provider_ids: &[Uuid]) -> AppResult<Vec<Uuid>>;
}

/// Everything the application needs from persistence
pub trait Store:
    ProfileStore
    + MovieStore
    + RatingStore
    + FriendshipStore
    + FollowStore
    + WatchlistStore
    + EpisodeStore
    + NotificationStore
    + ProviderStore
{
}

impl<T> Store for T where
    T: ProfileStore
        + MovieStore
        + RatingStore
        + FriendshipStore
        + FollowStore
        + WatchlistStore
        + EpisodeStore
        + NotificationStore
        + ProviderStore
{
}
