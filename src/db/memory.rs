use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        Episode, Follow, Friendship, FriendshipStatus, Movie, NewEpisode, NewMovie,
        NewNotification, NewProfile, NewProvider, Notification, Profile, ProfileUpdate, Rating,
        StreamingProvider, WatchlistEntry, ALL_PROVIDERS_TMDB_ID,
    },
};

use super::store::{
    EpisodeStore, FollowStore, FriendshipStore, MovieStore, NotificationStore, ProfileStore,
    ProviderStore, RatingStore, WatchlistStore,
};

/// Process-local store used for `STORAGE=memory` and in tests.
///
/// Row collections are kept in insertion order, which is also creation
/// order, so "newest first" is a reverse walk.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

#[derive(Default)]
struct MemoryStoreInner {
    profiles: HashMap<Uuid, Profile>,
    movies: HashMap<Uuid, Movie>,
    ratings: Vec<Rating>,
    friendships: Vec<Friendship>,
    follows: Vec<Follow>,
    watchlist: Vec<WatchlistEntry>,
    episodes: Vec<Episode>,
    notifications: Vec<Notification>,
    providers: HashMap<Uuid, StreamingProvider>,
    subscriptions: HashSet<(Uuid, Uuid)>,
    movie_providers: HashSet<(Uuid, Uuid)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with the "All services" sentinel, as the migrations do
    pub async fn seeded() -> Self {
        let store = Self::new();
        store
            .upsert_providers(&[NewProvider {
                tmdb_provider_id: ALL_PROVIDERS_TMDB_ID,
                name: "All".to_string(),
                slug: "all".to_string(),
                logo_path: None,
            }])
            .await
            .ok();
        store
    }
}

/// Mirrors the foreign keys declared in `migrations/`, with the same
/// `NotFound` that a violated constraint maps to under Postgres
impl MemoryStoreInner {
    fn require_profile(&self, id: Uuid) -> AppResult<()> {
        if self.profiles.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Profile {} not found", id)))
        }
    }

    fn require_movie(&self, id: Uuid) -> AppResult<()> {
        if self.movies.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Movie {} not found", id)))
        }
    }

    fn require_providers(&self, ids: &[Uuid]) -> AppResult<()> {
        match ids.iter().find(|id| !self.providers.contains_key(id)) {
            Some(id) => Err(AppError::NotFound(format!("Provider {} not found", id))),
            None => Ok(()),
        }
    }
}

fn newest_first<T: Clone>(rows: &[T], keep: impl Fn(&T) -> bool) -> Vec<T> {
    rows.iter().rev().filter(|r| keep(r)).cloned().collect()
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn create_profile(&self, profile: NewProfile) -> AppResult<Profile> {
        let mut inner = self.inner.write().await;

        if inner.profiles.contains_key(&profile.id) {
            return Err(AppError::Conflict("Profile already exists".to_string()));
        }
        if inner
            .profiles
            .values()
            .any(|p| p.username.eq_ignore_ascii_case(&profile.username))
        {
            return Err(AppError::Conflict("Username is already taken".to_string()));
        }

        let now = Utc::now();
        let display_name = profile
            .display_name
            .unwrap_or_else(|| profile.username.clone());
        let created = Profile {
            id: profile.id,
            username: profile.username,
            display_name: Some(display_name),
            avatar_url: None,
            bio: None,
            onboarding_completed: false,
            created_at: now,
            updated_at: now,
        };
        inner.profiles.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_profile(&self, id: Uuid) -> AppResult<Option<Profile>> {
        Ok(self.inner.read().await.profiles.get(&id).cloned())
    }

    async fn find_profile_by_username(&self, username: &str) -> AppResult<Option<Profile>> {
        let inner = self.inner.read().await;
        Ok(inner
            .profiles
            .values()
            .find(|p| p.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<Option<Profile>> {
        let mut inner = self.inner.write().await;

        if let Some(username) = &update.username {
            if inner
                .profiles
                .values()
                .any(|p| p.id != id && p.username.eq_ignore_ascii_case(username))
            {
                return Err(AppError::Conflict("Username is already taken".to_string()));
            }
        }

        Ok(inner.profiles.get_mut(&id).map(|profile| {
            update.apply(profile);
            profile.clone()
        }))
    }

    async fn search_profiles(
        &self,
        query: &str,
        exclude: Uuid,
        limit: i64,
    ) -> AppResult<Vec<Profile>> {
        let inner = self.inner.read().await;
        let mut found: Vec<Profile> = inner
            .profiles
            .values()
            .filter(|p| p.id != exclude && p.matches(query))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.username.cmp(&b.username));
        found.truncate(limit.max(0) as usize);
        Ok(found)
    }

    async fn profiles_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Profile>> {
        let inner = self.inner.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| inner.profiles.get(id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MovieStore for MemoryStore {
    async fn upsert_movie(&self, movie: NewMovie) -> AppResult<Movie> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();

        let existing = inner
            .movies
            .values()
            .find(|m| m.media_type == movie.media_type && m.tmdb_id == movie.tmdb_id)
            .map(|m| (m.id, m.created_at));
        let (id, created_at) = existing.unwrap_or((Uuid::new_v4(), now));

        let stored = Movie {
            id,
            tmdb_id: movie.tmdb_id,
            media_type: movie.media_type,
            title: movie.title,
            overview: movie.overview,
            poster_path: movie.poster_path,
            backdrop_path: movie.backdrop_path,
            release_date: movie.release_date,
            vote_average: movie.vote_average,
            genres: movie.genres,
            runtime: movie.runtime,
            number_of_seasons: movie.number_of_seasons,
            created_at,
            updated_at: now,
        };
        inner.movies.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_movie(&self, id: Uuid) -> AppResult<Option<Movie>> {
        Ok(self.inner.read().await.movies.get(&id).cloned())
    }

    async fn movies_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Movie>> {
        let inner = self.inner.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| inner.movies.get(id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RatingStore for MemoryStore {
    async fn upsert_rating(
        &self,
        user_id: Uuid,
        movie_id: Uuid,
        score: i32,
        comment: Option<String>,
    ) -> AppResult<Rating> {
        let mut inner = self.inner.write().await;
        inner.require_profile(user_id)?;
        inner.require_movie(movie_id)?;
        let now = Utc::now();

        if let Some(existing) = inner
            .ratings
            .iter_mut()
            .find(|r| r.user_id == user_id && r.movie_id == movie_id)
        {
            existing.score = score;
            existing.comment = comment;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let rating = Rating {
            id: Uuid::new_v4(),
            user_id,
            movie_id,
            score,
            comment,
            created_at: now,
            updated_at: now,
        };
        inner.ratings.push(rating.clone());
        Ok(rating)
    }

    async fn get_rating(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<Option<Rating>> {
        let inner = self.inner.read().await;
        Ok(inner
            .ratings
            .iter()
            .find(|r| r.user_id == user_id && r.movie_id == movie_id)
            .cloned())
    }

    async fn delete_rating(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.ratings.len();
        inner
            .ratings
            .retain(|r| !(r.user_id == user_id && r.movie_id == movie_id));
        Ok(inner.ratings.len() != before)
    }

    async fn ratings_for_user(&self, user_id: Uuid) -> AppResult<Vec<Rating>> {
        let inner = self.inner.read().await;
        Ok(newest_first(&inner.ratings, |r| r.user_id == user_id))
    }

    async fn ratings_by_users(
        &self,
        user_ids: &[Uuid],
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Rating>> {
        let inner = self.inner.read().await;
        Ok(newest_first(&inner.ratings, |r| user_ids.contains(&r.user_id))
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn ratings_for_movie(&self, movie_id: Uuid) -> AppResult<Vec<Rating>> {
        let inner = self.inner.read().await;
        Ok(newest_first(&inner.ratings, |r| r.movie_id == movie_id))
    }
}

#[async_trait]
impl FriendshipStore for MemoryStore {
    async fn create_friendship(
        &self,
        requester_id: Uuid,
        addressee_id: Uuid,
    ) -> AppResult<Friendship> {
        let mut inner = self.inner.write().await;
        inner.require_profile(requester_id)?;
        inner.require_profile(addressee_id)?;

        if inner
            .friendships
            .iter()
            .any(|f| f.links(requester_id, addressee_id))
        {
            return Err(AppError::Conflict("Friendship already exists".to_string()));
        }

        let now = Utc::now();
        let friendship = Friendship {
            id: Uuid::new_v4(),
            requester_id,
            addressee_id,
            status: FriendshipStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        inner.friendships.push(friendship.clone());
        Ok(friendship)
    }

    async fn get_friendship(&self, id: Uuid) -> AppResult<Option<Friendship>> {
        let inner = self.inner.read().await;
        Ok(inner.friendships.iter().find(|f| f.id == id).cloned())
    }

    async fn friendship_between(&self, a: Uuid, b: Uuid) -> AppResult<Option<Friendship>> {
        let inner = self.inner.read().await;
        Ok(inner.friendships.iter().find(|f| f.links(a, b)).cloned())
    }

    async fn resolve_friend_request(
        &self,
        id: Uuid,
        status: FriendshipStatus,
    ) -> AppResult<Option<Friendship>> {
        let mut inner = self.inner.write().await;
        let pending = inner
            .friendships
            .iter_mut()
            .find(|f| f.id == id && f.status == FriendshipStatus::Pending);
        Ok(pending.map(|f| {
            f.status = status;
            f.updated_at = Utc::now();
            f.clone()
        }))
    }

    async fn delete_friendship(&self, id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.friendships.len();
        inner.friendships.retain(|f| f.id != id);
        Ok(inner.friendships.len() != before)
    }

    async fn friendships_for_user(
        &self,
        user_id: Uuid,
        status: FriendshipStatus,
    ) -> AppResult<Vec<Friendship>> {
        let inner = self.inner.read().await;
        Ok(newest_first(&inner.friendships, |f| {
            f.status == status && f.involves(user_id)
        }))
    }
}

#[async_trait]
impl FollowStore for MemoryStore {
    async fn create_follow(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<Follow> {
        let mut inner = self.inner.write().await;
        inner.require_profile(user_id)?;
        inner.require_movie(movie_id)?;
        if inner
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.movie_id == movie_id)
        {
            return Err(AppError::Conflict("Already following this show".to_string()));
        }

        let follow = Follow {
            id: Uuid::new_v4(),
            user_id,
            movie_id,
            created_at: Utc::now(),
        };
        inner.follows.push(follow.clone());
        Ok(follow)
    }

    async fn delete_follow(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.follows.len();
        inner
            .follows
            .retain(|f| !(f.user_id == user_id && f.movie_id == movie_id));
        Ok(inner.follows.len() != before)
    }

    async fn get_follow(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<Option<Follow>> {
        let inner = self.inner.read().await;
        Ok(inner
            .follows
            .iter()
            .find(|f| f.user_id == user_id && f.movie_id == movie_id)
            .cloned())
    }

    async fn follows_for_user(&self, user_id: Uuid) -> AppResult<Vec<Follow>> {
        let inner = self.inner.read().await;
        Ok(newest_first(&inner.follows, |f| f.user_id == user_id))
    }
}

#[async_trait]
impl WatchlistStore for MemoryStore {
    async fn add_to_watchlist(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<WatchlistEntry> {
        let mut inner = self.inner.write().await;
        inner.require_profile(user_id)?;
        inner.require_movie(movie_id)?;
        if inner
            .watchlist
            .iter()
            .any(|w| w.user_id == user_id && w.movie_id == movie_id)
        {
            return Err(AppError::Conflict("Already on the watchlist".to_string()));
        }

        let entry = WatchlistEntry {
            id: Uuid::new_v4(),
            user_id,
            movie_id,
            created_at: Utc::now(),
        };
        inner.watchlist.push(entry.clone());
        Ok(entry)
    }

    async fn remove_from_watchlist(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.watchlist.len();
        inner
            .watchlist
            .retain(|w| !(w.user_id == user_id && w.movie_id == movie_id));
        Ok(inner.watchlist.len() != before)
    }

    async fn get_watchlist_entry(
        &self,
        user_id: Uuid,
        movie_id: Uuid,
    ) -> AppResult<Option<WatchlistEntry>> {
        let inner = self.inner.read().await;
        Ok(inner
            .watchlist
            .iter()
            .find(|w| w.user_id == user_id && w.movie_id == movie_id)
            .cloned())
    }

    async fn watchlist_for_user(&self, user_id: Uuid) -> AppResult<Vec<WatchlistEntry>> {
        let inner = self.inner.read().await;
        Ok(newest_first(&inner.watchlist, |w| w.user_id == user_id))
    }
}

#[async_trait]
impl EpisodeStore for MemoryStore {
    async fn upsert_episodes(&self, episodes: &[NewEpisode]) -> AppResult<u64> {
        let mut inner = self.inner.write().await;
        for new in episodes {
            inner.require_movie(new.movie_id)?;
        }

        for new in episodes {
            let existing = inner.episodes.iter().position(|e| {
                e.movie_id == new.movie_id
                    && e.season_number == new.season_number
                    && e.episode_number == new.episode_number
            });

            match existing {
                Some(idx) => {
                    let episode = &mut inner.episodes[idx];
                    episode.name = new.name.clone();
                    episode.overview = new.overview.clone();
                    episode.air_date = new.air_date;
                    episode.still_path = new.still_path.clone();
                    episode.runtime = new.runtime;
                }
                None => inner.episodes.push(Episode {
                    id: Uuid::new_v4(),
                    movie_id: new.movie_id,
                    season_number: new.season_number,
                    episode_number: new.episode_number,
                    name: new.name.clone(),
                    overview: new.overview.clone(),
                    air_date: new.air_date,
                    still_path: new.still_path.clone(),
                    runtime: new.runtime,
                    created_at: Utc::now(),
                }),
            }
        }

        Ok(episodes.len() as u64)
    }

    async fn episodes_for_show(&self, movie_id: Uuid) -> AppResult<Vec<Episode>> {
        let inner = self.inner.read().await;
        let mut found: Vec<Episode> = inner
            .episodes
            .iter()
            .filter(|e| e.movie_id == movie_id)
            .cloned()
            .collect();
        found.sort_by_key(|e| (e.season_number, e.episode_number));
        Ok(found)
    }

    async fn episodes_airing_between(
        &self,
        movie_ids: &[Uuid],
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<Episode>> {
        let inner = self.inner.read().await;
        let mut found: Vec<Episode> = inner
            .episodes
            .iter()
            .filter(|e| movie_ids.contains(&e.movie_id))
            .filter(|e| e.air_date.is_some_and(|d| start <= d && d <= end))
            .cloned()
            .collect();
        found.sort_by_key(|e| e.air_date);
        Ok(found)
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> AppResult<Notification> {
        let mut inner = self.inner.write().await;
        inner.require_profile(notification.user_id)?;
        let created = Notification {
            id: Uuid::new_v4(),
            user_id: notification.user_id,
            kind: notification.kind,
            title: notification.title,
            body: notification.body,
            data: notification.data,
            read: false,
            created_at: Utc::now(),
        };
        inner.notifications.push(created.clone());
        Ok(created)
    }

    async fn notifications_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<Notification>> {
        let inner = self.inner.read().await;
        let mut found = newest_first(&inner.notifications, |n| n.user_id == user_id);
        found.truncate(limit.max(0) as usize);
        Ok(found)
    }

    async fn unread_count(&self, user_id: Uuid) -> AppResult<i64> {
        let inner = self.inner.read().await;
        Ok(inner
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.read)
            .count() as i64)
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        match inner
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
        {
            Some(notification) => {
                notification.read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64> {
        let mut inner = self.inner.write().await;
        let mut marked = 0;
        for notification in inner
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.read)
        {
            notification.read = true;
            marked += 1;
        }
        Ok(marked)
    }
}

#[async_trait]
impl ProviderStore for MemoryStore {
    async fn list_providers(&self) -> AppResult<Vec<StreamingProvider>> {
        let inner = self.inner.read().await;
        let mut providers: Vec<StreamingProvider> = inner.providers.values().cloned().collect();
        providers.sort_by_key(|p| p.tmdb_provider_id);
        Ok(providers)
    }

    async fn providers_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<StreamingProvider>> {
        let inner = self.inner.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| inner.providers.get(id))
            .cloned()
            .collect())
    }

    async fn upsert_providers(
        &self,
        providers: &[NewProvider],
    ) -> AppResult<Vec<StreamingProvider>> {
        let mut inner = self.inner.write().await;
        let mut stored = Vec::with_capacity(providers.len());

        for new in providers {
            let id = inner
                .providers
                .values()
                .find(|p| p.tmdb_provider_id == new.tmdb_provider_id)
                .map(|p| p.id)
                .unwrap_or_else(Uuid::new_v4);

            let provider = StreamingProvider {
                id,
                tmdb_provider_id: new.tmdb_provider_id,
                name: new.name.clone(),
                slug: new.slug.clone(),
                logo_path: new.logo_path.clone(),
            };
            inner.providers.insert(id, provider.clone());
            stored.push(provider);
        }

        Ok(stored)
    }

    async fn subscribed_providers(&self, user_id: Uuid) -> AppResult<Vec<StreamingProvider>> {
        let inner = self.inner.read().await;
        let mut providers: Vec<StreamingProvider> = inner
            .subscriptions
            .iter()
            .filter(|(user, _)| *user == user_id)
            .filter_map(|(_, provider_id)| inner.providers.get(provider_id))
            .cloned()
            .collect();
        providers.sort_by_key(|p| p.tmdb_provider_id);
        Ok(providers)
    }

    async fn replace_subscriptions(&self, user_id: Uuid, provider_ids: &[Uuid]) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.require_profile(user_id)?;
        inner.require_providers(provider_ids)?;
        inner.subscriptions.retain(|(user, _)| *user != user_id);
        inner
            .subscriptions
            .extend(provider_ids.iter().map(|provider_id| (user_id, *provider_id)));
        Ok(())
    }

    async fn replace_movie_providers(
        &self,
        movie_id: Uuid,
        provider_ids: &[Uuid],
    ) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.require_movie(movie_id)?;
        inner.require_providers(provider_ids)?;
        inner.movie_providers.retain(|(movie, _)| *movie != movie_id);
        inner
            .movie_providers
            .extend(provider_ids.iter().map(|provider_id| (movie_id, *provider_id)));
        Ok(())
    }

    async fn providers_for_movie(&self, movie_id: Uuid) -> AppResult<Vec<StreamingProvider>> {
        let inner = self.inner.read().await;
        let mut providers: Vec<StreamingProvider> = inner
            .movie_providers
            .iter()
            .filter(|(movie, _)| *movie == movie_id)
            .filter_map(|(_, provider_id)| inner.providers.get(provider_id))
            .cloned()
            .collect();
        providers.sort_by_key(|p| p.tmdb_provider_id);
        Ok(providers)
    }

    async fn movie_ids_for_providers(&self, provider_ids: &[Uuid]) -> AppResult<Vec<Uuid>> {
        let inner = self.inner.read().await;
        let ids: HashSet<Uuid> = inner
            .movie_providers
            .iter()
            .filter(|(_, provider)| provider_ids.contains(provider))
            .map(|(movie, _)| *movie)
            .collect();
        Ok(ids.into_iter().collect())
    }
}
