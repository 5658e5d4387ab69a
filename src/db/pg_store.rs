use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        Episode, Follow, Friendship, FriendshipStatus, Movie, NewEpisode, NewMovie,
        NewNotification, NewProfile, NewProvider, Notification, Profile, ProfileUpdate, Rating,
        StreamingProvider, WatchlistEntry,
    },
};

use super::store::{
    EpisodeStore, FollowStore, FriendshipStore, MovieStore, NotificationStore, ProfileStore,
    ProviderStore, RatingStore, WatchlistStore,
};

/// `Store` backed by PostgreSQL
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Wraps user input for ILIKE, escaping the pattern metacharacters
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn create_profile(&self, profile: NewProfile) -> AppResult<Profile> {
        let created = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, username, display_name)
            VALUES ($1, $2, COALESCE($3, $2))
            RETURNING *
            "#,
        )
        .bind(profile.id)
        .bind(&profile.username)
        .bind(&profile.display_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn get_profile(&self, id: Uuid) -> AppResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn find_profile_by_username(&self, username: &str) -> AppResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT * FROM profiles WHERE lower(username) = lower($1)",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET username = COALESCE($2, username),
                display_name = COALESCE($3, display_name),
                avatar_url = COALESCE($4, avatar_url),
                bio = COALESCE($5, bio),
                onboarding_completed = COALESCE($6, onboarding_completed),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.username)
        .bind(&update.display_name)
        .bind(&update.avatar_url)
        .bind(&update.bio)
        .bind(update.onboarding_completed)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn search_profiles(
        &self,
        query: &str,
        exclude: Uuid,
        limit: i64,
    ) -> AppResult<Vec<Profile>> {
        let profiles = sqlx::query_as::<_, Profile>(
            r#"
            SELECT * FROM profiles
            WHERE id <> $1 AND (username ILIKE $2 OR display_name ILIKE $2)
            ORDER BY username
            LIMIT $3
            "#,
        )
        .bind(exclude)
        .bind(like_pattern(query))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(profiles)
    }

    async fn profiles_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Profile>> {
        let profiles = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(profiles)
    }
}

#[async_trait]
impl MovieStore for PgStore {
    async fn upsert_movie(&self, movie: NewMovie) -> AppResult<Movie> {
        let stored = sqlx::query_as::<_, Movie>(
            r#"
            INSERT INTO movies (
                tmdb_id, media_type, title, overview, poster_path, backdrop_path,
                release_date, vote_average, genres, runtime, number_of_seasons
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (media_type, tmdb_id) DO UPDATE SET
                title = EXCLUDED.title,
                overview = EXCLUDED.overview,
                poster_path = EXCLUDED.poster_path,
                backdrop_path = EXCLUDED.backdrop_path,
                release_date = EXCLUDED.release_date,
                vote_average = EXCLUDED.vote_average,
                genres = EXCLUDED.genres,
                runtime = EXCLUDED.runtime,
                number_of_seasons = EXCLUDED.number_of_seasons,
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(movie.tmdb_id)
        .bind(movie.media_type)
        .bind(&movie.title)
        .bind(&movie.overview)
        .bind(&movie.poster_path)
        .bind(&movie.backdrop_path)
        .bind(movie.release_date)
        .bind(movie.vote_average)
        .bind(&movie.genres)
        .bind(movie.runtime)
        .bind(movie.number_of_seasons)
        .fetch_one(&self.pool)
        .await?;
        Ok(stored)
    }

    async fn get_movie(&self, id: Uuid) -> AppResult<Option<Movie>> {
        let movie = sqlx::query_as::<_, Movie>("SELECT * FROM movies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(movie)
    }

    async fn movies_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Movie>> {
        let movies = sqlx::query_as::<_, Movie>("SELECT * FROM movies WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(movies)
    }
}

#[async_trait]
impl RatingStore for PgStore {
    async fn upsert_rating(
        &self,
        user_id: Uuid,
        movie_id: Uuid,
        score: i32,
        comment: Option<String>,
    ) -> AppResult<Rating> {
        let rating = sqlx::query_as::<_, Rating>(
            r#"
            INSERT INTO ratings (user_id, movie_id, score, comment)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, movie_id) DO UPDATE SET
                score = EXCLUDED.score,
                comment = EXCLUDED.comment,
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(movie_id)
        .bind(score)
        .bind(comment)
        .fetch_one(&self.pool)
        .await?;
        Ok(rating)
    }

    async fn get_rating(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<Option<Rating>> {
        let rating = sqlx::query_as::<_, Rating>(
            "SELECT * FROM ratings WHERE user_id = $1 AND movie_id = $2",
        )
        .bind(user_id)
        .bind(movie_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rating)
    }

    async fn delete_rating(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM ratings WHERE user_id = $1 AND movie_id = $2")
            .bind(user_id)
            .bind(movie_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ratings_for_user(&self, user_id: Uuid) -> AppResult<Vec<Rating>> {
        let ratings = sqlx::query_as::<_, Rating>(
            "SELECT * FROM ratings WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ratings)
    }

    async fn ratings_by_users(
        &self,
        user_ids: &[Uuid],
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Rating>> {
        let ratings = sqlx::query_as::<_, Rating>(
            r#"
            SELECT * FROM ratings
            WHERE user_id = ANY($1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_ids)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(ratings)
    }

    async fn ratings_for_movie(&self, movie_id: Uuid) -> AppResult<Vec<Rating>> {
        let ratings = sqlx::query_as::<_, Rating>(
            "SELECT * FROM ratings WHERE movie_id = $1 ORDER BY created_at DESC",
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ratings)
    }
}

#[async_trait]
impl FriendshipStore for PgStore {
    async fn create_friendship(
        &self,
        requester_id: Uuid,
        addressee_id: Uuid,
    ) -> AppResult<Friendship> {
        let friendship = sqlx::query_as::<_, Friendship>(
            r#"
            INSERT INTO friendships (requester_id, addressee_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(requester_id)
        .bind(addressee_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(friendship)
    }

    async fn get_friendship(&self, id: Uuid) -> AppResult<Option<Friendship>> {
        let friendship = sqlx::query_as::<_, Friendship>("SELECT * FROM friendships WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(friendship)
    }

    async fn friendship_between(&self, a: Uuid, b: Uuid) -> AppResult<Option<Friendship>> {
        let friendship = sqlx::query_as::<_, Friendship>(
            r#"
            SELECT * FROM friendships
            WHERE (requester_id = $1 AND addressee_id = $2)
               OR (requester_id = $2 AND addressee_id = $1)
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_optional(&self.pool)
        .await?;
        Ok(friendship)
    }

    async fn resolve_friend_request(
        &self,
        id: Uuid,
        status: FriendshipStatus,
    ) -> AppResult<Option<Friendship>> {
        let friendship = sqlx::query_as::<_, Friendship>(
            r#"
            UPDATE friendships
            SET status = $2, updated_at = now()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(friendship)
    }

    async fn delete_friendship(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM friendships WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn friendships_for_user(
        &self,
        user_id: Uuid,
        status: FriendshipStatus,
    ) -> AppResult<Vec<Friendship>> {
        let friendships = sqlx::query_as::<_, Friendship>(
            r#"
            SELECT * FROM friendships
            WHERE status = $2 AND (requester_id = $1 OR addressee_id = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(friendships)
    }
}

#[async_trait]
impl FollowStore for PgStore {
    async fn create_follow(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<Follow> {
        let follow = sqlx::query_as::<_, Follow>(
            "INSERT INTO follows (user_id, movie_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(user_id)
        .bind(movie_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(follow)
    }

    async fn delete_follow(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND movie_id = $2")
            .bind(user_id)
            .bind(movie_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_follow(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<Option<Follow>> {
        let follow = sqlx::query_as::<_, Follow>(
            "SELECT * FROM follows WHERE user_id = $1 AND movie_id = $2",
        )
        .bind(user_id)
        .bind(movie_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(follow)
    }

    async fn follows_for_user(&self, user_id: Uuid) -> AppResult<Vec<Follow>> {
        let follows = sqlx::query_as::<_, Follow>(
            "SELECT * FROM follows WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(follows)
    }
}

#[async_trait]
impl WatchlistStore for PgStore {
    async fn add_to_watchlist(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<WatchlistEntry> {
        let entry = sqlx::query_as::<_, WatchlistEntry>(
            "INSERT INTO watchlist (user_id, movie_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(user_id)
        .bind(movie_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(entry)
    }

    async fn remove_from_watchlist(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM watchlist WHERE user_id = $1 AND movie_id = $2")
            .bind(user_id)
            .bind(movie_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_watchlist_entry(
        &self,
        user_id: Uuid,
        movie_id: Uuid,
    ) -> AppResult<Option<WatchlistEntry>> {
        let entry = sqlx::query_as::<_, WatchlistEntry>(
            "SELECT * FROM watchlist WHERE user_id = $1 AND movie_id = $2",
        )
        .bind(user_id)
        .bind(movie_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entry)
    }

    async fn watchlist_for_user(&self, user_id: Uuid) -> AppResult<Vec<WatchlistEntry>> {
        let entries = sqlx::query_as::<_, WatchlistEntry>(
            "SELECT * FROM watchlist WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}

#[async_trait]
impl EpisodeStore for PgStore {
    async fn upsert_episodes(&self, episodes: &[NewEpisode]) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;
        let mut written = 0;

        for episode in episodes {
            let result = sqlx::query(
                r#"
                INSERT INTO episodes (
                    movie_id, season_number, episode_number, name, overview,
                    air_date, still_path, runtime
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (movie_id, season_number, episode_number) DO UPDATE SET
                    name = EXCLUDED.name,
                    overview = EXCLUDED.overview,
                    air_date = EXCLUDED.air_date,
                    still_path = EXCLUDED.still_path,
                    runtime = EXCLUDED.runtime
                "#,
            )
            .bind(episode.movie_id)
            .bind(episode.season_number)
            .bind(episode.episode_number)
            .bind(&episode.name)
            .bind(&episode.overview)
            .bind(episode.air_date)
            .bind(&episode.still_path)
            .bind(episode.runtime)
            .execute(&mut *tx)
            .await?;
            written += result.rows_affected();
        }

        tx.commit().await?;
        Ok(written)
    }

    async fn episodes_for_show(&self, movie_id: Uuid) -> AppResult<Vec<Episode>> {
        let episodes = sqlx::query_as::<_, Episode>(
            r#"
            SELECT * FROM episodes
            WHERE movie_id = $1
            ORDER BY season_number, episode_number
            "#,
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(episodes)
    }

    async fn episodes_airing_between(
        &self,
        movie_ids: &[Uuid],
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<Episode>> {
        let episodes = sqlx::query_as::<_, Episode>(
            r#"
            SELECT * FROM episodes
            WHERE movie_id = ANY($1) AND air_date BETWEEN $2 AND $3
            ORDER BY air_date, season_number, episode_number
            "#,
        )
        .bind(movie_ids)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(episodes)
    }
}

#[async_trait]
impl NotificationStore for PgStore {
    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> AppResult<Notification> {
        let created = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (user_id, type, title, body, data)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(notification.user_id)
        .bind(notification.kind)
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(&notification.data)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn notifications_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(notifications)
    }

    async fn unread_count(&self, user_id: Uuid) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT read",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let result =
            sqlx::query("UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64> {
        let result =
            sqlx::query("UPDATE notifications SET read = TRUE WHERE user_id = $1 AND NOT read")
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ProviderStore for PgStore {
    async fn list_providers(&self) -> AppResult<Vec<StreamingProvider>> {
        let providers = sqlx::query_as::<_, StreamingProvider>(
            "SELECT * FROM streaming_providers ORDER BY tmdb_provider_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(providers)
    }

    async fn providers_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<StreamingProvider>> {
        let providers = sqlx::query_as::<_, StreamingProvider>(
            "SELECT * FROM streaming_providers WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(providers)
    }

    async fn upsert_providers(
        &self,
        providers: &[NewProvider],
    ) -> AppResult<Vec<StreamingProvider>> {
        let mut tx = self.pool.begin().await?;
        let mut stored = Vec::with_capacity(providers.len());

        for provider in providers {
            let row = sqlx::query_as::<_, StreamingProvider>(
                r#"
                INSERT INTO streaming_providers (tmdb_provider_id, name, slug, logo_path)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (tmdb_provider_id) DO UPDATE SET
                    name = EXCLUDED.name,
                    slug = EXCLUDED.slug,
                    logo_path = EXCLUDED.logo_path
                RETURNING *
                "#,
            )
            .bind(provider.tmdb_provider_id)
            .bind(&provider.name)
            .bind(&provider.slug)
            .bind(&provider.logo_path)
            .fetch_one(&mut *tx)
            .await?;
            stored.push(row);
        }

        tx.commit().await?;
        Ok(stored)
    }

    async fn subscribed_providers(&self, user_id: Uuid) -> AppResult<Vec<StreamingProvider>> {
        let providers = sqlx::query_as::<_, StreamingProvider>(
            r#"
            SELECT sp.* FROM streaming_providers sp
            JOIN user_streaming_providers usp ON usp.provider_id = sp.id
            WHERE usp.user_id = $1
            ORDER BY sp.tmdb_provider_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(providers)
    }

    async fn replace_subscriptions(&self, user_id: Uuid, provider_ids: &[Uuid]) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM user_streaming_providers WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if !provider_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO user_streaming_providers (user_id, provider_id)
                SELECT $1, unnest($2::uuid[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(provider_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn replace_movie_providers(
        &self,
        movie_id: Uuid,
        provider_ids: &[Uuid],
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM movie_providers WHERE movie_id = $1")
            .bind(movie_id)
            .execute(&mut *tx)
            .await?;

        if !provider_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO movie_providers (movie_id, provider_id)
                SELECT $1, unnest($2::uuid[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(movie_id)
            .bind(provider_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn providers_for_movie(&self, movie_id: Uuid) -> AppResult<Vec<StreamingProvider>> {
        let providers = sqlx::query_as::<_, StreamingProvider>(
            r#"
            SELECT sp.* FROM streaming_providers sp
            JOIN movie_providers mp ON mp.provider_id = sp.id
            WHERE mp.movie_id = $1
            ORDER BY sp.tmdb_provider_id
            "#,
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(providers)
    }

    async fn movie_ids_for_providers(&self, provider_ids: &[Uuid]) -> AppResult<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT DISTINCT movie_id FROM movie_providers WHERE provider_id = ANY($1)",
        )
        .bind(provider_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }
}
