pub mod episode;
pub mod follow;
pub mod friendship;
pub mod movie;
pub mod notification;
pub mod profile;
pub mod provider;
pub mod rating;
pub mod tmdb;

pub use episode::{Episode, EpisodeWithShow, NewEpisode};
pub use follow::{Follow, FollowWithMovie, WatchlistEntry, WatchlistEntryWithMovie};
pub use friendship::{FriendView, Friendship, FriendshipStatus};
pub use movie::{MediaType, Movie, NewMovie};
pub use notification::{NewNotification, Notification, NotificationType};
pub use profile::{validate_username, NewProfile, Profile, ProfileUpdate};
pub use provider::{slugify, NewProvider, StreamingProvider, ALL_PROVIDERS_TMDB_ID};
pub use rating::{FeedItem, Rating, RatingWithMovie, RatingWithProfile, MAX_SCORE, MIN_SCORE};
pub use tmdb::{
    TitleDetails, TmdbCountryProviders, TmdbEpisode, TmdbGenre, TmdbMovieDetails,
    TmdbProviderEntry, TmdbSearchResponse, TmdbSearchResult, TmdbSeason, TmdbSeasonDetails,
    TmdbTvDetails, TmdbWatchProviders,
};
