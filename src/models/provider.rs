use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::tmdb::TmdbProviderEntry;

/// TMDB provider id reserved for the "All services" choice
pub const ALL_PROVIDERS_TMDB_ID: i32 = 0;

/// A streaming service a user can subscribe to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct StreamingProvider {
    pub id: Uuid,
    pub tmdb_provider_id: i32,
    pub name: String,
    pub slug: String,
    pub logo_path: Option<String>,
}

impl StreamingProvider {
    /// Whether this is the "All services" sentinel, which disables filtering
    pub fn is_all(&self) -> bool {
        self.tmdb_provider_id == ALL_PROVIDERS_TMDB_ID
    }
}

/// Provider row upserted on `tmdb_provider_id`
#[derive(Debug, Clone, PartialEq)]
pub struct NewProvider {
    pub tmdb_provider_id: i32,
    pub name: String,
    pub slug: String,
    pub logo_path: Option<String>,
}

impl From<&TmdbProviderEntry> for NewProvider {
    fn from(entry: &TmdbProviderEntry) -> Self {
        Self {
            tmdb_provider_id: entry.provider_id,
            name: entry.provider_name.clone(),
            slug: slugify(&entry.provider_name),
            logo_path: entry.logo_path.clone(),
        }
    }
}

/// Lowercases and collapses every run of non-alphanumerics into one `-`,
/// with no leading or trailing dash ("Disney Plus" -> "disney-plus")
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Netflix"), "netflix");
        assert_eq!(slugify("Disney Plus"), "disney-plus");
    }

    #[test]
    fn test_slugify_collapses_and_trims() {
        assert_eq!(slugify("Amazon Prime Video"), "amazon-prime-video");
        assert_eq!(slugify("  Apple TV+  "), "apple-tv");
        assert_eq!(slugify("Paramount+ with Showtime"), "paramount-with-showtime");
        assert_eq!(slugify("--MUBI--"), "mubi");
    }

    #[test]
    fn test_new_provider_from_tmdb_entry() {
        let entry = TmdbProviderEntry {
            provider_id: 8,
            provider_name: "Netflix".to_string(),
            logo_path: Some("/netflix.jpg".to_string()),
            display_priority: Some(1),
        };

        let provider = NewProvider::from(&entry);
        assert_eq!(provider.tmdb_provider_id, 8);
        assert_eq!(provider.slug, "netflix");
        assert_eq!(provider.logo_path.as_deref(), Some("/netflix.jpg"));
    }
}
