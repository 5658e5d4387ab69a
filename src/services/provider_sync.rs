use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{NewProvider, StreamingProvider},
    services::movies::get_movie,
    state::AppState,
};

/// ISO 3166-1 alpha-2 code, upper-cased
fn normalize_country(raw: &str) -> AppResult<String> {
    let code = raw.trim();
    if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code.to_ascii_uppercase())
    } else {
        Err(AppError::InvalidInput(format!(
            "Country must be a two-letter code, got {:?}",
            raw
        )))
    }
}

/// Mirrors the title's subscription ("flatrate") offers in `country`
/// (default: the configured region) into the provider catalogue and the
/// title's provider links
pub async fn sync_movie_providers(
    state: &AppState,
    movie_id: Uuid,
    country: Option<&str>,
) -> AppResult<Vec<StreamingProvider>> {
    let region = match country {
        Some(raw) => normalize_country(raw)?,
        None => state.watch_region.clone(),
    };
    let movie = get_movie(state, movie_id).await?;
    let offers = state
        .metadata
        .watch_providers(movie.media_type, movie.tmdb_id)
        .await?;

    let flatrate = offers.flatrate_for(&region);
    if flatrate.is_empty() {
        state.store.replace_movie_providers(movie_id, &[]).await?;
        tracing::info!(
            movie_id = %movie_id,
            region = %region,
            "No subscription offers, provider links cleared"
        );
        return Ok(vec![]);
    }

    let new_providers: Vec<NewProvider> = flatrate.iter().map(NewProvider::from).collect();
    let providers = state.store.upsert_providers(&new_providers).await?;
    let provider_ids: Vec<Uuid> = providers.iter().map(|p| p.id).collect();
    state
        .store
        .replace_movie_providers(movie_id, &provider_ids)
        .await?;

    tracing::info!(
        movie_id = %movie_id,
        region = %region,
        provider_count = providers.len(),
        "Movie providers synced"
    );

    Ok(providers)
}
