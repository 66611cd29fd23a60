//! Startup seeding of the demo catalog.

use fluxflix_core::catalog::{CatalogError, CatalogStore};
use fluxflix_core::movie::{Movie, MovieId};
use rand::Rng;

/// Genres a seeded movie is drawn from.
pub const GENRES: [&str; 5] = ["horror", "romcom", "drama", "action", "docu"];

/// Titles loaded into an empty demo catalog.
pub const DEMO_TITLES: [&str; 8] = [
    "Aeon Flux",
    "Enter the Mono<Void>",
    "The Fluxinator",
    "Silence of the Lambdas",
    "Reactive Mongos on Plane",
    "Y Tu Mono Tambien",
    "Attack of the fluxxes",
    "Back to the Future",
];

/// Replace the catalog contents with one freshly keyed movie per title.
///
/// Each movie gets a UUID key and a genre drawn uniformly from [`GENRES`].
/// Returns the inserted movies in input order.
///
/// # Errors
///
/// Returns the first store failure; movies inserted before it stay in place.
pub async fn seed_catalog<R>(
    store: &dyn CatalogStore,
    titles: &[&str],
    rng: &mut R,
) -> Result<Vec<Movie>, CatalogError>
where
    R: Rng + ?Sized,
{
    let movies: Vec<Movie> = titles
        .iter()
        .map(|title| {
            let genre = GENRES[rng.gen_range(0..GENRES.len())];
            Movie::new(MovieId::generate(), *title, genre)
        })
        .collect();

    let removed = store.delete_all().await?;
    tracing::debug!(removed, "Cleared catalog before seeding");

    for movie in &movies {
        store.insert(movie.clone()).await?;
        tracing::info!(
            movie_id = %movie.id,
            title = %movie.title,
            genre = %movie.genre,
            "Seeded movie"
        );
    }

    Ok(movies)
}
