//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open the configured backend through `filmorate_core` and report on it.
//! - Keep output deterministic for quick local sanity checks.

use filmorate_core::{CoreConfig, FilmService, Stores, UserService};
use log::info;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("filmorate: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = CoreConfig::from_env().map_err(|err| err.to_string())?;
    filmorate_core::init_from_config(&config)?;

    let stores = Stores::open(&config.storage).map_err(|err| err.to_string())?;
    let users = UserService::from_stores(&stores);
    let films = FilmService::from_stores(&stores);

    let user_count = users.get_users_list().map_err(|err| err.to_string())?.len();
    let film_count = films.get_films_list().map_err(|err| err.to_string())?.len();
    let genre_count = films.list_genres().map_err(|err| err.to_string())?.len();
    info!(
        "event=cli_start module=cli status=ok backend={} users={user_count} films={film_count}",
        stores.backend_name()
    );

    println!("filmorate_core version={}", filmorate_core::core_version());
    println!("backend={}", stores.backend_name());
    println!("users={user_count} films={film_count} genres={genre_count}");
    Ok(())
}
