//! Development access tokens.
//!
//! Real tokens come from the auth service. This signs one with the same
//! `JWT_SECRET` so the API can be exercised locally.

use chrono::Duration;
use secrecy::SecretString;
use tracing::info;

use myngo_api::services::TokenService;
use myngo_core::UserId;

/// Print a signed token for `user_id` to stdout.
///
/// # Errors
///
/// Returns an error if `JWT_SECRET` is unset, the lifetime is not positive
/// or too large, or signing fails.
pub fn issue(
    user_id: i32,
    email: Option<&str>,
    ttl_hours: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    if ttl_hours <= 0 {
        return Err("ttl-hours must be positive".into());
    }
    let ttl = Duration::try_hours(ttl_hours).ok_or("ttl-hours out of range")?;

    let secret = std::env::var("JWT_SECRET")
        .map(SecretString::from)
        .map_err(|_| "JWT_SECRET not set")?;

    let tokens = TokenService::new(&secret);
    let token = tokens.issue(UserId::new(user_id), email, ttl)?;

    info!(user_id, ttl_hours, "Issued development token");

    #[allow(clippy::print_stdout)]
    {
        println!("{token}");
    }

    Ok(())
}
