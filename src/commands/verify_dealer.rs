//! Verify-dealer command - operator action to flag a dealer as verified.

use std::sync::Arc;

use crate::cli::args::VerifyDealerArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::repositories::{UserRepository, UserStore};
use crate::infra::Database;
use crate::services::{UserManager, UserService};

/// Execute the verify-dealer command
pub async fn execute(args: VerifyDealerArgs, config: Config) -> AppResult<()> {
    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    let users: Arc<UserStore> = Arc::new(UserStore::new(db.get_connection()));

    let account = users
        .find_by_email(&args.email)
        .await?
        .ok_or(AppError::NotFound)?;

    let service = UserManager::new(users);
    let verified = service.verify_dealer(account.id).await?;

    println!("{} is now a verified dealer", verified.email);
    Ok(())
}
