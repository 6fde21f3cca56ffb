use anyhow::{Context, Result, anyhow};
use tracing::info;

use crate::{
    auth::password::hash_password,
    model::{role::Role, user::User},
    store::RecordStore,
};

/// Creates an admin account unless a user with `username` already exists.
/// Returns whether a user was added.
pub fn seed_admin(store: &dyn RecordStore, username: &str, password: &str) -> Result<bool> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(anyhow!("seed admin username and password must not be empty"));
    }

    let mut doc = store.load();
    if doc.find_user(username).is_some() {
        return Ok(false);
    }

    let hashed = hash_password(password)
        .map_err(|e| anyhow!("{e}"))
        .context("failed to hash seed admin password")?;

    let id = doc.next_user_id();
    doc.users.push(User {
        id,
        username: username.to_string(),
        password: hashed,
        role: Role::Admin,
    });
    store.save(&doc);

    info!(user_id = id, username, "Seeded admin user");
    Ok(true)
}
