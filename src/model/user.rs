use serde::{Deserialize, Serialize};

use super::role::Role;

/// A login account. `password` holds an argon2 PHC string, never plaintext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub password: String,
    pub role: Role,
}
