use moka::future::Cache;
use std::time::Duration;

/// Token ids (`jti`) revoked by logout.
///
/// Entries only need to outlive the token itself, so the cache TTL is the
/// access-token TTL; an expired token is rejected by signature validation
/// anyway.
#[derive(Clone)]
pub struct TokenDenylist {
    revoked: Cache<String, ()>,
}

impl TokenDenylist {
    pub fn new(token_ttl: Duration) -> Self {
        Self {
            revoked: Cache::builder()
                .max_capacity(100_000) // tune based on memory
                .time_to_live(token_ttl)
                .build(),
        }
    }

    pub async fn revoke(&self, jti: &str) {
        self.revoked.insert(jti.to_string(), ()).await;
    }

    pub fn is_revoked(&self, jti: &str) -> bool {
        self.revoked.contains_key(jti)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn revoked_ids_are_remembered() {
        let denylist = TokenDenylist::new(Duration::from_secs(60));

        assert!(!denylist.is_revoked("abc"));
        denylist.revoke("abc").await;
        assert!(denylist.is_revoked("abc"));
        assert!(!denylist.is_revoked("xyz"));
    }
}
