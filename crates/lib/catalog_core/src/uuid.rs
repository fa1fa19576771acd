// Token identifiers.
//
// Every signed token carries a `jti` so the blacklist can key on a stable
// identity instead of the raw token string. UUIDv7 keeps identifiers
// time-sortable, which makes blacklist dumps easy to read.

use uuid::Uuid;

/// Generate a new token identifier (UUIDv7, hyphenated).
pub fn new_token_id() -> String {
    Uuid::now_v7().to_string()
}
