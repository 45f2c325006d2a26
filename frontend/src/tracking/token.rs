//! Session token lifecycle: minted once per login, cached across reloads,
//! cleared on termination.

use crate::api::client::{SESSION_TOKEN_KEY, TOKEN_KEY};
use crate::utils::storage;

const SESSION_TOKEN_BACKUP_KEY: &str = "sessionTokenBackup";
const TOKEN_BACKUP_KEY: &str = "tokenBackup";
const SUFFIX_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;

pub fn format_session_token(millis: i64, suffix: &str) -> String {
    format!("session_{}_{}", millis, suffix)
}

/// Reuses the cached token when present (page reloads within one login must
/// not create a second session row); otherwise mints and caches a fresh one.
pub fn mint_or_restore() -> Option<String> {
    let storage = storage::local_storage().ok()?;
    if let Ok(Some(existing)) = storage.get_item(SESSION_TOKEN_KEY) {
        if !existing.is_empty() {
            return Some(existing);
        }
    }

    let token = format_session_token(js_sys::Date::now() as i64, &random_suffix());
    storage.set_item(SESSION_TOKEN_KEY, &token).ok()?;
    Some(token)
}

pub fn clear() {
    if let Ok(storage) = storage::local_storage() {
        let _ = storage.remove_item(SESSION_TOKEN_KEY);
    }
}

/// Snapshots the token and credential into reload-scoped storage when the
/// tab hides. A refresh restores them on the next load; a closed tab takes
/// the snapshot down with it. Heuristic only: a hard kill while hidden
/// skips the restore and the visibility timeout closes the session instead.
pub fn backup_for_reload() {
    let (Ok(local), Ok(session)) = (storage::local_storage(), storage::session_storage()) else {
        return;
    };
    if let Ok(Some(token)) = local.get_item(SESSION_TOKEN_KEY) {
        let _ = session.set_item(SESSION_TOKEN_BACKUP_KEY, &token);
    }
    if let Ok(Some(credential)) = local.get_item(TOKEN_KEY) {
        let _ = session.set_item(TOKEN_BACKUP_KEY, &credential);
    }
}

/// Restores a hide-time snapshot after a reload, then drops it.
pub fn restore_from_backup() {
    let (Ok(local), Ok(session)) = (storage::local_storage(), storage::session_storage()) else {
        return;
    };
    if let Ok(Some(token)) = session.get_item(SESSION_TOKEN_BACKUP_KEY) {
        if matches!(local.get_item(SESSION_TOKEN_KEY), Ok(None)) {
            let _ = local.set_item(SESSION_TOKEN_KEY, &token);
        }
        let _ = session.remove_item(SESSION_TOKEN_BACKUP_KEY);
    }
    if let Ok(Some(credential)) = session.get_item(TOKEN_BACKUP_KEY) {
        if matches!(local.get_item(TOKEN_KEY), Ok(None)) {
            let _ = local.set_item(TOKEN_KEY, &credential);
        }
        let _ = session.remove_item(TOKEN_BACKUP_KEY);
    }
}

fn random_suffix() -> String {
    (0..SUFFIX_LEN)
        .map(|_| {
            let idx = (js_sys::Math::random() * SUFFIX_ALPHABET.len() as f64) as usize
                % SUFFIX_ALPHABET.len();
            SUFFIX_ALPHABET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_format_matches_convention() {
        let token = format_session_token(1_700_000_000_000, "abc123xyz");
        assert_eq!(token, "session_1700000000000_abc123xyz");

        let parts: Vec<&str> = token.splitn(3, '_').collect();
        assert_eq!(parts[0], "session");
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), SUFFIX_LEN);
    }
}
