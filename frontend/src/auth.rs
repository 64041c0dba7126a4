//! Thin wrappers over `localStorage` for the login session.

const TOKEN_KEY: &str = "rf_token";
const ROLE_KEY: &str = "rf_role";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|window| window.local_storage().ok().flatten())
}

pub fn token() -> Option<String> {
    local_storage()
        .and_then(|storage| storage.get_item(TOKEN_KEY).ok().flatten())
        .filter(|token| !token.is_empty())
}

pub fn role() -> Option<String> {
    local_storage().and_then(|storage| storage.get_item(ROLE_KEY).ok().flatten())
}

pub fn store_session(token: &str, role: &str) {
    if let Some(storage) = local_storage() {
        let _ = storage.set_item(TOKEN_KEY, token);
        let _ = storage.set_item(ROLE_KEY, role);
    }
}

pub fn clear_session() {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(TOKEN_KEY);
        let _ = storage.remove_item(ROLE_KEY);
    }
}

pub fn has_session() -> bool {
    token().is_some()
}
