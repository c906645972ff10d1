//! Session cookie helpers.

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "SESSIONID";

/// Extract the session token from a raw `Cookie` header value.
pub fn session_id_from_cookie(header: &str) -> Option<&str> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        (name.trim() == SESSION_COOKIE).then(|| value.trim())
    })
}

/// `Set-Cookie` value handing `token` to the client for `max_age` seconds.
pub fn session_cookie(token: &str, max_age: u32) -> String {
    format!("{SESSION_COOKIE}={token}; Max-Age={max_age}; Path=/; HttpOnly")
}
