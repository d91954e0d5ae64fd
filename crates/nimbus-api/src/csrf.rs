//! CSRF Cookie
//!
//! State-changing backend calls echo a per-session token read from the
//! cookie string into a request header.

/// Header carrying the echoed token
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Default cookie holding the token
pub const CSRF_COOKIE: &str = "csrftoken";

/// Scan a `document.cookie`-style string for a named cookie value.
///
/// Cookies are `; `-separated `name=value` pairs; values are
/// percent-decoded. Returns the first match.
pub fn read_cookie(cookies: &str, name: &str) -> Option<String> {
    if cookies.is_empty() {
        return None;
    }
    for pair in cookies.split(';') {
        let pair = pair.trim();
        if let Some(value) = pair.strip_prefix(name) {
            if let Some(value) = value.strip_prefix('=') {
                return Some(urlencoding::decode(value).map_or_else(
                    |_| value.to_string(),
                    |decoded| decoded.into_owned(),
                ));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_cookie_finds_token() {
        let cookies = "sessionid=abc; csrftoken=tok123; theme=dark";
        assert_eq!(read_cookie(cookies, "csrftoken").unwrap(), "tok123");
    }

    #[test]
    fn test_read_cookie_percent_decodes() {
        assert_eq!(read_cookie("csrftoken=a%2Bb", "csrftoken").unwrap(), "a+b");
    }

    #[test]
    fn test_read_cookie_missing() {
        assert!(read_cookie("", "csrftoken").is_none());
        assert!(read_cookie("session=x", "csrftoken").is_none());
        // A name prefix is not a match
        assert!(read_cookie("csrftoken2=x", "csrftoken").is_none());
    }
}
