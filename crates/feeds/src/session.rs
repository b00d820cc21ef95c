//! Login session state shared between the watch loop and the refresher.

use std::sync::RwLock;

/// One login cookie as captured from a `Set-Cookie` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
}

/// Opaque authenticated state for the ticker site.
///
/// Replaced wholesale on refresh, never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    cookies: Vec<SessionCookie>,
}

impl Session {
    /// Build a session from raw `Set-Cookie` header values.
    ///
    /// Only the leading `name=value` pair of each header is kept; attributes
    /// such as `Path` or `HttpOnly` are not needed to replay the cookie.
    pub fn from_set_cookie_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Self {
        let cookies = headers
            .filter_map(|header| {
                let pair = header.split(';').next()?;
                let (name, value) = pair.split_once('=')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                Some(SessionCookie {
                    name: name.to_string(),
                    value: value.trim().to_string(),
                })
            })
            .collect();
        Self { cookies }
    }

    /// Render the `Cookie` request-header value for this session.
    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

/// Single synchronized slot holding the current session.
///
/// The watch loop reads, the refresher replaces. Readers always observe the
/// old or the new session in its entirety.
#[derive(Debug, Default)]
pub struct SessionSlot {
    inner: RwLock<Session>,
}

impl SessionSlot {
    pub fn new(session: Session) -> Self {
        Self {
            inner: RwLock::new(session),
        }
    }

    /// Snapshot of the current session.
    pub fn current(&self) -> Session {
        self.inner
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Replace the session wholesale.
    pub fn replace(&self, session: Session) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = session;
        }
    }
}
