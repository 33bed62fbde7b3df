//! HTTP method as a typed enum.
//!
//! Only the five methods an application module can register a route for.
//! Anything else is answered with `405 Method Not Allowed` by the router
//! before it reaches a handler.

use std::fmt;

/// A routable HTTP method.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    Delete,
    Get,
    Patch,
    Post,
    Put,
}

impl Method {
    /// Every routable method, in the order the registry documents them.
    pub const ALL: [Method; 5] = [Self::Get, Self::Post, Self::Put, Self::Patch, Self::Delete];

    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delete => "DELETE",
            Self::Get    => "GET",
            Self::Patch  => "PATCH",
            Self::Post   => "POST",
            Self::Put    => "PUT",
        }
    }

    /// Maps a wire method onto a routable one. `None` for HEAD, OPTIONS, etc.
    pub fn from_http(method: &http::Method) -> Option<Self> {
        match *method {
            http::Method::DELETE => Some(Self::Delete),
            http::Method::GET    => Some(Self::Get),
            http::Method::PATCH  => Some(Self::Patch),
            http::Method::POST   => Some(Self::Post),
            http::Method::PUT    => Some(Self::Put),
            _                    => None,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_routable_wire_methods() {
        for method in Method::ALL {
            let wire = http::Method::from_bytes(method.as_str().as_bytes()).unwrap();
            assert_eq!(Method::from_http(&wire), Some(method));
        }
    }

    #[test]
    fn rejects_unroutable_methods() {
        assert_eq!(Method::from_http(&http::Method::HEAD), None);
        assert_eq!(Method::from_http(&http::Method::OPTIONS), None);
    }
}
