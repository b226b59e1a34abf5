use crate::{UrlError, UrlResult};
use std::fmt;
use url::Url;

/// Scheme + host + port of a URL
///
/// A run captures the seed's authority once and checks every discovered link
/// against it. The port is the explicit one or the scheme's known default, so
/// `https://example.com/` and `https://example.com:443/` share an authority.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Authority {
    scheme: String,
    host: String,
    port: Option<u16>,
}

impl Authority {
    /// Extracts the authority of an http(s) URL
    ///
    /// # Examples
    ///
    /// ```
    /// use url::Url;
    /// use doc_harvester::url::Authority;
    ///
    /// let url = Url::parse("https://EXAMPLE.com/path").unwrap();
    /// let authority = Authority::from_url(&url).unwrap();
    /// assert_eq!(authority.to_string(), "https://example.com:443");
    /// ```
    pub fn from_url(url: &Url) -> UrlResult<Self> {
        let scheme = url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(UrlError::InvalidScheme(scheme.to_string()));
        }

        let host = url.host_str().ok_or(UrlError::MissingHost)?;

        Ok(Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            port: url.port_or_known_default(),
        })
    }

    /// Returns true if `url` has exactly this scheme, host and port
    pub fn contains(&self, url: &Url) -> bool {
        url.scheme() == self.scheme
            && url.host_str() == Some(self.host.as_str())
            && url.port_or_known_default() == self.port
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}://{}:{}", self.scheme, self.host, port),
            None => write!(f, "{}://{}", self.scheme, self.host),
        }
    }
}
