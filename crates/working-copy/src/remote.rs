//! Credentialed push URLs.

use pipeline::{ApiToken, ProjectName, UserLogin};
use url::Url;

/// Default host pushes go to.
pub const DEFAULT_PUSH_BASE: &str = "https://github.com/";

/// Base URL under which user repositories live (`<base>/<login>/<project>.git`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushEndpoint {
    base: Url,
}

impl PushEndpoint {
    /// Parses `base`, returning `None` if it is not an absolute URL that can
    /// carry credentials (e.g. `mailto:` or `file:` URLs).
    pub fn parse(base: &str) -> Option<Self> {
        let mut base = Url::parse(base).ok()?;
        if base.cannot_be_a_base() || !base.has_host() {
            return None;
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Some(Self { base })
    }

    /// Builds `https://<login>:<token>@host/<login>/<project>.git`.
    ///
    /// The result embeds the secret; it must only ever be handed to git and
    /// never formatted into a log line or error.
    pub fn authenticated_url(
        &self,
        login: &UserLogin,
        token: &ApiToken,
        project: &ProjectName,
    ) -> Option<Url> {
        let mut url = self
            .base
            .join(&format!("{}/{}.git", login.as_str(), project.as_str()))
            .ok()?;
        url.set_username(login.as_str()).ok()?;
        url.set_password(Some(token.expose())).ok()?;
        Some(url)
    }
}

impl Default for PushEndpoint {
    fn default() -> Self {
        Self {
            base: Url::parse(DEFAULT_PUSH_BASE).expect("default push base is a valid URL"),
        }
    }
}
