//! Identity of a monitored media server.

/// Connection input for one remote server.
///
/// Immutable after construction; each client instance owns exactly one.
#[derive(Clone, PartialEq, Eq)]
pub struct ServerDescriptor {
    /// Opaque server identifier (machine identifier in Plex terms).
    pub id: String,
    /// Display name shown in status output and logs.
    pub name: String,
    /// Base URL of the server, e.g. `http://10.0.0.5:32400`.
    pub base_url: String,
    /// Access token used to authenticate the feed subscription.
    pub token: String,
}

impl ServerDescriptor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }
}

// The token is a credential; keep it out of debug output.
impl std::fmt::Debug for ServerDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_token() {
        let server = ServerDescriptor::new("abc", "Office", "http://localhost:32400", "s3cret");
        let debug = format!("{server:?}");
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("Office"));
    }
}
