//! Endpoint construction for the Plex event feed.

/// Well-known event-stream path exposed by Plex Media Server.
pub const EVENTS_PATH: &str = "/:/eventsource/notifications";

/// Feed URL for a server. The access token is appended as a query
/// parameter by the transport — header-only auth is not reliable for
/// this endpoint — and duplicated in the request headers.
pub fn events_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), EVENTS_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_appends_feed_path() {
        assert_eq!(
            events_url("http://10.0.0.5:32400"),
            "http://10.0.0.5:32400/:/eventsource/notifications"
        );
    }

    #[test]
    fn trailing_slash_is_tolerated() {
        assert_eq!(
            events_url("https://plex.example.com/"),
            "https://plex.example.com/:/eventsource/notifications"
        );
    }
}
