//! Human-readable text for metaserver reason codes.
//!
//! The metaserver reports failures as short upper-case codes
//! (`NO_SUCH_GAME`, `CLIENT_TIMEOUT`, ...). This module turns the ones we
//! know into sentences for the system chat. Codes we do not know are shown
//! as-is, so a newer server never produces an empty message.

/// Returns the text for `code`, or `code` itself if it is not known.
pub fn describe(code: &str) -> &str {
    match code {
        "NO_ANSWER" => "The metaserver did not answer.",
        "CLIENT_TIMEOUT" => "The connection to the metaserver timed out.",
        "CONNECTION_LOST" => "The connection to the metaserver was lost.",
        "CLIENT_LEFT" | "NORMAL" => "Logged out of the metaserver.",
        "SERVER_SHUTDOWN" => "The metaserver is shutting down.",
        "SERVER_CRASHED" => "The metaserver crashed.",
        "WRONG_PASSWORD" => "The password was wrong.",
        "UNSUPPORTED_PROTOCOL" => {
            "The metaserver does not support this client's protocol version."
        }
        "ALREADY_LOGGED_IN" => "A client with this name is already logged in.",
        "DUPLICATE_LOGIN" => "You logged in again from somewhere else.",
        "NOT_LOGGED_IN" => "You are not logged in.",
        "NO_SUCH_GAME" => "The game no longer exists.",
        "GAME_EXISTS" => "A game with this name already exists.",
        "NO_SUCH_USER" => "There is no user called %s online.",
        "DEFICIENT_PERMISSION" => "You are not allowed to do that.",
        "PROTOCOL_ERROR" => "The metaserver sent something this client does not understand.",
        _ => code,
    }
}

/// Like [`describe`], but fills the `%s` placeholder some texts carry.
pub fn describe_with(code: &str, detail: &str) -> String {
    describe(code).replacen("%s", detail, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_known_code() {
        assert_eq!(describe("NO_SUCH_GAME"), "The game no longer exists.");
    }

    #[test]
    fn test_describe_unknown_code_passes_through() {
        assert_eq!(describe("BRAND_NEW_REASON"), "BRAND_NEW_REASON");
    }

    #[test]
    fn test_describe_with_fills_placeholder() {
        assert_eq!(
            describe_with("NO_SUCH_USER", "bob"),
            "There is no user called bob online."
        );
    }

    #[test]
    fn test_describe_with_no_placeholder_is_unchanged() {
        assert_eq!(describe_with("NO_ANSWER", "x"), "The metaserver did not answer.");
    }
}
