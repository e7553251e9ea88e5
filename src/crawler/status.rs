//! Status classifier
//!
//! Maps a link status to the human readable note shown in reports. The
//! lookup is a fixed table; anything outside it gets a generic note.

use crate::state::LinkStatus;

/// Note used for numeric codes outside the table
pub const UNEXPECTED_STATUS_NOTE: &str = "Unexpected status code.";

/// Returns the note for a link status
///
/// Total and pure: every input maps to a note and the same input always maps
/// to the same note.
///
/// # Examples
///
/// ```
/// use web_status_checker::crawler::classify;
/// use web_status_checker::LinkStatus;
///
/// assert_eq!(classify(LinkStatus::Http(404)), "Not Found: The resource could not be found.");
/// assert_eq!(classify(LinkStatus::Http(418)), "Unexpected status code.");
/// ```
pub fn classify(status: LinkStatus) -> &'static str {
    match status {
        LinkStatus::Http(200) => "OK: The request was successful.",
        LinkStatus::Http(400) => "Bad Request: Invalid syntax.",
        LinkStatus::Http(403) => "Forbidden: Access denied.",
        LinkStatus::Http(404) => "Not Found: The resource could not be found.",
        LinkStatus::Http(408) => "Request Timeout: The server timed out waiting for the request.",
        LinkStatus::Http(429) => {
            "Too Many Requests: The user has sent too many requests in a given amount of time."
        }
        LinkStatus::Http(500) => {
            "Internal Server Error: The server encountered an unexpected condition."
        }
        LinkStatus::Http(502) => {
            "Bad Gateway: The server received an invalid response from the upstream server."
        }
        LinkStatus::Http(503) => {
            "Service Unavailable: The server cannot handle the request at the moment."
        }
        LinkStatus::Http(504) => {
            "Gateway Timeout: The upstream server failed to send a request in time."
        }
        LinkStatus::Http(999) => "Custom Error: Often used by some servers for unhandled errors.",
        LinkStatus::Error => "An error occurred while checking the link.",
        LinkStatus::Http(_) => UNEXPECTED_STATUS_NOTE,
    }
}
