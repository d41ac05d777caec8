//! Session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::Account;

/// `strftime` pattern for RFC 1123 timestamps, e.g. `Mon, 02 Jan 2006 15:04:05 GMT`.
const RFC1123_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// A successful login: an opaque token bound to an account until `expires_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session token.
    pub token: String,
    /// The authenticated account, with its password hash cleared.
    pub account: Account,
    /// Absolute expiry, fixed at creation.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Expiry formatted as an RFC 1123 HTTP date.
    pub fn expires_rfc1123(&self) -> String {
        self.expires_at.format(RFC1123_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_expires_rfc1123() {
        let session = Session {
            token: "t".to_string(),
            account: Account::bootstrap_owner(),
            expires_at: Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap(),
        };
        assert_eq!(session.expires_rfc1123(), "Mon, 02 Jan 2006 15:04:05 GMT");
    }
}
