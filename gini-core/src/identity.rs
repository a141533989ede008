use crate::format::tail;
use chrono::{DateTime, SecondsFormat, Utc};

pub const SESSION_KEY: &str = "dr_gini_session_id";
pub const USER_KEY: &str = "dr_gini_user_id";

const SUFFIX_LEN: usize = 9;
const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Keys that scope every webhook call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub session_id: String,
    /// Set when the identity widget reports a logged-in user.
    pub email: Option<String>,
}

impl Identity {
    pub fn anonymous(user_id: String, session_id: String) -> Self {
        Self {
            user_id,
            session_id,
            email: None,
        }
    }

    /// The email becomes the primary key for everything stored server-side.
    pub fn logged_in(email: String, session_id: String) -> Self {
        Self {
            user_id: email.clone(),
            session_id,
            email: Some(email),
        }
    }

    pub fn user_label(&self) -> &str {
        match &self.email {
            Some(email) => email,
            None => tail(&self.user_id, 12),
        }
    }

    pub fn session_label(&self) -> &str {
        tail(&self.session_id, 8)
    }
}

/// `<prefix>_<millis>_<9 base-36 chars>`, with `random` taken from `[0, 1)`.
pub fn generate_id(prefix: &str, now: DateTime<Utc>, random: f64) -> String {
    format!(
        "{prefix}_{}_{}",
        now.timestamp_millis(),
        base36_fraction(random, SUFFIX_LEN)
    )
}

fn base36_fraction(random: f64, len: usize) -> String {
    let mut fraction = random.clamp(0.0, 1.0).fract();
    let mut out = String::with_capacity(len);
    for _ in 0..len {
        fraction *= 36.0;
        let digit = fraction.trunc() as usize;
        out.push(DIGITS[digit.min(35)] as char);
        fraction = fraction.fract();
    }
    out
}

/// ISO-8601 timestamp with millisecond precision, as sent in request bodies.
pub fn iso(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(millis: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(millis).unwrap()
    }

    #[test]
    fn generated_ids() {
        let id = generate_id("session", at(1_700_000_000_123), 0.5);
        assert_eq!(id, "session_1700000000123_i00000000");
        let id = generate_id("user", at(1), 0.123456789);
        let suffix = id.rsplit('_').next().unwrap();
        assert_eq!(suffix.len(), 9);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn labels() {
        let anon = Identity::anonymous(
            "user_1700000000123_abcdefghi".into(),
            "session_1700000000123_zyxwvutsr".into(),
        );
        assert_eq!(anon.user_label(), "23_abcdefghi");
        assert_eq!(anon.session_label(), "yxwvutsr");

        let known = Identity::logged_in("ada@example.org".into(), "s".into());
        assert_eq!(known.user_id, "ada@example.org");
        assert_eq!(known.user_label(), "ada@example.org");
    }

    #[test]
    fn iso_has_millis() {
        assert_eq!(iso(at(1_700_000_000_123)), "2023-11-14T22:13:20.123Z");
    }
}
