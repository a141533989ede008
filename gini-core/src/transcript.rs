use crate::format::format_time_in;
use crate::models::Message;
use crate::normalize::html_to_text;
use chrono::{Local, TimeZone};

pub const FILE_NAME: &str = "research-session.txt";

/// Plain-text export of the visible conversation. Error messages are left out.
pub fn transcript(user_id: &str, messages: &[Message]) -> String {
    transcript_in(user_id, messages, &Local)
}

pub fn transcript_in<Tz: TimeZone>(user_id: &str, messages: &[Message], tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let body = messages
        .iter()
        .filter(|message| !message.is_error && !message.is_processing)
        .map(|message| {
            let author = if message.is_user() { "You" } else { "Dr. Gini" };
            format!(
                "[{}] {author}: {}",
                format_time_in(&message.timestamp, tz),
                html_to_text(&message.content)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("Dr. Gini Session\nUser: {user_id}\n{}\n\n{body}", "=".repeat(40))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    #[test]
    fn exports_readable_text() {
        let at = DateTime::parse_from_rfc3339("2024-02-03T14:05:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let messages = vec![
            Message::user(1, "Show caffeine structure", at),
            Message::bot_html(2, "<p>Caffeine is <b>C8H10N4O2</b>.</p>", at),
            Message::error(3, "Please wait 1:00.", at),
        ];
        let text = transcript_in("user_42", &messages, &Utc);
        let expected = format!(
            "Dr. Gini Session\nUser: user_42\n{}\n\n[14:05] You: Show caffeine structure\n\n[14:05] Dr. Gini: Caffeine is C8H10N4O2.",
            "=".repeat(40)
        );
        assert_eq!(text, expected);
    }
}
