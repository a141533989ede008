//! Status banners shown in the processing message while a request is in flight.

use crate::blocks::escape;
use std::time::Duration;

/// How often the UI advances to the next status line.
pub const ROTATION_PERIOD: Duration = Duration::from_secs(4);

const TEXT_STATUSES: [&str; 4] = [
    "Dr. Gini is processing your request...",
    "Searching the knowledge repository...",
    "Reviewing your documents...",
    "Drafting a response...",
];

const WEB_STATUSES: [&str; 3] = [
    "Dr. Gini is processing your request...",
    "Searching the web for relevant papers...",
    "Reading the most relevant sources...",
];

const MOLECULE_STATUSES: [&str; 3] = [
    "Processing your request and generating molecular structure for {}...",
    "Looking up the chemistry of {}...",
    "Preparing both text and visual content for {}...",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Waiting for the text reply.
    Working {
        compound: Option<String>,
        web_search: bool,
    },
    /// Text is done and the structure is being rendered.
    TextReady { compound: String },
}

pub fn status_line(stage: &Stage, tick: usize) -> String {
    match stage {
        Stage::Working {
            compound: Some(compound),
            ..
        } => MOLECULE_STATUSES[tick % MOLECULE_STATUSES.len()].replace("{}", compound),
        Stage::Working {
            compound: None,
            web_search: true,
        } => WEB_STATUSES[tick % WEB_STATUSES.len()].to_string(),
        Stage::Working { .. } => TEXT_STATUSES[tick % TEXT_STATUSES.len()].to_string(),
        Stage::TextReady { compound } => {
            format!("Now generating molecular structure for {compound}...")
        }
    }
}

pub fn processing_html(stage: &Stage, tick: usize) -> String {
    let line = escape(&status_line(stage, tick));
    match stage {
        Stage::Working { compound, .. } => {
            let hint = if compound.is_some() {
                r#"<p class="text-xs text-slate-500 mt-2">This may take a moment as we prepare both text and visual content</p>"#
            } else {
                ""
            };
            format!(
                r#"<div class="p-3 bg-gradient-to-r from-blue-50 to-indigo-50 border border-blue-200 rounded-xl text-center"><div class="flex items-center justify-center gap-2"><div class="w-4 h-4 border-2 border-blue-500 border-t-transparent rounded-full animate-spin"></div><span class="text-blue-700 font-medium">{line}</span></div>{hint}</div>"#
            )
        }
        Stage::TextReady { .. } => format!(
            r#"<div class="p-3 bg-gradient-to-r from-blue-50 to-indigo-50 border border-blue-200 rounded-xl text-center"><div class="flex items-center justify-center gap-2 mb-2"><div class="text-green-600 font-medium">✅ Text content ready</div></div><div class="flex items-center justify-center gap-2"><div class="w-4 h-4 border-2 border-purple-500 border-t-transparent rounded-full animate-spin"></div><span class="text-purple-700 font-medium">{line}</span></div></div>"#
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotates_through_lines() {
        let stage = Stage::Working {
            compound: None,
            web_search: false,
        };
        assert_eq!(status_line(&stage, 0), "Dr. Gini is processing your request...");
        assert_eq!(status_line(&stage, 1), "Searching the knowledge repository...");
        assert_eq!(status_line(&stage, 4), status_line(&stage, 0));

        let web = Stage::Working {
            compound: None,
            web_search: true,
        };
        assert_eq!(status_line(&web, 1), "Searching the web for relevant papers...");
    }

    #[test]
    fn molecule_lines_name_the_compound() {
        let stage = Stage::Working {
            compound: Some("caffeine".into()),
            web_search: true,
        };
        assert!(status_line(&stage, 0).contains("molecular structure for caffeine"));
        assert!(processing_html(&stage, 0).contains("both text and visual content"));

        let ready = Stage::TextReady {
            compound: "caffeine".into(),
        };
        let html = processing_html(&ready, 3);
        assert!(html.contains("Text content ready"));
        assert!(html.contains("Now generating molecular structure for caffeine..."));
    }
}
