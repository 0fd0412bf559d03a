//! Table-formatted batch results.

use chamictl_core::batch::BatchResult;
use chamictl_core::error::HttpError;
use colored::*;
use comfy_table::{Cell, Color, ContentArrangement, Table};

/// Longest error message shown in a result cell.
const MAX_MESSAGE_LEN: usize = 100;

fn message(err: &HttpError) -> String {
    let text = match err.envelope() {
        Some(env) => {
            let body = env.text();
            let body = body.trim();
            if body.is_empty() {
                env.status_line()
            } else {
                format!("{}: {}", env.status_line(), body)
            }
        }
        None => err.to_string(),
    };

    if text.chars().count() > MAX_MESSAGE_LEN {
        let cut: String = text.chars().take(MAX_MESSAGE_LEN).collect();
        format!("{}...", cut)
    } else {
        text
    }
}

/// One row per item in input order, followed by a summary line.
pub fn format_batch_results(results: &BatchResult) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Status", "Result"]);

    for (id, outcome) in results.iter() {
        let (status_cell, text) = match outcome {
            Ok(env) => (Cell::new("OK").fg(Color::Green), env.status_line()),
            Err(e) => (Cell::new("FAIL").fg(Color::Red), message(e)),
        };
        table.add_row(vec![Cell::new(id), status_cell, Cell::new(text)]);
    }

    let summary = format!(
        "\nSummary: {} succeeded, {} failed",
        results.succeeded().to_string().green(),
        results.failed().to_string().red()
    );

    format!("{}{}", table, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chamictl_core::http::Envelope;

    fn envelope(status: u16, body: &'static str) -> Envelope {
        Envelope::new(status, Default::default(), body.as_bytes().to_vec().into())
    }

    #[test]
    fn test_format_batch_results() {
        colored::control::set_override(false);

        let mut batch = BatchResult::new();
        batch.push("x1", Ok(envelope(200, "")));
        batch.push(
            "x2",
            Err(HttpError::Unsuccessful {
                url: "http://smd/State/Components/x2".to_string(),
                envelope: envelope(404, "not found"),
            }),
        );

        let out = format_batch_results(&batch);
        assert!(out.contains("x1"));
        assert!(out.contains("FAIL"));
        assert!(out.contains("404 Not Found: not found"));
        assert!(out.ends_with("Summary: 1 succeeded, 1 failed"));
    }

    #[test]
    fn test_long_messages_truncated() {
        let err = HttpError::Client("e".repeat(300));
        let msg = message(&err);
        assert!(msg.ends_with("..."));
        assert_eq!(msg.chars().count(), MAX_MESSAGE_LEN + 3);
    }
}
