//! Feature-string composition.
//!
//! A ticket's textual fields are concatenated in a fixed order: subject,
//! then problem type, then each comment body as encountered. The order is
//! a frozen contract — bigram features depend on token adjacency, so
//! changing it invalidates any previously fitted vocabulary.

use crate::ticket::Ticket;

/// Compose a ticket's feature string.
///
/// Empty and absent fields are filtered out, never errors; the surviving
/// parts are joined by a single space.
pub fn compose(ticket: &Ticket) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if !ticket.subject.is_empty() {
        parts.push(&ticket.subject);
    }
    if let Some(problem_type) = &ticket.problem_type {
        if !problem_type.is_empty() {
            parts.push(problem_type);
        }
    }
    for comment in &ticket.comments {
        if let Some(body) = &comment.body {
            if !body.is_empty() {
                parts.push(body);
            }
        }
    }
    parts.join(" ")
}
