use crate::store::models::{Message, Origin, Thread};

/// Message text as shown; answers sometimes open with a blank line.
pub fn display_text(message: &Message) -> &str {
    message
        .text
        .strip_prefix("\n\n")
        .unwrap_or(&message.text)
}

pub fn speaker(origin: Origin) -> &'static str {
    match origin {
        Origin::User => "You",
        Origin::Assistant => "Assistant",
        Origin::Error => "Error",
    }
}

pub fn render_message(message: &Message) -> String {
    format!("{}> {}", speaker(message.origin), display_text(message))
}

pub fn render_thread_line(index: usize, thread: &Thread, selected: bool) -> String {
    let marker = if selected { "*" } else { " " };
    format!(
        "{} {:>3} | {:<36} | {:>4} msgs | {}",
        marker,
        index + 1,
        thread.id,
        thread.messages.len(),
        thread.label
    )
}

pub fn export_transcript(thread: &Thread) -> String {
    let mut export = String::new();
    export.push_str(&format!("Session: {}\n", thread.label));
    export.push_str(&format!("ID: {}\n", thread.id));
    if let Some(session) = &thread.remote_session_id {
        export.push_str(&format!("Remote Session: {}\n", session));
    }
    export.push_str(&format!("Created At: {}\n", thread.created_at));
    export.push_str("---\n");

    for m in &thread.messages {
        export.push_str(&format!("[{}]: {}\n", m.origin.as_str().to_uppercase(), m.text));
        export.push_str("---\n");
    }
    export
}
