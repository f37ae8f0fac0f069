//! Parsing of single Server-Sent Events frames.

/// One dispatched SSE frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SseFrame {
    /// The `event:` field, if any.
    pub event: Option<String>,
    /// The `id:` field, if any.
    pub id: Option<String>,
    /// All `data:` lines joined with `\n`.
    pub data: String,
}

/// Parses one frame (the text between two blank lines).
///
/// Comment lines (starting with `:`) and unknown fields are ignored. Returns
/// `None` when the frame carries no `data:` line, e.g. a keep-alive comment.
pub fn parse_sse_frame(frame: &str) -> Option<SseFrame> {
    let mut parsed = SseFrame::default();
    let mut data_lines: Vec<&str> = Vec::new();

    for line in frame.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() || line.starts_with(':') {
            continue;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "data" => data_lines.push(value),
            "event" => parsed.event = Some(value.to_string()),
            "id" => parsed.id = Some(value.to_string()),
            _ => {}
        }
    }

    if data_lines.is_empty() {
        return None;
    }

    parsed.data = data_lines.join("\n");
    Some(parsed)
}
