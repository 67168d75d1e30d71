use serde_json::Value;

/// Pulls a readable message out of a Supabase error body. Storage and auth
/// use different field names for it.
pub(crate) fn failure_message(status: u16, body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    let message = parsed.as_ref().and_then(|payload| {
        ["message", "error_description", "msg", "error"]
            .iter()
            .find_map(|field| payload.get(*field).and_then(Value::as_str))
            .map(str::to_string)
    });

    match message {
        Some(message) if !message.trim().is_empty() => message,
        _ if !body.trim().is_empty() => format!("HTTP {}: {}", status, body.trim()),
        _ => format!("HTTP {}", status),
    }
}
