//! Common test helpers and JSON builders

use serde_json::{json, Value};

// ─── Response builders ────────────────────────────────────────────────────────

/// Build a normal generateContent response from the "backend"
pub fn gemini_text_response(text: &str) -> String {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP",
            "index": 0
        }],
        "usageMetadata": {"promptTokenCount": 4, "candidatesTokenCount": 5, "totalTokenCount": 9},
        "modelVersion": "gemini-2.0-flash"
    })
    .to_string()
}

/// Build a Gemini error envelope
pub fn gemini_error_response(code: u16, message: &str, status: &str) -> String {
    json!({"error": {"code": code, "message": message, "status": status}}).to_string()
}

/// Build a response whose only candidate was withheld
pub fn gemini_blocked_response(reason: &str) -> String {
    json!({"candidates": [{"finishReason": reason, "index": 0}]}).to_string()
}

/// The exact success body the proxy must return for `text`
pub fn expected_success(text: &str) -> Value {
    json!({
        "success": true,
        "data": {"candidates": [{"content": {"parts": [{"text": text}]}}]},
        "model": "gemini-2.0-flash"
    })
}

// ─── Assertion helpers ────────────────────────────────────────────────────────

/// Assert two JSON values are equal, with context on failure
pub fn assert_eq_json(actual: &Value, expected: &Value, label: &str) -> anyhow::Result<()> {
    if actual != expected {
        Err(anyhow::anyhow!("{label}: expected {} but got {}", expected, actual))
    } else {
        Ok(())
    }
}

/// Assert two strings are equal, with context on failure
pub fn assert_eq_str(actual: &str, expected: &str, label: &str) -> anyhow::Result<()> {
    if actual != expected {
        Err(anyhow::anyhow!("{label}: expected {:?} but got {:?}", expected, actual))
    } else {
        Ok(())
    }
}

/// Assert condition is true, with message
pub fn assert_true(cond: bool, msg: &str) -> anyhow::Result<()> {
    if !cond {
        Err(anyhow::anyhow!("{}", msg))
    } else {
        Ok(())
    }
}
