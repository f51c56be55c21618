//! Test registry - all test cases are registered here

pub mod helpers;

use crate::runner::{TestCase, TestFuture};

/// Build and return all test cases
///
/// Tests are grouped by category. Each test:
/// 1. Queues a mock Gemini response
/// 2. Sends a request to the REAL proxy
/// 3. Validates the response and what the backend received
pub fn all_tests() -> Vec<TestCase> {
    macro_rules! test {
        ($name:expr, $desc:expr, $func:path) => {
            TestCase {
                name: $name,
                description: $desc,
                run: |ctx| -> TestFuture { Box::pin($func(ctx)) },
            }
        };
    }

    vec![
        // ── Routes ────────────────────────────────────────────────────────────
        test!(
            "routes/general_success",
            "General route returns the single-candidate success body",
            routes::test_general_success
        ),
        test!(
            "routes/general_defaults_forwarded",
            "Prompt, temperature 0.7 and maxOutputTokens 8192 reach Gemini with the key header",
            routes::test_general_defaults_forwarded
        ),
        test!(
            "routes/general_overrides_forwarded",
            "Caller temperature and maxTokens are forwarded unchanged",
            routes::test_general_overrides_forwarded
        ),
        test!(
            "routes/script_fixed_ceiling",
            "Script route ignores maxTokens and always sends 16384",
            routes::test_script_fixed_ceiling
        ),
        test!(
            "routes/script_ignores_malformed_max_tokens",
            "Script route accepts any maxTokens value and still sends 16384",
            routes::test_script_ignores_malformed_max_tokens
        ),
        test!(
            "routes/idempotent_bodies",
            "Identical requests produce identical bodies",
            routes::test_idempotent_bodies
        ),
        test!(
            "routes/key_rotation",
            "A rotated secret file is used on the next request",
            routes::test_key_rotation
        ),

        // ── Errors ────────────────────────────────────────────────────────────
        test!(
            "errors/method_not_allowed",
            "Non-POST requests get 405 without a backend call",
            errors::test_method_not_allowed
        ),
        test!(
            "errors/prompt_required",
            "Missing or empty prompt gets 400 without a backend call",
            errors::test_prompt_required
        ),
        test!(
            "errors/api_key_not_configured",
            "Missing secret gets 500 without a backend call",
            errors::test_api_key_not_configured
        ),
        test!(
            "errors/provider_error_relayed",
            "Gemini error message is relayed as success:false",
            errors::test_provider_error_relayed
        ),
        test!(
            "errors/blocked_response",
            "Blocked candidate is reported as a provider failure",
            errors::test_blocked_response
        ),
        test!(
            "errors/provider_timeout",
            "Slow Gemini response hits the proxy timeout",
            errors::test_provider_timeout
        ),
        test!(
            "errors/key_never_echoed",
            "API key never appears in a response body",
            errors::test_key_never_echoed
        ),
    ]
}
