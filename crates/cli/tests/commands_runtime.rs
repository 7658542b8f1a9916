use std::env;
use std::sync::{Mutex, OnceLock};

use crmpilot_cli::commands::{capabilities, config, doctor};
use serde_json::Value;

const VALID_ENV: &[(&str, &str)] = &[
    ("CRMPILOT_LLM_API_KEY", "gsk-test"),
    ("CRMPILOT_CRM_ACCESS_TOKEN", "pat-na1-test"),
    ("CRMPILOT_EMAIL_ACCESS_TOKEN", "ya29-test"),
];

#[test]
fn doctor_passes_with_valid_env() {
    with_env(VALID_ENV, || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 0, "expected all readiness checks to pass");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "pass");
        assert_eq!(payload["checks"].as_array().map(Vec::len), Some(4));
    });
}

#[test]
fn doctor_reports_config_failure_without_tokens() {
    with_env(&[], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "fail");
        assert_eq!(payload["checks"][0]["name"], "config_validation");
        assert_eq!(payload["checks"][0]["status"], "fail");
        assert_eq!(payload["checks"][1]["status"], "skipped");
    });
}

#[test]
fn config_redacts_tokens_and_attributes_env_sources() {
    with_env(VALID_ENV, || {
        let output = config::run();

        assert!(!output.contains("pat-na1-test"), "crm token must not be printed");
        assert!(!output.contains("ya29-test"), "email token must not be printed");
        assert!(output.contains("pat-***"), "crm token should keep only its prefix");
        assert!(output.contains("env (CRMPILOT_CRM_ACCESS_TOKEN)"));
        assert!(output.contains("llm.model = mixtral-8x7b-32768"));
    });
}

#[test]
fn capabilities_lists_the_catalog_in_registration_order() {
    with_env(VALID_ENV, || {
        let result = capabilities::run();
        assert_eq!(result.exit_code, 0, "expected catalog listing to succeed");

        let payload = parse_payload(&result.output);
        let names: Vec<&str> = payload
            .as_array()
            .expect("catalog should be a JSON array")
            .iter()
            .filter_map(|entry| entry["name"].as_str())
            .collect();
        assert_eq!(
            names,
            ["create_contact", "update_contact", "create_deal", "update_deal", "send_email"]
        );

        let send_email = &payload[4]["parameters"]["parameters"];
        let required: Vec<&str> = send_email
            .as_array()
            .expect("parameters should be a JSON array")
            .iter()
            .filter(|spec| spec["required"] == true)
            .filter_map(|spec| spec["name"].as_str())
            .collect();
        assert_eq!(required, ["to", "subject", "body"]);
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "CRMPILOT_LLM_PROVIDER",
        "CRMPILOT_LLM_API_KEY",
        "CRMPILOT_LLM_BASE_URL",
        "CRMPILOT_LLM_MODEL",
        "CRMPILOT_LLM_TEMPERATURE",
        "CRMPILOT_LLM_MAX_TOKENS",
        "CRMPILOT_LLM_TIMEOUT_SECS",
        "CRMPILOT_CRM_ACCESS_TOKEN",
        "CRMPILOT_CRM_BASE_URL",
        "CRMPILOT_EMAIL_ACCESS_TOKEN",
        "CRMPILOT_EMAIL_SENDER",
        "CRMPILOT_EMAIL_BASE_URL",
        "CRMPILOT_LOGGING_LEVEL",
        "CRMPILOT_LOGGING_FORMAT",
        "CRMPILOT_LOG_LEVEL",
        "CRMPILOT_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        match value {
            Some(value) => env::set_var(key, value),
            None => env::remove_var(key),
        }
    }
}
