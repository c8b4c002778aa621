//! Unit tests for configuration resolution.
//!
//! Environment-dependent tests are serialized because they mutate
//! process-global state.

use serial_test::serial;

use shellgeist::config::{
    Config, ProfileKind, DEFAULT_API_KEY, DEFAULT_BASE_URL, DEFAULT_MODEL_FAST,
    DEFAULT_MODEL_SMART,
};

const ENV_VARS: &[&str] = &[
    "OPENAI_BASE_URL",
    "OPENAI_API_KEY",
    "SHELLGEIST_HTTP_TIMEOUT",
    "SHELLGEIST_MODEL_FAST",
    "SHELLGEIST_MODEL_SMART",
];

fn clear_env() {
    for var in ENV_VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn defaults_match_the_documented_table() {
    clear_env();
    let config = Config::from_env();
    assert_eq!(config.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.api_key, DEFAULT_API_KEY);
    assert_eq!(config.http_timeout_seconds, 120);
    assert_eq!(config.model_fast, DEFAULT_MODEL_FAST);
    assert_eq!(config.model_smart, DEFAULT_MODEL_SMART);
}

#[test]
#[serial]
fn environment_overrides_defaults() {
    clear_env();
    std::env::set_var("OPENAI_BASE_URL", "http://example.test/v1");
    std::env::set_var("OPENAI_API_KEY", "sk-test");
    std::env::set_var("SHELLGEIST_HTTP_TIMEOUT", "7");
    std::env::set_var("SHELLGEIST_MODEL_SMART", "mega-model");

    let config = Config::from_env();
    assert_eq!(config.base_url, "http://example.test/v1");
    assert_eq!(config.api_key, "sk-test");
    assert_eq!(config.http_timeout_seconds, 7);
    assert_eq!(config.model_smart, "mega-model");
    assert_eq!(config.model_fast, DEFAULT_MODEL_FAST);

    clear_env();
}

#[test]
#[serial]
fn malformed_timeout_falls_back() {
    clear_env();
    std::env::set_var("SHELLGEIST_HTTP_TIMEOUT", "soon");

    let config = Config::from_env();
    assert_eq!(config.http_timeout_seconds, 120);

    clear_env();
}

#[test]
#[serial]
fn toml_file_sets_fields_and_env_wins() {
    clear_env();
    std::env::set_var("OPENAI_API_KEY", "from-env");

    let config = Config::from_toml_str(
        r#"
            ipc_name = "sg-test"
            base_url = "http://file.test/v1"
            api_key = "from-file"
            http_timeout_seconds = 30
        "#,
    )
    .expect("parse");

    assert_eq!(config.ipc_name, "sg-test");
    assert_eq!(config.base_url, "http://file.test/v1");
    assert_eq!(config.api_key, "from-env");
    assert_eq!(config.http_timeout_seconds, 30);

    clear_env();
}

#[test]
#[serial]
fn zero_timeout_is_rejected() {
    clear_env();
    assert!(Config::from_toml_str("http_timeout_seconds = 0").is_err());
}

#[test]
#[serial]
fn empty_ipc_name_is_rejected() {
    clear_env();
    assert!(Config::from_toml_str("ipc_name = \"  \"").is_err());
}

#[test]
#[serial]
fn profiles_differ_only_in_model() {
    clear_env();
    let mut config = Config::from_env();
    config.base_url = "http://host/v1/".into();

    let fast = config.profile(ProfileKind::Fast);
    let smart = config.profile(ProfileKind::Smart);

    // Trailing slash is trimmed for URL building.
    assert_eq!(fast.base_url, "http://host/v1");
    assert_eq!(fast.base_url, smart.base_url);
    assert_eq!(fast.api_key, smart.api_key);
    assert_eq!(fast.timeout, smart.timeout);
    assert_eq!(fast.model, DEFAULT_MODEL_FAST);
    assert_eq!(smart.model, DEFAULT_MODEL_SMART);
}
