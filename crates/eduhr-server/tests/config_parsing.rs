use std::{env, fs, time::Duration};

use eduhr_server::config::loader::load_config;

#[test]
fn config_parsing_and_env_overrides_and_validation() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("eduhr.toml");

    let toml_content = r#"
[server]
host = "127.0.0.1"
port = 8081
base_url = "https://site.hr/"
secure_cookies = true

[logging]
level = "debug"

[gateway]
base_url = "https://site.hr/simplesaml/module.php/core/"
attribute_header_prefix = "x-aai-"

[settings]
path = "/var/lib/eduhr/settings.json"

[settings.initial]
identity_provider_library_path = "/opt/simplesamlphp/lib/_autoload.php"
service_identifier = "fedlab-sp"
auto_create_users = true
allowed_realms = "srce.hr, uni.hr"

[session]
cookie_name = "site_session"
idle_timeout = "2h"

[bootstrap.admin_user]
username = "admin"
password = "change-me"
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) Valid config parses
    let cfg = load_config(path.to_str()).expect("should parse config");
    assert_eq!(cfg.server.port, 8081);
    assert!(cfg.server.secure_cookies);
    assert_eq!(cfg.server.admin_path, "/settings");
    assert_eq!(cfg.logging.level.to_ascii_lowercase(), "debug");
    assert_eq!(cfg.gateway.attribute_header_prefix, "x-aai-");
    assert_eq!(cfg.settings.initial.service_identifier.as_deref(), Some("fedlab-sp"));
    assert!(cfg.settings.initial.auto_create_users);
    assert_eq!(cfg.session.cookie_name, "site_session");
    assert_eq!(cfg.session.idle_timeout, Duration::from_secs(2 * 60 * 60));
    assert_eq!(cfg.site_url().unwrap().as_str(), "https://site.hr/");
    let admin = cfg.bootstrap.admin_user.expect("admin user");
    assert_eq!(admin.username, "admin");
    assert_eq!(admin.email, None);

    // 2) Env override should win over file
    unsafe {
        env::set_var("EDUHR__SERVER__PORT", "9090");
    }
    let cfg_env = load_config(path.to_str()).expect("should parse config with env overrides");
    assert_eq!(cfg_env.server.port, 9090);
    // cleanup env var
    unsafe {
        env::remove_var("EDUHR__SERVER__PORT");
    }

    // 3) Invalid logging level should error
    let invalid_path = dir.path().join("invalid.toml");
    let invalid_toml = r#"
[logging]
level = "verbose"
"#;
    fs::write(&invalid_path, invalid_toml).expect("write invalid toml");
    let err = load_config(invalid_path.to_str()).expect_err("expected validation error");
    assert!(err.contains("logging.level must be one of"));
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("absent.toml");

    let cfg = load_config(path.to_str()).expect("defaults are valid");
    assert_eq!(cfg.session.idle_timeout, Duration::from_secs(8 * 60 * 60));
    assert!(cfg.settings.path.is_none());
    assert!(cfg.bootstrap.admin_user.is_none());
}
