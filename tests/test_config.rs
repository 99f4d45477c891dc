use std::path::PathBuf;
use std::time::Duration;

use serial_test::serial;
use simple_web_server::config::{CONFIG_PATH_ENV, Config, DOC_ROOT_ENV, LISTEN_ENV};

fn clear_env() {
    unsafe {
        std::env::remove_var(CONFIG_PATH_ENV);
        std::env::remove_var(LISTEN_ENV);
        std::env::remove_var(DOC_ROOT_ENV);
    }
}

#[test]
#[serial]
fn test_config_defaults() {
    clear_env();
    let cfg = Config::load().unwrap();

    assert_eq!(cfg.server.listen_addr, "127.0.0.1:8080");
    assert_eq!(cfg.server.max_connections, 1024);
    assert_eq!(cfg.server.read_timeout(), Duration::from_secs(10));
    assert_eq!(cfg.server.write_timeout(), Duration::from_secs(30));
    assert_eq!(cfg.static_files.document_root, PathBuf::from("."));
    assert_eq!(cfg.static_files.welcome_page, PathBuf::from("welcome/welcome.html"));
    assert_eq!(cfg.static_files.favicon, PathBuf::from("images/favicon.ico"));
}

#[test]
#[serial]
fn test_config_custom_address_from_env() {
    clear_env();
    unsafe {
        std::env::set_var(LISTEN_ENV, "0.0.0.0:3000");
        std::env::set_var(DOC_ROOT_ENV, "/srv/www");
    }
    let cfg = Config::load().unwrap();
    clear_env();

    assert_eq!(cfg.server.listen_addr, "0.0.0.0:3000");
    assert_eq!(cfg.static_files.document_root, PathBuf::from("/srv/www"));
}

#[test]
#[serial]
fn test_config_file_with_env_override() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("server.yaml");
    std::fs::write(
        &path,
        "server:\n  listen_addr: \"127.0.0.1:9000\"\n  max_connections: 8\nstatic_files:\n  server_name: \"From file\"\n",
    )
    .unwrap();

    unsafe {
        std::env::set_var(CONFIG_PATH_ENV, &path);
        std::env::set_var(LISTEN_ENV, "127.0.0.1:9100");
    }
    let cfg = Config::load().unwrap();
    clear_env();

    assert_eq!(cfg.server.listen_addr, "127.0.0.1:9100");
    assert_eq!(cfg.server.max_connections, 8);
    assert_eq!(cfg.static_files.server_name, "From file");
}

#[test]
#[serial]
fn test_config_missing_file_is_an_error() {
    clear_env();
    unsafe {
        std::env::set_var(CONFIG_PATH_ENV, "/definitely/not/here.yaml");
    }
    let result = Config::load();
    clear_env();

    assert!(result.is_err());
}

#[test]
fn test_config_from_yaml_partial() {
    let cfg = Config::from_yaml_str(
        "static_files:\n  document_root: ./public\n  welcome_page: home.html\n",
    )
    .unwrap();

    assert_eq!(cfg.static_files.document_root, PathBuf::from("./public"));
    assert_eq!(cfg.static_files.welcome_page, PathBuf::from("home.html"));
    assert_eq!(cfg.static_files.favicon, PathBuf::from("images/favicon.ico"));
    assert_eq!(cfg.server.listen_addr, "127.0.0.1:8080");
}

#[test]
fn test_config_from_empty_yaml() {
    let cfg = Config::from_yaml_str("  \n").unwrap();
    assert_eq!(cfg.server.listen_addr, "127.0.0.1:8080");
}

#[test]
fn test_config_rejects_zero_limits() {
    assert!(Config::from_yaml_str("server:\n  max_connections: 0\n").is_err());
    assert!(Config::from_yaml_str("server:\n  read_timeout_secs: 0\n").is_err());
}

#[test]
fn test_config_rejects_malformed_yaml() {
    assert!(Config::from_yaml_str("server: 42").is_err());
}

#[test]
fn test_config_clone() {
    let cfg1 = Config::default();
    let cfg2 = cfg1.clone();
    assert_eq!(cfg1.server.listen_addr, cfg2.server.listen_addr);
}
