//! Coverage for `.env` credential loading.

use std::collections::BTreeMap;

use herald::credentials::{load_credentials, Credentials};

#[test]
fn file_values_take_precedence_over_env() {
    let mut vars = BTreeMap::new();
    vars.insert("BOT_TOKEN".to_owned(), "from-file".to_owned());
    let creds = Credentials::from_map(vars);

    let token = creds.resolve_with("BOT_TOKEN", |_| Some("from-env".to_owned()));
    assert_eq!(token.as_deref(), Some("from-file"));
}

#[test]
fn env_is_consulted_when_file_lacks_key() {
    let creds = Credentials::default();
    let token = creds.resolve_with("BOT_TOKEN", |k| {
        (k == "BOT_TOKEN").then(|| "from-env".to_owned())
    });
    assert_eq!(token.as_deref(), Some("from-env"));
}

#[test]
fn blank_values_count_as_missing() {
    let mut vars = BTreeMap::new();
    vars.insert("BOT_TOKEN".to_owned(), "  ".to_owned());
    let creds = Credentials::from_map(vars);
    assert!(creds.resolve_with("BOT_TOKEN", |_| None).is_none());
}

#[test]
fn debug_output_redacts_values() {
    let mut vars = BTreeMap::new();
    vars.insert("BOT_TOKEN".to_owned(), "123:secret".to_owned());
    let rendered = format!("{:?}", Credentials::from_map(vars));
    assert!(rendered.contains("BOT_TOKEN"));
    assert!(!rendered.contains("123:secret"));
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert!(load_credentials(&dir.path().join(".env")).is_err());
}

#[cfg(unix)]
#[test]
fn private_env_file_is_loaded() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(".env");
    std::fs::write(&path, "BOT_TOKEN=123:abc\n# comment\nOTHER=x\n").expect("write env");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600)).expect("chmod");

    let creds = load_credentials(&path).expect("load");
    assert_eq!(creds.get("BOT_TOKEN"), Some("123:abc"));
    assert_eq!(creds.get("OTHER"), Some("x"));
}

#[cfg(unix)]
#[test]
fn world_readable_env_file_is_rejected() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(".env");
    std::fs::write(&path, "BOT_TOKEN=123:abc\n").expect("write env");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).expect("chmod");

    let err = load_credentials(&path).expect_err("too permissive");
    assert!(err.to_string().contains("0600"));
}
