use call_intake::config::{ConfigError, ConfigLoader};
use std::{
    env, fs,
    path::PathBuf,
    sync::{Mutex, MutexGuard, OnceLock},
};
use tempfile::TempDir;

const KEYS: &[&str] = &[
    "CALL_INTAKE_PROFILE",
    "CALL_INTAKE_API_BIND_ADDR",
    "CALL_INTAKE_LOG_LEVEL",
    "CALL_INTAKE_LOG_FORMAT",
    "CALL_INTAKE_DATABASE_URL",
    "CALL_INTAKE_AUDIT_LOG_PATH",
    "CALL_INTAKE_SOURCE_MAP_PATH",
    "CALL_INTAKE_MAX_BODY_KB",
    "CALL_INTAKE_RUN_MIGRATIONS",
];

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

fn env_guard() -> MutexGuard<'static, ()> {
    env_lock()
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
}

fn clear_env() {
    for key in KEYS {
        unsafe {
            env::remove_var(key);
        }
    }
}

fn write_env_file(dir: &TempDir, name: &str, contents: &str) {
    let path = dir.path().join(name);
    fs::write(path, contents).unwrap();
}

fn loader(dir: &TempDir) -> ConfigLoader {
    ConfigLoader::with_base_dir(PathBuf::from(dir.path()))
}

#[test]
fn loads_defaults_when_no_env_present() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    let cfg = loader(&temp_dir).load().expect("config loads with defaults");

    assert_eq!(cfg.profile, "local");
    assert_eq!(cfg.api_bind_addr, "0.0.0.0:8080");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.log_format, "json");
    assert_eq!(cfg.audit_log_path, PathBuf::from("logs/webhooks.log"));
    assert_eq!(cfg.source_map_path, None);
    assert_eq!(cfg.max_body_bytes(), 256 * 1024);
    assert!(cfg.run_migrations);
    cfg.bind_addr().expect("default bind addr parses");
}

#[test]
fn layered_env_files_apply_in_order() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(&temp_dir, ".env", "CALL_INTAKE_API_BIND_ADDR=127.0.0.1:3000\n");
    write_env_file(
        &temp_dir,
        ".env.test",
        "CALL_INTAKE_API_BIND_ADDR=192.168.0.10:5000\nCALL_INTAKE_LOG_FORMAT=pretty\n",
    );
    write_env_file(
        &temp_dir,
        ".env.test.local",
        "CALL_INTAKE_API_BIND_ADDR=10.0.0.5:6000\n",
    );

    // Select profile via .env.local before profile-specific files load.
    write_env_file(
        &temp_dir,
        ".env.local",
        "CALL_INTAKE_PROFILE=test\nCALL_INTAKE_API_BIND_ADDR=127.0.0.1:4000\n",
    );

    let cfg = loader(&temp_dir)
        .load()
        .expect("config loads with layered env files");

    assert_eq!(cfg.profile, "test");
    assert_eq!(cfg.api_bind_addr, "10.0.0.5:6000");
    assert_eq!(cfg.log_format, "pretty");
}

#[test]
fn os_environment_has_highest_precedence() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(
        &temp_dir,
        ".env",
        "CALL_INTAKE_API_BIND_ADDR=127.0.0.1:3000\nCALL_INTAKE_AUDIT_LOG_PATH=/var/log/a.log\n",
    );

    unsafe {
        env::set_var("CALL_INTAKE_API_BIND_ADDR", "0.0.0.0:9090");
    }

    let cfg = loader(&temp_dir).load().expect("config loads with env override");
    assert_eq!(cfg.api_bind_addr, "0.0.0.0:9090");
    assert_eq!(cfg.audit_log_path, PathBuf::from("/var/log/a.log"));

    clear_env();
}

#[test]
fn unprefixed_variables_are_ignored() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(&temp_dir, ".env", "API_BIND_ADDR=not-an-addr\nMAX_BODY_KB=0\n");

    let cfg = loader(&temp_dir).load().expect("unprefixed keys are skipped");
    assert_eq!(cfg.api_bind_addr, "0.0.0.0:8080");
}

#[test]
fn invalid_bind_addr_returns_error() {
    let _guard = env_guard();
    clear_env();

    unsafe {
        env::set_var("CALL_INTAKE_API_BIND_ADDR", "not-an-addr");
    }
    let temp_dir = TempDir::new().unwrap();
    let err = loader(&temp_dir)
        .load()
        .expect_err("invalid bind addr should fail");
    assert!(format!("{}", err).contains("invalid api bind address"));

    clear_env();
}

#[test]
fn invalid_log_format_returns_error() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(&temp_dir, ".env", "CALL_INTAKE_LOG_FORMAT=xml\n");

    let err = loader(&temp_dir).load().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidLogFormat { .. }));
}

#[test]
fn run_migrations_flag_is_parsed() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(&temp_dir, ".env", "CALL_INTAKE_RUN_MIGRATIONS=false\n");
    let cfg = loader(&temp_dir).load().unwrap();
    assert!(!cfg.run_migrations);

    write_env_file(&temp_dir, ".env", "CALL_INTAKE_RUN_MIGRATIONS=maybe\n");
    let err = loader(&temp_dir).load().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidBool {
            key: "RUN_MIGRATIONS",
            ..
        }
    ));
}

#[test]
fn source_map_path_and_body_limit_are_read() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(
        &temp_dir,
        ".env",
        "CALL_INTAKE_SOURCE_MAP_PATH=config/sources.json\nCALL_INTAKE_MAX_BODY_KB=64\n",
    );

    let cfg = loader(&temp_dir).load().unwrap();
    assert_eq!(cfg.source_map_path, Some(PathBuf::from("config/sources.json")));
    assert_eq!(cfg.max_body_bytes(), 64 * 1024);
}

#[test]
fn redacted_json_hides_database_password() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(
        &temp_dir,
        ".env",
        "CALL_INTAKE_DATABASE_URL=postgresql://calls:hunter2@db:5432/calls\n",
    );

    let cfg = loader(&temp_dir).load().unwrap();
    let redacted = cfg.redacted_json().unwrap();
    assert!(!redacted.contains("hunter2"));
    assert!(redacted.contains("REDACTED"));
}
