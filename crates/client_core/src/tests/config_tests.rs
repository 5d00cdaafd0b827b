use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

fn temp_config(contents: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("academy_config_test_{suffix}.toml"));
    fs::write(&path, contents).expect("write config");
    path
}

#[test]
fn missing_file_and_env_leave_identity_unconfigured() {
    let settings = load_settings_with(Path::new("/nonexistent/academy.toml"), env_from(&[]));
    assert!(settings.supabase_url.is_none());
    assert!(settings.supabase_anon_key.is_none());
    assert!(settings.auto_refresh);
    assert_eq!(settings.problems().len(), 2);
}

#[test]
fn environment_overrides_file_values() {
    let path = temp_config(
        r#"
supabase_url = "https://file.supabase.co"
supabase_anon_key = "file-key"
auto_refresh = false
"#,
    );

    let settings = load_settings_with(
        &path,
        env_from(&[
            ("SUPABASE_URL", "https://env.supabase.co"),
            ("APP__AUTO_REFRESH", "yes"),
        ]),
    );
    assert_eq!(
        settings.supabase_url.as_deref(),
        Some("https://env.supabase.co")
    );
    assert_eq!(settings.supabase_anon_key.as_deref(), Some("file-key"));
    assert!(settings.auto_refresh);
    assert!(settings.problems().is_empty());

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn app_prefixed_names_win_over_vite_names() {
    let settings = load_settings_with(
        Path::new("/nonexistent/academy.toml"),
        env_from(&[
            ("VITE_SUPABASE_ANON_KEY", "vite-key"),
            ("APP__SUPABASE_ANON_KEY", "app-key"),
        ]),
    );
    assert_eq!(settings.supabase_anon_key.as_deref(), Some("app-key"));
}

#[test]
fn blank_environment_values_are_ignored() {
    let settings = load_settings_with(
        Path::new("/nonexistent/academy.toml"),
        env_from(&[("SUPABASE_URL", "   ")]),
    );
    assert!(settings.supabase_url.is_none());
}

#[test]
fn malformed_url_is_reported_as_a_problem() {
    let settings = IdentitySettings {
        supabase_url: Some("not a url".to_string()),
        supabase_anon_key: Some("key".to_string()),
        ..IdentitySettings::default()
    };
    let problems = settings.problems();
    assert_eq!(problems.len(), 1);
    assert!(problems[0].contains("invalid"));
}

#[test]
fn unparseable_file_falls_back_to_defaults() {
    let path = temp_config("supabase_url = [");
    let settings = load_settings_with(&path, env_from(&[]));
    assert!(settings.supabase_url.is_none());
    fs::remove_file(path).expect("cleanup");
}
