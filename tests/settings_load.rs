// tests/settings_load.rs
use pickit_generator::config::settings::{ENV_CONFIG_PATH, ENV_HTTP_TIMEOUT, ENV_LEAGUE};
use pickit_generator::Settings;
use std::{env, fs};

#[test]
fn parse_toml_and_json_paths() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("pickit.toml");
    fs::write(
        &p_toml,
        r#"
league = "Dawn"
scout_per_page = 0

[defaults]
waystone_tier = 7
"#,
    )
    .unwrap();
    let t = Settings::load_from(&p_toml).unwrap();
    assert_eq!(t.league, "Dawn");
    assert_eq!(t.scout_per_page, 250, "zero is sanitized back to default");
    assert_eq!(t.defaults.waystone_tier, 7);
    assert_eq!(t.defaults.min_value, 10.0);

    let p_json = dir.path().join("pickit.json");
    fs::write(&p_json, r#"{"ninja_base_url": "http://localhost:9000"}"#).unwrap();
    let j = Settings::load_from(&p_json).unwrap();
    assert_eq!(j.ninja_base_url, "http://localhost:9000");
    assert_eq!(j.league, Settings::default().league);

    let broken = dir.path().join("broken.toml");
    fs::write(&broken, "league = [").unwrap();
    assert!(Settings::load_from(&broken).is_err());
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD so the repo's own config/ is not picked up.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();

    env::remove_var(ENV_CONFIG_PATH);
    env::remove_var(ENV_LEAGUE);
    env::remove_var(ENV_HTTP_TIMEOUT);

    // 1) nothing on disk → built-in defaults
    let d = Settings::load_default().unwrap();
    assert_eq!(d, Settings::default());

    // 2) fallback TOML in ./config/
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(cfg_dir.join("pickit.toml"), r#"league = "From Toml""#).unwrap();
    assert_eq!(Settings::load_default().unwrap().league, "From Toml");

    // 3) env path wins over the fallback
    let p_env = tmp.path().join("elsewhere.json");
    fs::write(&p_env, r#"{"league": "From Env Path"}"#).unwrap();
    env::set_var(ENV_CONFIG_PATH, p_env.display().to_string());
    assert_eq!(Settings::load_default().unwrap().league, "From Env Path");

    // 4) scalar overrides apply last
    env::set_var(ENV_LEAGUE, "Override League");
    env::set_var(ENV_HTTP_TIMEOUT, " 7 ");
    let o = Settings::load_default().unwrap();
    assert_eq!(o.league, "Override League");
    assert_eq!(o.http_timeout_secs, 7);

    // 5) dangling env path is an error
    env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
    assert!(Settings::load_default().is_err());

    env::remove_var(ENV_CONFIG_PATH);
    env::remove_var(ENV_LEAGUE);
    env::remove_var(ENV_HTTP_TIMEOUT);
    env::set_current_dir(&old).unwrap();
}
