use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use finddupes::cli::OutputFormat;
use finddupes::config::{Config, ConfigOverrides};
use finddupes::scanner::FingerprintAlgorithm;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(config.algorithm, FingerprintAlgorithm::Fnv1a);
    assert_eq!(config.output, OutputFormat::Text);
}

#[test]
fn test_config_load_from_env() {
    std::env::set_var("FDTEST_WORKERS", "16");
    std::env::set_var("FDTEST_SKIP_HIDDEN", "true");

    let figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed("FDTEST_"));
    let config: Config = figment.extract().unwrap();

    assert_eq!(config.workers, 16);
    assert!(config.skip_hidden);

    std::env::remove_var("FDTEST_WORKERS");
    std::env::remove_var("FDTEST_SKIP_HIDDEN");
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
workers = 8
buffer_size = 65536
algorithm = "blake3"
skip_hidden = true
respect_gitignore = true
ignore_patterns = ["*.tmp", "node_modules"]
output = "json"
sequential = false
"#;
    fs::write(&config_path, toml_content).unwrap();

    let config = Config::load_from_path(&config_path).unwrap();

    assert_eq!(config.workers, 8);
    assert_eq!(config.buffer_size, 65536);
    assert_eq!(config.algorithm, FingerprintAlgorithm::Blake3);
    assert!(config.skip_hidden);
    assert!(config.respect_gitignore);
    assert_eq!(config.ignore_patterns, vec!["*.tmp", "node_modules"]);
    assert_eq!(config.output, OutputFormat::Json);
}

#[test]
fn test_config_partial_toml_keeps_defaults() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "algorithm = \"xxh3\"\n").unwrap();

    let config = Config::load_from_path(&config_path).unwrap();

    assert_eq!(config.algorithm, FingerprintAlgorithm::Xxh3);
    assert_eq!(config.buffer_size, Config::default().buffer_size);
    assert_eq!(config.workers, Config::default().workers);
}

#[test]
fn test_config_invalid_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "workers = [not valid").unwrap();

    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&config_path));
    assert!(figment.extract::<Config>().is_err());
    assert!(Config::load_from_path(&config_path).is_err());
}

#[test]
fn test_config_overrides_win_over_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "workers = 2\noutput = \"json\"\n").unwrap();

    let overrides = ConfigOverrides {
        workers: Some(9),
        ..ConfigOverrides::default()
    };
    let figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .merge(Serialized::defaults(&overrides));
    let config: Config = figment.extract().unwrap();

    assert_eq!(config.workers, 9);
    assert_eq!(config.output, OutputFormat::Json);
}
