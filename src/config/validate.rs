use std::path::Path;

use anyhow::{Result, bail};

use super::AppConfig;

pub fn validate(cfg: &AppConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.general.host.trim().is_empty() {
        errors.push("general.host must not be empty".to_string());
    }

    if cfg.general.port == 0 {
        errors.push("general.port must be > 0".to_string());
    }

    if cfg.logging.rust_log.trim().is_empty() {
        errors.push("logging.rust_log must not be empty".to_string());
    }

    check_paths("metamodel.entity_dirs", &cfg.metamodel.entity_dirs, &mut errors);
    check_paths("metamodel.manifests", &cfg.metamodel.manifests, &mut errors);

    if errors.is_empty() {
        return Ok(());
    }

    bail!("invalid app config:\n- {}", errors.join("\n- "))
}

fn check_paths(key: &str, paths: &[impl AsRef<Path>], errors: &mut Vec<String>) {
    for (idx, path) in paths.iter().enumerate() {
        if path.as_ref().as_os_str().is_empty() {
            errors.push(format!("{key}[{idx}] must not be empty"));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::validate;
    use crate::config::AppConfig;

    #[test]
    fn defaults_are_valid() {
        assert!(validate(&AppConfig::default()).is_ok());
    }

    #[test]
    fn default_general_section_listens_on_port_3000() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.general.host, "127.0.0.1");
        assert_eq!(cfg.general.port, 3000);
    }

    #[test]
    fn every_problem_is_reported_at_once() {
        let mut cfg = AppConfig::default();
        cfg.general.host = " ".to_string();
        cfg.general.port = 0;
        cfg.metamodel.manifests = vec![PathBuf::from("shop.json"), PathBuf::new()];

        let message = validate(&cfg).expect_err("config is invalid").to_string();
        assert!(message.contains("general.host must not be empty"));
        assert!(message.contains("general.port must be > 0"));
        assert!(message.contains("metamodel.manifests[1] must not be empty"));
        assert!(!message.contains("metamodel.manifests[0]"));
    }
}
