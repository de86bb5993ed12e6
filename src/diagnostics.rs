use std::path::Path;

use crate::config::{Config, MIN_SECRET_LEN};
use crate::token::TokenSecret;

pub fn check(cfg: &Config, registry_dir: &Path) -> anyhow::Result<()> {
    let mut errors: Vec<String> = Vec::new();

    // Check 1: token secret present and not trivially short
    if cfg.command.needs_secret() {
        let secret = TokenSecret::new(cfg.secret.clone().unwrap_or_default());
        if secret.is_empty() {
            errors.push(
                "no token secret configured\n  \
                 → set FIDOPHOTO_SECRET or pass --secret"
                    .to_string(),
            );
        } else if secret.len() < MIN_SECRET_LEN {
            errors.push(format!(
                "token secret is {} bytes, need at least {MIN_SECRET_LEN}\n  \
                 → generate one with: openssl rand -base64 32",
                secret.len()
            ));
        }
    }

    // Check 2: registry directory usable
    if cfg.command.needs_registry() {
        if let Err(e) = std::fs::create_dir_all(registry_dir) {
            errors.push(format!(
                "cannot create registry dir {}: {e}\n  \
                 → pass --registry-dir or set FIDOPHOTO_REGISTRY_DIR",
                registry_dir.display()
            ));
        } else if let Err(e) = std::fs::read_dir(registry_dir) {
            errors.push(format!("cannot read registry dir {}: {e}", registry_dir.display()));
        }
    }

    if errors.is_empty() {
        return Ok(());
    }

    for err in &errors {
        eprintln!("ERROR: {err}");
    }
    anyhow::bail!("{} preflight check(s) failed", errors.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_short_secret_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::try_parse_from(["fidophoto", "--secret", "short", "issue-token", "a"]).unwrap();
        assert!(check(&cfg, dir.path()).is_err());
    }

    #[test]
    fn test_empty_secret_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::try_parse_from(["fidophoto", "--secret", "", "resolve-token", "t"]).unwrap();
        assert!(check(&cfg, dir.path()).is_err());
    }

    #[test]
    fn test_good_config_passes() {
        let dir = tempfile::tempdir().unwrap();
        let registry = dir.path().join("registrations");
        let cfg = Config::try_parse_from(["fidophoto", "--secret", "0123456789abcdef", "list"]).unwrap();
        check(&cfg, &registry).unwrap();
        assert!(registry.is_dir());
    }
}
