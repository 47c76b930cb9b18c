use std::path::PathBuf;
use std::time::Duration;

use scw_registry::Config;
use scw_registry::config::DEFAULT_REGION;

/// Where the credentials come from, as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CredentialArgs {
    pub key_file: Option<PathBuf>,
    pub org_file: Option<PathBuf>,
    pub region: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Resolve the registry config: credential files when both are given,
/// otherwise the `SCW_*` environment. Explicit flags override either source.
pub fn resolve(args: &CredentialArgs) -> scw_registry::Result<Config> {
    if args.timeout_secs == Some(0) {
        return Err(scw_registry::Error::InvalidConfig(
            "--timeout must be greater than zero".into(),
        ));
    }

    let mut config = match (&args.key_file, &args.org_file) {
        (Some(key), Some(org)) => Config::from_files(
            key,
            org,
            args.region.clone().unwrap_or_else(|| DEFAULT_REGION.into()),
        )?,
        (None, None) => Config::from_env()?,
        _ => {
            return Err(scw_registry::Error::InvalidConfig(
                "--key-file and --org-file must be given together".into(),
            ));
        }
    };

    if let Some(region) = &args.region {
        config.region = region.clone();
    }
    if let Some(secs) = args.timeout_secs {
        config.timeout = Duration::from_secs(secs);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_with_region_override() {
        let dir = tempfile::tempdir().unwrap();
        let key = dir.path().join("real.key");
        let org = dir.path().join("real_org.id");
        std::fs::write(&key, "tok\n").unwrap();
        std::fs::write(&org, "org\n").unwrap();

        let config = resolve(&CredentialArgs {
            key_file: Some(key),
            org_file: Some(org),
            region: Some("ams1".into()),
            timeout_secs: Some(3),
        })
        .unwrap();

        assert_eq!(config.token, "tok");
        assert_eq!(config.organization, "org");
        assert_eq!(config.region, "ams1");
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn half_specified_files_are_rejected() {
        let err = resolve(&CredentialArgs {
            key_file: Some("real.key".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, scw_registry::Error::InvalidConfig(_)));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let key = dir.path().join("real.key");
        let org = dir.path().join("real_org.id");
        std::fs::write(&key, "tok\n").unwrap();
        std::fs::write(&org, "org\n").unwrap();

        let err = resolve(&CredentialArgs {
            key_file: Some(key),
            org_file: Some(org),
            region: None,
            timeout_secs: Some(0),
        })
        .unwrap_err();
        assert!(matches!(err, scw_registry::Error::InvalidConfig(ref msg) if msg.contains("--timeout")));
    }
}
