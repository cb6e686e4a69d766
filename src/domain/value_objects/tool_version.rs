use super::scm_type::ScmType;
use regex::Regex;
use semver::Version;
use std::sync::OnceLock;
use thiserror::Error;

/// Version validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("Invalid version string: '{raw}'")]
    Unparseable { raw: String },

    #[error("Version {found} is lower than the required minimum {minimum}")]
    BelowMinimum { found: String, minimum: String },
}

fn version_core() -> &'static Regex {
    static CORE: OnceLock<Regex> = OnceLock::new();
    CORE.get_or_init(|| Regex::new(r"^(\d+\.\d+\.\d+)").expect("version core pattern is valid"))
}

/// Reduce a raw `--version` probe output to its `major.minor.patch` core.
///
/// Git prints `git version 2.43.0` (sometimes followed by vendor noise such as
/// `.windows.1` or ` (Apple Git-146)`). Subversion's quiet mode prints the bare
/// version, but builds like SlikSVN append `-SlikSvn-tag-...`. If no numeric
/// core can be found the trimmed input is returned so validation can reject it.
pub fn parse_version(scm_type: ScmType, raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = match scm_type {
        ScmType::Git => trimmed.strip_prefix("git version ").unwrap_or(trimmed),
        ScmType::Svn => trimmed.strip_prefix("svn, version ").unwrap_or(trimmed),
    }
    .trim();

    version_core()
        .captures(stripped)
        .and_then(|captures| captures.get(1))
        .map(|core| core.as_str().to_string())
        .unwrap_or_else(|| stripped.to_string())
}

/// Check a normalized version against a minimum.
///
/// Returns the version unchanged when it parses as semver and is `>= minimum`.
pub fn validate_version(version: &str, minimum: &str) -> Result<String, VersionError> {
    let found = Version::parse(version).map_err(|_| VersionError::Unparseable {
        raw: version.to_string(),
    })?;
    let required = Version::parse(minimum).map_err(|_| VersionError::Unparseable {
        raw: minimum.to_string(),
    })?;

    if found < required {
        return Err(VersionError::BelowMinimum {
            found: version.to_string(),
            minimum: minimum.to_string(),
        });
    }

    Ok(version.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_dotted_triple(version: &str) -> bool {
        Regex::new(r"^\d+\.\d+\.\d+$").unwrap().is_match(version)
    }

    #[test]
    fn test_parse_git_versions() {
        assert_eq!(parse_version(ScmType::Git, "git version 2.43.0\n"), "2.43.0");
        assert_eq!(
            parse_version(ScmType::Git, "git version 2.41.0.windows.1"),
            "2.41.0"
        );
        assert_eq!(
            parse_version(ScmType::Git, "git version 2.39.3 (Apple Git-146)"),
            "2.39.3"
        );
    }

    #[test]
    fn test_parse_svn_versions() {
        assert_eq!(parse_version(ScmType::Svn, "1.14.2"), "1.14.2");
        assert_eq!(
            parse_version(ScmType::Svn, "1.6.17-SlikSvn-tag-1.6.17@1130898-X64"),
            "1.6.17"
        );
        assert_eq!(
            parse_version(ScmType::Svn, "svn, version 1.14.1 (r1886195)"),
            "1.14.1"
        );
    }

    #[test]
    fn test_parsed_versions_are_dotted_triples() {
        for (scm_type, raw) in [
            (ScmType::Git, "git version 2.34.1"),
            (ScmType::Git, "git version 2.45.2.windows.1"),
            (ScmType::Svn, "1.10.0-SlikSvn"),
            (ScmType::Svn, "1.9.7"),
        ] {
            let parsed = parse_version(scm_type, raw);
            assert!(is_dotted_triple(&parsed), "{raw} -> {parsed}");
        }
    }

    #[test]
    fn test_parse_keeps_garbage_for_validation() {
        assert_eq!(parse_version(ScmType::Git, "not a version"), "not a version");
    }

    #[test]
    fn test_validate_version() {
        assert_eq!(validate_version("1.14.2", "1.6.0"), Ok("1.14.2".to_string()));
        assert_eq!(validate_version("1.6.0", "1.6.0"), Ok("1.6.0".to_string()));
        assert_eq!(validate_version("2.43.0", "0.0.0"), Ok("2.43.0".to_string()));

        assert_eq!(
            validate_version("1.5.9", "1.6.0"),
            Err(VersionError::BelowMinimum {
                found: "1.5.9".to_string(),
                minimum: "1.6.0".to_string(),
            })
        );
        assert!(matches!(
            validate_version("1.14", "1.6.0"),
            Err(VersionError::Unparseable { .. })
        ));
        assert!(matches!(
            validate_version("garbage", "0.0.0"),
            Err(VersionError::Unparseable { .. })
        ));
    }
}
