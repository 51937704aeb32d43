//! Release tag parsing.
//!
//! Tags are parsed tolerantly: an optional leading `v`, one to three
//! numeric components (missing minor/patch default to zero), an
//! optional pre-release suffix after `-`, and build metadata after `+`
//! which is ignored. Release applicability only ever compares the
//! `major.minor` stream, so the tolerance never changes a verdict.

/// A parsed release tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Option<String>,
}

/// Failure to parse a release tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{tag}` is not a release version: {reason}")]
pub struct ParseVersionError {
    pub tag: String,
    pub reason: String,
}

impl ReleaseVersion {
    /// Parse a release tag, tolerating the common deviations from
    /// strict MAJOR.MINOR.PATCH form.
    pub fn parse_tolerant(tag: &str) -> Result<Self, ParseVersionError> {
        let fail = |reason: &str| ParseVersionError {
            tag: tag.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return Err(fail("empty tag"));
        }
        let stripped = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        // Build metadata never participates in stream comparison.
        let without_build = match stripped.split_once('+') {
            Some((v, _)) => v,
            None => stripped,
        };

        let (version_part, pre) = match without_build.split_once('-') {
            Some((v, p)) if !p.is_empty() => (v, Some(p.to_string())),
            Some(_) => return Err(fail("empty pre-release suffix")),
            None => (without_build, None),
        };

        let parts: Vec<&str> = version_part.split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(fail("expected 1 to 3 `.`-separated components"));
        }

        let mut numbers = [0u64; 3];
        for (i, part) in parts.iter().enumerate() {
            numbers[i] = part
                .parse::<u64>()
                .map_err(|_| fail(&format!("`{part}` is not a number")))?;
        }

        Ok(Self {
            major: numbers[0],
            minor: numbers[1],
            patch: numbers[2],
            pre,
        })
    }

    /// The `major.minor` release stream this tag belongs to.
    pub fn major_minor(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }
}

impl std::fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre {
            write!(f, "-{pre}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_version() {
        let v = ReleaseVersion::parse_tolerant("4.14.3").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (4, 14, 3));
        assert_eq!(v.pre, None);
        assert_eq!(v.major_minor(), "4.14");
    }

    #[test]
    fn test_parse_tolerates_v_prefix() {
        let v = ReleaseVersion::parse_tolerant("v4.14.3").unwrap();
        assert_eq!(v.major_minor(), "4.14");
    }

    #[test]
    fn test_parse_tolerates_missing_components() {
        let v = ReleaseVersion::parse_tolerant("4.14").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (4, 14, 0));

        let v = ReleaseVersion::parse_tolerant("4").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (4, 0, 0));
    }

    #[test]
    fn test_parse_pre_release_and_build_metadata() {
        let v = ReleaseVersion::parse_tolerant("4.14.0-rc.0").unwrap();
        assert_eq!(v.pre.as_deref(), Some("rc.0"));

        let v = ReleaseVersion::parse_tolerant("4.14.0+build.17").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (4, 14, 0));
        assert_eq!(v.pre, None);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(ReleaseVersion::parse_tolerant("not-a-semver").is_err());
        assert!(ReleaseVersion::parse_tolerant("").is_err());
        assert!(ReleaseVersion::parse_tolerant("4.14.3.1").is_err());
        assert!(ReleaseVersion::parse_tolerant("4.x.3").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let v = ReleaseVersion::parse_tolerant("4.14.3-rc.1").unwrap();
        assert_eq!(v.to_string(), "4.14.3-rc.1");
    }
}
