//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// `field` names the config key in error messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env(value)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} {}", e.var_name, e.cause),
        })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_plain_value_unchanged() {
        assert_eq!(expand_env("mdchapters", "docs.source_dir").unwrap(), "mdchapters");
    }

    #[test]
    fn test_default_used_when_unset() {
        assert_eq!(
            expand_env("${QUIRE_TEST_SURELY_UNSET_VAR:-chapters}", "docs.source_dir").unwrap(),
            "chapters"
        );
    }

    #[test]
    fn test_unset_variable_is_error() {
        let err = expand_env("${QUIRE_TEST_SURELY_UNSET_VAR}/docs", "docs.source_dir").unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { ref field, .. } if field == "docs.source_dir"));
        assert!(err.to_string().contains("QUIRE_TEST_SURELY_UNSET_VAR"));
    }
}
