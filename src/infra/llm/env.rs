use std::time::Duration;

use crate::domain::ConfigError;

/// Lookup used by the config loaders. Production passes [`read_env_var`];
/// tests pass a map so nothing touches the process environment.
pub(crate) type VarReader<'a> = &'a dyn Fn(&str) -> Result<Option<String>, ConfigError>;

pub(crate) fn read_env_var(name: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(error) => Err(ConfigError::Unreadable {
            name: name.to_string(),
            message: error.to_string(),
        }),
    }
}

/// An override that is set must carry a non-blank value.
pub(crate) fn non_empty_var(read: VarReader<'_>, name: &str) -> Result<Option<String>, ConfigError> {
    match read(name)? {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => {
            Err(ConfigError::invalid(name, "must not be empty when set"))
        }
        Some(value) => Ok(Some(value.trim().to_string())),
    }
}

/// First set, non-blank value among `names`, in order.
pub(crate) fn first_present_var(
    read: VarReader<'_>,
    names: &[&str],
) -> Result<Option<String>, ConfigError> {
    for name in names {
        if let Some(value) = read(name)? {
            let value = value.trim();
            if !value.is_empty() {
                return Ok(Some(value.to_string()));
            }
        }
    }
    Ok(None)
}

pub(crate) fn timeout_var(read: VarReader<'_>, name: &str) -> Result<Option<Duration>, ConfigError> {
    Ok(positive_var(read, name, "seconds")?.map(Duration::from_secs))
}

pub(crate) fn byte_limit_var(read: VarReader<'_>, name: &str) -> Result<Option<usize>, ConfigError> {
    positive_var(read, name, "bytes")?
        .map(|bytes| {
            usize::try_from(bytes).map_err(|_| ConfigError::invalid(name, "is too large"))
        })
        .transpose()
}

fn positive_var(read: VarReader<'_>, name: &str, unit: &str) -> Result<Option<u64>, ConfigError> {
    let Some(value) = read(name)? else {
        return Ok(None);
    };
    let parsed = value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::invalid(name, format!("must be a positive integer in {unit}")))?;
    if parsed == 0 {
        return Err(ConfigError::invalid(name, format!("must be greater than 0 {unit}")));
    }
    Ok(Some(parsed))
}
