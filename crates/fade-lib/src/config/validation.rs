use super::ProjectConfig;
use crate::deb::Blacklist;
use crate::error::FadeError;
use debian_packaging::dependency::SingleDependency;
use debian_packaging::package_version::PackageVersion;

/// Checks the format of every field of a configuration about to be persisted.
pub fn validate_config(config: &ProjectConfig) -> Result<(), FadeError> {
    let single_line_fields = [
        ("name", config.name.as_str()),
        ("version", config.version.as_str()),
        ("url", config.url.as_str()),
        ("architecture", config.architecture.as_str()),
        ("priority", config.priority.as_str()),
        ("maintainer_name", config.maintainer_name.as_str()),
        ("maintainer_email", config.maintainer_email.as_str()),
    ];
    for (field, value) in single_line_fields {
        require_single_line(field, value)?;
    }
    for dependency in &config.depends {
        require_single_line("depends", dependency)?;
    }
    if config.description.contains('\r') {
        return Err(FadeError::validation(
            "description",
            "must not contain carriage returns",
        ));
    }

    validate_package_name(&config.name)?;
    validate_version(&config.version)?;
    require_text("description", &config.description)?;

    url::Url::parse(&config.url)
        .map_err(|e| FadeError::validation("url", format!("'{}' is not a URL: {e}", config.url)))?;

    require_single_word("architecture", &config.architecture)?;
    require_single_word("priority", &config.priority)?;
    require_text("maintainer_name", &config.maintainer_name)?;
    validate_email(&config.maintainer_email)?;
    require_text("run", &config.run)?;

    if config.depends.is_empty() {
        return Err(FadeError::missing("depends"));
    }
    for dependency in &config.depends {
        validate_dependency(dependency)?;
    }

    for entry in &config.blacklist {
        if entry.trim().is_empty() {
            return Err(FadeError::validation("blacklist", "entries must not be empty"));
        }
        if entry.starts_with('/') {
            return Err(FadeError::validation(
                "blacklist",
                format!("'{entry}' must be relative to the project root"),
            ));
        }
    }
    Blacklist::new(&config.blacklist)?;

    Ok(())
}

/// Build-time check for mandatory data. Unlike [`validate_config`] this only
/// looks for absent values, since the persisted state may have been written
/// by something other than `fade init`.
pub fn ensure_complete(config: &ProjectConfig) -> Result<(), FadeError> {
    let mandatory = [
        ("name", config.name.as_str()),
        ("version", config.version.as_str()),
        ("description", config.description.as_str()),
        ("run", config.run.as_str()),
        ("maintainer_name", config.maintainer_name.as_str()),
        ("maintainer_email", config.maintainer_email.as_str()),
    ];

    if let Some((field, _)) = mandatory.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(FadeError::IncompleteConfig {
            field: field.to_string(),
        });
    }

    if config.depends.iter().all(|dependency| dependency.trim().is_empty()) {
        return Err(FadeError::IncompleteConfig {
            field: "depends".to_string(),
        });
    }

    Ok(())
}

fn require_text(field: &str, value: &str) -> Result<(), FadeError> {
    if value.trim().is_empty() {
        Err(FadeError::validation(field, "must not be empty"))
    } else {
        Ok(())
    }
}

/// Control fields are line based; a line break would start a new field.
fn require_single_line(field: &str, value: &str) -> Result<(), FadeError> {
    if value.chars().any(char::is_control) {
        return Err(FadeError::validation(
            field,
            format!("{value:?} must not contain line breaks or control characters"),
        ));
    }
    Ok(())
}

fn require_single_word(field: &str, value: &str) -> Result<(), FadeError> {
    require_text(field, value)?;
    if value.chars().any(char::is_whitespace) {
        return Err(FadeError::validation(
            field,
            format!("'{value}' must not contain whitespace"),
        ));
    }
    Ok(())
}

/// Debian policy 5.6.1: lowercase alphanumerics plus `+`, `-` and `.`,
/// at least two characters, starting with an alphanumeric.
fn validate_package_name(name: &str) -> Result<(), FadeError> {
    let valid_charset = name
        .chars()
        .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '+' | '-' | '.'));
    let valid_start = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit());

    if name.len() < 2 || !valid_charset || !valid_start {
        return Err(FadeError::validation(
            "name",
            format!(
                "'{name}' is not a valid package name (lowercase letters, digits, '+', '-', '.'; at least 2 characters)"
            ),
        ));
    }
    Ok(())
}

fn validate_version(version: &str) -> Result<(), FadeError> {
    require_text("version", version)?;
    PackageVersion::parse(version)
        .map(|_| ())
        .map_err(|e| FadeError::validation("version", format!("'{version}': {e}")))
}

fn validate_email(email: &str) -> Result<(), FadeError> {
    require_text("maintainer_email", email)?;
    let malformed = !email.contains('@')
        || email.chars().any(|c| c.is_whitespace() || c == '<' || c == '>');
    if malformed {
        return Err(FadeError::validation(
            "maintainer_email",
            format!("'{email}' is not an email address"),
        ));
    }
    Ok(())
}

fn validate_dependency(dependency: &str) -> Result<(), FadeError> {
    for alternative in dependency.split('|') {
        let alternative = alternative.trim();
        if alternative.is_empty() {
            return Err(FadeError::validation(
                "depends",
                format!("'{dependency}' contains an empty alternative"),
            ));
        }
        SingleDependency::parse(alternative)
            .map_err(|e| FadeError::validation("depends", format!("'{alternative}': {e}")))?;
    }
    Ok(())
}
