use regex::Regex;
use std::sync::OnceLock;

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

/// Expand `${VAR_NAME}` references through `lookup`.
/// Unknown variables are left as written.
pub fn expand_with(value: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    env_var_pattern()
        .replace_all(value, |caps: &regex::Captures| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Base URLs must be absolute http(s) URLs
pub fn validate_base_url(url: &str) -> Result<String, String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Err(format!(
            "API base URL must start with http:// or https://, got '{}'",
            url
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_known_and_unknown_vars() {
        let lookup = |name: &str| (name == "HOST").then(|| "api.example.com".to_string());
        assert_eq!(
            expand_with("https://${HOST}/x/${MISSING}", lookup),
            "https://api.example.com/x/${MISSING}"
        );
    }

    #[test]
    fn test_validate_base_url() {
        assert_eq!(
            validate_base_url("http://localhost:5000/").unwrap(),
            "http://localhost:5000"
        );
        assert!(validate_base_url("localhost:5000").is_err());
    }
}
