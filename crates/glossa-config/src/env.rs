use std::env;

use crate::Config;

impl Config {
    /// Apply `GLOSSA_*` environment overrides on top of `self`
    pub fn with_env(mut self) -> Self {
        if let Ok(url) = env::var("GLOSSA_DATA_URL")
            && !url.trim().is_empty()
        {
            self.data_url = url;
        }

        if let Some(debug) = env::var("GLOSSA_DEBUG").ok().and_then(|v| parse_flag(&v)) {
            self.debug_mode = debug;
        }

        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::parse_flag;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag(" TRUE "), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
