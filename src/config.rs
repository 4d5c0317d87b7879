//! Environment configuration, loaded once at startup.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::composer::OpenAiConfig;
use crate::document::text::DEFAULT_COMPANY_NAME;
use crate::storage::{SupabaseConfig, DEFAULT_SIGNED_URL_TTL};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app_env: String,
    pub host: String,
    pub port: u16,
    pub base_url: String,
    pub output_dir: PathBuf,
    pub allowed_origins: Vec<String>,
    pub default_company_name: String,
    pub signed_url_ttl: Duration,
    pub supabase: Option<SupabaseConfig>,
    pub openai: Option<OpenAiConfig>,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Split a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_env: "production".to_string(),
            host: "0.0.0.0".to_string(),
            port: 5000,
            base_url: "http://localhost:5000".to_string(),
            output_dir: PathBuf::from("./generated_pdfs"),
            allowed_origins: Vec::new(),
            default_company_name: DEFAULT_COMPANY_NAME.to_string(),
            signed_url_ttl: DEFAULT_SIGNED_URL_TTL,
            supabase: None,
            openai: None,
        }
    }
}

impl AppConfig {
    /// Read the process environment. `run()` loads `.env` beforehand.
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|e| format!("PORT must be a valid port number: {}", e))?,
            Err(_) => defaults.port,
        };

        let signed_url_ttl = match env::var("SIGNED_URL_TTL_SECS") {
            Ok(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .map_err(|e| format!("SIGNED_URL_TTL_SECS must be a number of seconds: {}", e))?,
            ),
            Err(_) => defaults.signed_url_ttl,
        };

        let supabase = SupabaseConfig::from_env();
        if supabase.is_none() {
            log::info!("Object storage not configured; falling back to local file storage.");
        }

        let openai = OpenAiConfig::from_env()?;
        if openai.is_none() {
            log::info!("Text generation not configured; composed proposals use the template.");
        }

        Ok(Self {
            app_env: var_or("APP_ENV", &defaults.app_env),
            host: var_or("HOST", &defaults.host),
            port,
            base_url: var_or("BASE_URL", &defaults.base_url),
            output_dir: PathBuf::from(var_or("PDF_OUTPUT_DIR", "./generated_pdfs")),
            allowed_origins: parse_origins(&env::var("ALLOWED_ORIGINS").unwrap_or_default()),
            default_company_name: var_or("DEFAULT_COMPANY_NAME", DEFAULT_COMPANY_NAME),
            signed_url_ttl,
            supabase,
            openai,
        })
    }

    pub fn is_development(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("development")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins(" https://a.example, ,https://b.example ,"),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.default_company_name, "Your Company");
        assert_eq!(config.signed_url_ttl, Duration::from_secs(86400));
        assert!(!config.is_development());
    }

    #[test]
    fn test_from_env_reads_process_environment() {
        env::set_var("SIGNED_URL_TTL_SECS", "soon");
        let err = AppConfig::from_env().unwrap_err();
        env::remove_var("SIGNED_URL_TTL_SECS");
        assert!(err.starts_with("SIGNED_URL_TTL_SECS must be a number of seconds"));
    }
}
