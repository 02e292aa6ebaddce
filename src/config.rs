use std::env;
use std::time::Duration;

pub const MIN_SESSION_SECRET_LEN: usize = 32;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: String,
    pub session_secret: String,
    pub bind_addr: String,
    pub session_ttl: Duration,
    pub cookie_secure: bool,
    pub cors_origin: String,
    pub backend_timeout: Duration,
    pub max_image_bytes: usize,
    pub debug_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let session_secret =
            lookup("SESSION_SECRET").ok_or_else(|| "SESSION_SECRET must be set".to_string())?;
        if session_secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(format!(
                "SESSION_SECRET must be at least {} bytes",
                MIN_SESSION_SECRET_LEN
            ));
        }

        let api_base_url = lookup("API_BASE_URL")
            .unwrap_or_else(|| "http://localhost:8080/api".to_string())
            .trim_end_matches('/')
            .to_string();

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());

        let session_ttl = Duration::from_secs(parse_or("SESSION_TTL_SECS", &lookup, 28_800)?);

        let cookie_secure = match lookup("COOKIE_SECURE").as_deref() {
            None => false,
            Some("true") | Some("1") => true,
            Some("false") | Some("0") => false,
            Some(other) => return Err(format!("COOKIE_SECURE must be true or false, got {}", other)),
        };

        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());

        let backend_timeout = Duration::from_secs(parse_or("BACKEND_TIMEOUT_SECS", &lookup, 30)?);

        let max_image_bytes = parse_or("MAX_IMAGE_BYTES", &lookup, 5 * 1024 * 1024)?;

        let debug_key = lookup("DEBUG_KEY").filter(|k| !k.is_empty());

        Ok(Self {
            api_base_url,
            session_secret,
            bind_addr,
            session_ttl,
            cookie_secure,
            cors_origin,
            backend_timeout,
            max_image_bytes,
            debug_key,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &str,
    lookup: &impl Fn(&str) -> Option<String>,
    default: T,
) -> Result<T, String> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("{} has an invalid value: {}", key, raw)),
        None => Ok(default),
    }
}
