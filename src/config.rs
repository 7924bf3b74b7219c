use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    pub stockdata_api_key: String,
    pub stockdata_base_url: String,
    pub stocknews_api_key: String,
    pub stocknews_base_url: String,

    pub alert_check_interval_secs: u64,
    pub alert_one_shot: bool,
    pub http_timeout_secs: u64,

    pub static_dir: String,
}

impl Settings {
    pub fn alert_check_interval(&self) -> Duration {
        Duration::from_secs(self.alert_check_interval_secs.max(1))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            stockdata_api_key: String::new(),
            stockdata_base_url: "https://www.stockdata.org/api/v1".to_string(),
            stocknews_api_key: String::new(),
            stocknews_base_url: "https://stocknewsapi.com/api/v1".to_string(),
            alert_check_interval_secs: 60,
            alert_one_shot: false,
            http_timeout_secs: 10,
            static_dir: "static".to_string(),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let defaults = Settings::default();

    let host = env::var("HOST").unwrap_or(defaults.host);

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(defaults.port);

    let stockdata_api_key = env::var("STOCKDATA_API_KEY").unwrap_or_default();
    let stockdata_base_url =
        env::var("STOCKDATA_BASE_URL").unwrap_or(defaults.stockdata_base_url);
    let stocknews_api_key = env::var("STOCKNEWS_API_KEY").unwrap_or_default();
    let stocknews_base_url =
        env::var("STOCKNEWS_BASE_URL").unwrap_or(defaults.stocknews_base_url);

    let alert_check_interval_secs = env::var("ALERT_CHECK_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(defaults.alert_check_interval_secs)
        .max(1);

    let alert_one_shot = env::var("ALERT_ONE_SHOT")
        .ok()
        .and_then(|s| parse_bool(&s))
        .unwrap_or(defaults.alert_one_shot);

    let http_timeout_secs = env::var("HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(defaults.http_timeout_secs);

    let static_dir = env::var("STATIC_DIR").unwrap_or(defaults.static_dir);

    Settings {
        host,
        port,
        stockdata_api_key,
        stockdata_base_url,
        stocknews_api_key,
        stocknews_base_url,
        alert_check_interval_secs,
        alert_one_shot,
        http_timeout_secs,
        static_dir,
    }
}
