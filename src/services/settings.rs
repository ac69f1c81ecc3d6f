use anyhow::Result;
use chrono_tz::Tz;

use super::database::Database;
use super::timezone;

// Keys match the cookies the web client kept.
const TIMEZONE_KEY: &str = "timezone";
const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScheme {
    System,
    Light,
    Dark,
}

impl ColorScheme {
    fn as_str(self) -> &'static str {
        match self {
            ColorScheme::System => "system",
            ColorScheme::Light => "light",
            ColorScheme::Dark => "dark",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "system" => Some(ColorScheme::System),
            "light" => Some(ColorScheme::Light),
            "dark" => Some(ColorScheme::Dark),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub timezone: Tz,
    pub color_scheme: ColorScheme,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            timezone: timezone::detect_timezone(),
            color_scheme: ColorScheme::System,
        }
    }
}

pub struct SettingsService;

impl SettingsService {
    /// Load persisted preferences. A stored zone that no longer parses is
    /// silently replaced by the detected one; an unknown theme value falls
    /// back to following the system.
    pub async fn load(db: &Database) -> AppSettings {
        let timezone = match db.get_setting(TIMEZONE_KEY).await {
            Ok(Some(name)) => {
                timezone::parse_timezone(&name).unwrap_or_else(timezone::detect_timezone)
            }
            _ => timezone::detect_timezone(),
        };

        let color_scheme = match db.get_setting(THEME_KEY).await {
            Ok(Some(value)) => ColorScheme::parse(&value).unwrap_or(ColorScheme::System),
            _ => ColorScheme::System,
        };

        AppSettings {
            timezone,
            color_scheme,
        }
    }

    pub async fn save_timezone(db: &Database, tz: Tz) -> Result<()> {
        db.set_setting(TIMEZONE_KEY, tz.name()).await
    }

    pub async fn save_color_scheme(db: &Database, scheme: ColorScheme) -> Result<()> {
        db.set_setting(THEME_KEY, scheme.as_str()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_timezone_round_trip() {
        let db = Database::new_in_memory().unwrap();
        let tz: Tz = "Asia/Tokyo".parse().unwrap();

        SettingsService::save_timezone(&db, tz).await.unwrap();
        let settings = SettingsService::load(&db).await;
        assert_eq!(settings.timezone, tz);
    }

    #[tokio::test]
    async fn test_invalid_stored_timezone_is_replaced() {
        let db = Database::new_in_memory().unwrap();
        db.set_setting("timezone", "Not/A_Zone").await.unwrap();

        let settings = SettingsService::load(&db).await;
        assert_eq!(settings.timezone, timezone::detect_timezone());
    }

    #[tokio::test]
    async fn test_color_scheme_round_trip() {
        let db = Database::new_in_memory().unwrap();

        SettingsService::save_color_scheme(&db, ColorScheme::Dark)
            .await
            .unwrap();
        let settings = SettingsService::load(&db).await;
        assert_eq!(settings.color_scheme, ColorScheme::Dark);

        db.set_setting("theme", "sepia").await.unwrap();
        let settings = SettingsService::load(&db).await;
        assert_eq!(settings.color_scheme, ColorScheme::System);
    }
}
