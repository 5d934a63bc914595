use anyhow::{Context, Result};

/// First administrator, created at startup when no account uses the email.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Without a database URL the service runs on the in-memory store.
    pub database_url: Option<String>,
    pub token_secret: String,
    pub token_ttl_hours: i64,
    pub reminder_hour_utc: u32,
    pub email_queue_capacity: usize,
    pub cors_allow_any_origin: bool,
    pub admin: Option<AdminSeed>,
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn admin_seed() -> Result<Option<AdminSeed>> {
    match (non_empty("ADMIN_EMAIL"), non_empty("ADMIN_PASSWORD")) {
        (Some(email), Some(password)) => {
            anyhow::ensure!(
                password.len() >= 6,
                "ADMIN_PASSWORD must be at least 6 characters long"
            );
            Ok(Some(AdminSeed {
                name: non_empty("ADMIN_NAME").unwrap_or_else(|| "Administrador".to_string()),
                email,
                password,
            }))
        }
        (None, None) => Ok(None),
        _ => anyhow::bail!("ADMIN_EMAIL and ADMIN_PASSWORD must be set together"),
    }
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value: {raw}")),
        _ => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let reminder_hour_utc = parse_or("REMINDER_HOUR_UTC", 9u32)?;
        anyhow::ensure!(
            reminder_hour_utc < 24,
            "REMINDER_HOUR_UTC must be between 0 and 23"
        );

        let token_secret =
            std::env::var("TOKEN_SECRET").context("Cannot load TOKEN_SECRET env variable")?;
        anyhow::ensure!(
            token_secret.len() >= 16,
            "TOKEN_SECRET must be at least 16 bytes long"
        );

        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("Cannot load PORT env variable")?
                .parse()
                .context("PORT must be a number")?,
            database_url: non_empty("DATABASE_URL"),
            token_secret,
            token_ttl_hours: parse_or("TOKEN_TTL_HOURS", 24i64)?,
            reminder_hour_utc,
            email_queue_capacity: parse_or("EMAIL_QUEUE_CAPACITY", 256usize)?,
            cors_allow_any_origin: parse_or("CORS_ALLOW_ANY_ORIGIN", false)?,
            admin: admin_seed()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_optional_values_fall_back_to_defaults() {
        assert_eq!(parse_or("VOLUNTEER_API_TEST_UNSET_VAR", 9u32).unwrap(), 9);
        assert!(!parse_or("VOLUNTEER_API_TEST_UNSET_FLAG", false).unwrap());
    }

    #[test]
    fn blank_variables_count_as_unset() {
        assert_eq!(non_empty("VOLUNTEER_API_TEST_UNSET_VAR"), None);
    }
}
