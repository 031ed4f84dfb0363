use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    /// Fraction applied to the cart subtotal to compute the tax-inclusive total.
    pub tax_rate: Decimal,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "bazaar".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "bazaar-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        let tax_rate = match std::env::var("TAX_RATE") {
            Ok(v) => {
                Decimal::from_str(&v).map_err(|e| anyhow::anyhow!("invalid TAX_RATE {v:?}: {e}"))?
            }
            Err(_) => default_tax_rate(),
        };
        Ok(Self {
            database_url,
            jwt,
            tax_rate,
        })
    }
}

/// 8%, matching the platform-wide default.
pub fn default_tax_rate() -> Decimal {
    Decimal::new(8, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tax_rate_is_eight_percent() {
        assert_eq!(default_tax_rate(), Decimal::from_str("0.08").unwrap());
    }
}
