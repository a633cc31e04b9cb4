use crate::store::CreditAccount;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Body {
    balance: f64,
    total_used: f64,
}

/// client for the external credits provider. one GET, mapped onto
/// the singleton account row with the configured spending limit.
pub struct CreditsProvider {
    url: String,
    http: reqwest::Client,
}

impl CreditsProvider {
    pub fn new(url: String) -> Self {
        Self {
            url,
            http: reqwest::Client::new(),
        }
    }

    pub async fn fetch(&self) -> Result<CreditAccount> {
        let body = self
            .http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json::<Body>()
            .await?;
        Ok(CreditAccount {
            balance: body.balance,
            used: body.total_used,
            limit: crate::CREDIT_LIMIT,
            last_synced_at: crate::now_ms(),
        })
    }
}
