use serde_json::Value;

use super::{Feed, Table};

/// Connection settings for the hosted Supabase instance. Built explicitly
/// by the caller; the reconciler never reads ambient process state.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub key: String,
}

impl SupabaseConfig {
    pub fn from_env() -> Result<Self, String> {
        let url = std::env::var("SUPABASE_URL")
            .ok()
            .filter(|v| !v.is_empty());
        let key = std::env::var("SUPABASE_ANON_KEY")
            .ok()
            .filter(|v| !v.is_empty());

        match (url, key) {
            (Some(url), Some(key)) => Ok(SupabaseConfig { url, key }),
            _ => Err("SUPABASE_URL and SUPABASE_ANON_KEY must be configured".to_string()),
        }
    }
}

/// `Feed` over the Supabase REST endpoint: one authenticated GET per table.
pub struct SupabaseFeed {
    config: SupabaseConfig,
    client: reqwest::blocking::Client,
}

impl SupabaseFeed {
    pub fn new(config: SupabaseConfig) -> Result<Self, String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| format!("HTTP client error: {}", e))?;
        Ok(SupabaseFeed { config, client })
    }
}

impl Feed for SupabaseFeed {
    fn fetch(&self, table: Table) -> Result<Vec<Value>, String> {
        let url = format!(
            "{}/rest/v1/{}",
            self.config.url.trim_end_matches('/'),
            table
        );

        let resp = self
            .client
            .get(&url)
            .header("apikey", &self.config.key)
            .header("Authorization", format!("Bearer {}", self.config.key))
            .send()
            .map_err(|e| format!("Supabase request failed: {}", e))?;

        if !resp.status().is_success() {
            let code = resp.status().as_u16();
            let msg = match code {
                401 | 403 => "Authentication failed. Check the Supabase anon key.".to_string(),
                404 => format!("Table endpoint not found: {}", table),
                429 => "Rate limited by Supabase. Please wait and try again.".to_string(),
                _ => format!("Supabase API error ({}). Please try again later.", code),
            };
            return Err(msg);
        }

        let json: Value = resp
            .json()
            .map_err(|e| format!("Failed to parse Supabase response: {}", e))?;

        json.as_array()
            .cloned()
            .ok_or_else(|| format!("Expected a JSON array of {} records", table))
    }
}
