// Copyright (c) 2018 Chef Software Inc. and/or applicable contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{env,
          time::Duration};

use nyspma_core::config::ConfigFile;

use crate::error::{Error,
                   Result};

/// Production association database
pub const PRODUCTION_BASE_URL: &str = "https://associationdatabase.com";
/// Staging association database
pub const STAGING_BASE_URL: &str = "https://staging.associationdatabase.com";

pub const DEFAULT_AUTHORIZE_PATH: &str = "/oauth/authorize";
pub const DEFAULT_TOKEN_PATH: &str = "/oauth/access_token";
pub const DEFAULT_USER_QUERY_PATH: &str = "/api/user";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const ENV_BASE_URL: &str = "NYSPMA_BACKEND_BASE_URL";
pub const ENV_ENVIRONMENT: &str = "NYSPMA_BACKEND_ENVIRONMENT";
pub const ENV_AUTHORIZE_PATH: &str = "NYSPMA_BACKEND_AUTHORIZATION_PATH";
pub const ENV_TOKEN_PATH: &str = "NYSPMA_BACKEND_ACCESS_TOKEN_PATH";
pub const ENV_USER_QUERY_PATH: &str = "NYSPMA_BACKEND_USER_QUERY_PATH";
pub const ENV_CLIENT_ID: &str = "NYSPMA_BACKEND_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "NYSPMA_BACKEND_CLIENT_SECRET";

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    Staging,
}

impl Environment {
    pub fn base_url(self) -> &'static str {
        match self {
            Environment::Production => PRODUCTION_BASE_URL,
            Environment::Staging => STAGING_BASE_URL,
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "production" => Some(Environment::Production),
            "staging" => Some(Environment::Staging),
            _ => None,
        }
    }
}

/// Shape of the user-query endpoint.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProfileApi {
    /// The user query returns the profile object itself.
    Direct,
    /// The user query returns `meta.links.me.href`, which in turn returns
    /// the profile under `data.attributes`.
    Discovery,
}

/// Profile key copied into the extra data handed to the login pipeline.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ExtraDataField {
    pub source: String,
    pub dest:   String,
}

impl ExtraDataField {
    fn same(key: &str) -> Self {
        ExtraDataField { source: key.to_string(),
                         dest:   key.to_string(), }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct OAuth2Cfg {
    pub provider:        String,
    pub environment:     Environment,
    /// Overrides the base url implied by `environment`
    pub base_url:        Option<String>,
    pub authorize_path:  String,
    pub token_path:      String,
    pub user_query_path: String,
    pub redirect_url:    String,
    pub client_id:       String,
    pub client_secret:   String,
    pub scope:           Vec<String>,
    pub scope_separator: String,
    pub profile_api:     ProfileApi,
    pub extra_data:      Vec<ExtraDataField>,
    pub timeout_secs:    u64,
}

impl Default for OAuth2Cfg {
    fn default() -> Self {
        OAuth2Cfg { provider:        "nyspma".to_string(),
                    environment:     Environment::Production,
                    base_url:        None,
                    authorize_path:  DEFAULT_AUTHORIZE_PATH.to_string(),
                    token_path:      DEFAULT_TOKEN_PATH.to_string(),
                    user_query_path: DEFAULT_USER_QUERY_PATH.to_string(),
                    redirect_url:    "http://localhost/auth/complete/nyspma/".to_string(),
                    client_id:       String::new(),
                    client_secret:   String::new(),
                    scope:           vec!["public".to_string(), "write".to_string()],
                    scope_separator: " ".to_string(),
                    profile_api:     ProfileApi::Direct,
                    extra_data:      vec![ExtraDataField::same("id"),
                                          ExtraDataField::same("org_id"),
                                          ExtraDataField::same("date_joined"),],
                    timeout_secs:    DEFAULT_TIMEOUT_SECS, }
    }
}

impl ConfigFile for OAuth2Cfg {
    type Error = Error;
}

impl OAuth2Cfg {
    /// Apply `NYSPMA_BACKEND_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// An environment name other than production or staging is an error.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
        where F: Fn(&str) -> Option<String>
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(value) = get(ENV_ENVIRONMENT) {
            self.environment =
                Environment::parse(&value).ok_or_else(|| Error::InvalidEnvironment(value.clone()))?;
        }
        if let Some(value) = get(ENV_BASE_URL) {
            self.base_url = Some(value);
        }
        if let Some(value) = get(ENV_AUTHORIZE_PATH) {
            self.authorize_path = value;
        }
        if let Some(value) = get(ENV_TOKEN_PATH) {
            self.token_path = value;
        }
        if let Some(value) = get(ENV_USER_QUERY_PATH) {
            self.user_query_path = value;
        }
        if let Some(value) = get(ENV_CLIENT_ID) {
            self.client_id = value;
        }
        if let Some(value) = get(ENV_CLIENT_SECRET) {
            self.client_secret = value;
        }
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        match self.base_url {
            Some(ref url) if !url.trim().is_empty() => url.trim_end_matches('/'),
            _ => self.environment.base_url(),
        }
    }

    pub fn authorization_url(&self) -> String { self.resolve(&self.authorize_path) }

    pub fn access_token_url(&self) -> String { self.resolve(&self.token_path) }

    pub fn user_query_url(&self) -> String { self.resolve(&self.user_query_path) }

    pub fn key_and_secret(&self) -> (&str, &str) { (&self.client_id, &self.client_secret) }

    pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }

    /// Absolute urls pass through; anything else is taken relative to the
    /// base url.
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url(), path)
        } else {
            format!("{}/{}", self.base_url(), path)
        }
    }
}
