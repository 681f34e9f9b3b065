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

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{Map,
                 Value};

use nyspma_core::http_client::HttpClient;

use crate::error::Result;

/// Profile payload exactly as the identity provider returned it.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(transparent)]
pub struct RawProfile(Map<String, Value>);

impl RawProfile {
    pub fn get(&self, key: &str) -> Option<&Value> { self.0.get(key) }

    pub fn insert(&mut self, key: &str, value: Value) { self.0.insert(key.to_string(), value); }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// String value of `key`, or the empty string when it is absent or not
    /// a string.
    pub fn str_or_default(&self, key: &str) -> &str {
        self.get(key).and_then(Value::as_str).unwrap_or_default()
    }

    /// String or number value of `key` rendered as a string. Empty strings,
    /// nulls and structured values count as absent.
    pub fn scalar(&self, key: &str) -> Option<String> {
        match self.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for RawProfile {
    fn from(map: Map<String, Value>) -> Self { RawProfile(map) }
}

/// Normalized user record consumed by the account provisioning pipeline.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct UserDetails {
    pub username:   String,
    pub email:      String,
    pub fullname:   String,
    pub first_name: String,
    pub last_name:  String,
}

/// Profile values the login pipeline stores alongside the social account.
pub type ExtraData = BTreeMap<String, String>;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct AccessToken {
    pub access_token:  String,
    pub token_type:    Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in:    Option<u64>,
}

pub struct OAuth2User {
    pub id:         String,
    pub details:    UserDetails,
    pub extra_data: ExtraData,
}

#[async_trait]
pub trait ProfileFetcher: Sync + Send {
    /// Fetch the raw profile for `access_token`. Every failure mode collapses
    /// to `None` so the caller can fail the login instead of the request.
    async fn fetch_profile(&self, client: &HttpClient, access_token: &str) -> Option<RawProfile>;
}

pub trait DetailsNormalizer: Sync + Send {
    fn normalize_details(&self, raw: &RawProfile) -> UserDetails;

    fn extra_data(&self, raw: &RawProfile) -> ExtraData;

    /// Stable identifier of the user on the identity provider.
    fn user_id<'a>(&self, details: &'a UserDetails) -> &'a str { &details.username }
}

#[async_trait]
pub trait OAuth2Provider: ProfileFetcher + DetailsNormalizer {
    fn name(&self) -> &str;

    fn authorize_url(&self, state: Option<&str>) -> String;

    async fn exchange_code(&self, client: &HttpClient, code: &str) -> Result<AccessToken>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile(value: Value) -> RawProfile { serde_json::from_value(value).unwrap() }

    #[test]
    fn str_or_default_ignores_non_strings() {
        let raw = profile(json!({"first_name": "Jane", "last_name": 7, "org_id": null}));
        assert_eq!(raw.str_or_default("first_name"), "Jane");
        assert_eq!(raw.str_or_default("last_name"), "");
        assert_eq!(raw.str_or_default("org_id"), "");
        assert_eq!(raw.str_or_default("missing"), "");
    }

    #[test]
    fn scalar_renders_numbers_and_strings() {
        let raw = profile(json!({"id": 1174494, "org_id": "NYSPMA", "key_contact": false,
                                 "date_joined": "", "info": {"id": 1}}));
        assert_eq!(raw.scalar("id"), Some("1174494".to_string()));
        assert_eq!(raw.scalar("org_id"), Some("NYSPMA".to_string()));
        assert_eq!(raw.scalar("key_contact"), Some("false".to_string()));
        assert_eq!(raw.scalar("date_joined"), None);
        assert_eq!(raw.scalar("info"), None);
        assert_eq!(raw.scalar("missing"), None);
    }

    #[test]
    fn user_details_serializes_all_keys() {
        let value = serde_json::to_value(UserDetails::default()).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 5);
        for key in &["username", "email", "fullname", "first_name", "last_name"] {
            assert_eq!(value[*key], json!(""));
        }
    }

    #[test]
    fn access_token_optional_fields() {
        let token: AccessToken = serde_json::from_str(r#"{"access_token":"abc"}"#).unwrap();
        assert_eq!(token.access_token, "abc");
        assert_eq!(token.refresh_token, None);
        assert_eq!(token.expires_in, None);
    }
}
