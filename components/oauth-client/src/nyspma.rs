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

use std::iter::FromIterator;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::Value;
use url::form_urlencoded;

use nyspma_core::{http_client::{HttpClient,
                                ACCEPT_APPLICATION_JSON},
                  metrics::CounterMetric};

use crate::{config::{OAuth2Cfg,
                     ProfileApi},
            error::{Error,
                    Result},
            metrics::Counter,
            normalize,
            types::*};

pub struct Nyspma {
    config: OAuth2Cfg,
}

impl Nyspma {
    pub fn new(config: OAuth2Cfg) -> Self { Nyspma { config } }

    pub fn config(&self) -> &OAuth2Cfg { &self.config }

    async fn get_json(&self, client: &HttpClient, url: &str, token: &str) -> Result<Value> {
        let header_values = vec![ACCEPT_APPLICATION_JSON.clone(),];
        let headers = HeaderMap::from_iter(header_values.into_iter());

        debug!("NYSPMA GET {}", url);
        let resp = client.get(url)
                         .headers(headers)
                         .query(&[("access_token", token)])
                         .send()
                         .await
                         .map_err(Error::HttpClient)?;

        let status = resp.status();
        let body = resp.text().await.map_err(Error::HttpClient)?;

        if !status.is_success() {
            debug!("NYSPMA response status: {}", status);
            return Err(Error::HttpResponse(status, body));
        }

        match serde_json::from_str::<Value>(&body) {
            Ok(value @ Value::Object(_)) => {
                debug!("NYSPMA response status: {}, {}", status, response_summary(&value));
                Ok(value)
            }
            Ok(_) => Err(Error::MalformedResponse("found a JSON value that is not an \
                                                   object"
                                                          .to_string())),
            Err(e) => Err(Error::MalformedResponse(e.to_string())),
        }
    }

    async fn direct_profile(&self, client: &HttpClient, token: &str) -> Result<RawProfile> {
        match self.get_json(client, &self.config.user_query_url(), token)
                  .await?
        {
            Value::Object(map) => Ok(normalize::unwrap_envelope(map)),
            _ => Err(Error::MalformedResponse("expected a JSON object".to_string())),
        }
    }

    async fn discovered_profile(&self, client: &HttpClient, token: &str) -> Result<RawProfile> {
        let index = self.get_json(client, &self.config.user_query_url(), token)
                        .await?;
        let href = index.pointer("/meta/links/me/href")
                        .and_then(Value::as_str)
                        .filter(|href| !href.trim().is_empty())
                        .ok_or(Error::MissingProfileLink)?;
        let profile_url = self.config.resolve(href.trim());
        debug!("NYSPMA profile url: {}", profile_url);

        let document = self.get_json(client, &profile_url, token).await?;
        let attributes = document.pointer("/data/attributes")
                                 .and_then(Value::as_object)
                                 .ok_or(Error::MissingProfileData)?;
        Ok(normalize::profile_from_attributes(attributes))
    }
}

// Profile payloads can carry tokens, so only key names are logged.
fn response_summary(value: &Value) -> String {
    match value.as_object() {
        Some(map) => {
            let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
            keys.sort_unstable();
            format!("keys: [{}]", keys.join(", "))
        }
        None => "not an object".to_string(),
    }
}

#[async_trait]
impl ProfileFetcher for Nyspma {
    async fn fetch_profile(&self, client: &HttpClient, access_token: &str) -> Option<RawProfile> {
        let result = match self.config.profile_api {
            ProfileApi::Direct => self.direct_profile(client, access_token).await,
            ProfileApi::Discovery => self.discovered_profile(client, access_token).await,
        };

        match result {
            Ok(profile) => {
                Counter::Profile.increment();
                Some(profile)
            }
            Err(e) => {
                warn!("NYSPMA profile lookup failed, {}", e);
                Counter::ProfileNotFound.increment();
                None
            }
        }
    }
}

impl DetailsNormalizer for Nyspma {
    fn normalize_details(&self, raw: &RawProfile) -> UserDetails {
        normalize::normalize_details(raw)
    }

    fn extra_data(&self, raw: &RawProfile) -> ExtraData {
        normalize::extra_data(raw, &self.config.extra_data)
    }
}

#[async_trait]
impl OAuth2Provider for Nyspma {
    fn name(&self) -> &str { &self.config.provider }

    fn authorize_url(&self, state: Option<&str>) -> String {
        let scope = self.config.scope.join(&self.config.scope_separator);
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("client_id", &self.config.client_id)
             .append_pair("redirect_uri", &self.config.redirect_url)
             .append_pair("response_type", "code");
        if !scope.is_empty() {
            query.append_pair("scope", &scope);
        }
        if let Some(state) = state {
            query.append_pair("state", state);
        }
        format!("{}?{}", self.config.authorization_url(), query.finish())
    }

    async fn exchange_code(&self, client: &HttpClient, code: &str) -> Result<AccessToken> {
        let url = self.config.access_token_url();
        let (client_id, client_secret) = self.config.key_and_secret();
        let params = [("grant_type", "authorization_code"),
                      ("code", code),
                      ("redirect_uri", self.config.redirect_url.as_str()),
                      ("client_id", client_id),
                      ("client_secret", client_secret)];

        let header_values = vec![ACCEPT_APPLICATION_JSON.clone(),];
        let headers = HeaderMap::from_iter(header_values.into_iter());

        Counter::AccessToken.increment();
        let resp = client.post(&url)
                         .headers(headers)
                         .form(&params)
                         .send()
                         .await
                         .map_err(Error::HttpClient)?;

        let status = resp.status();
        let body = resp.text().await.map_err(Error::HttpClient)?;
        debug!("NYSPMA token response status: {}", status);

        if status.is_success() {
            serde_json::from_str::<AccessToken>(&body).map_err(Error::Serialization)
        } else {
            Err(Error::HttpResponse(status, body))
        }
    }
}
