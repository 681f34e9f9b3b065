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

use reqwest::header::HeaderMap;

use nyspma_core::{http_client::{HttpClient,
                                USER_AGENT_NYSPMA},
                  metrics::CounterMetric};

use crate::{config::OAuth2Cfg,
            error::{Error,
                    Result},
            metrics::Counter,
            nyspma::Nyspma,
            types::*};

pub struct Client {
    inner:      HttpClient,
    provider:   Box<dyn OAuth2Provider>,
    pub config: OAuth2Cfg,
}

impl Client {
    pub fn new(config: OAuth2Cfg) -> Result<Self> {
        let provider = Box::new(Nyspma::new(config.clone()));
        Self::with_provider(config, provider)
    }

    pub fn with_provider(config: OAuth2Cfg, provider: Box<dyn OAuth2Provider>) -> Result<Self> {
        let header_values = vec![USER_AGENT_NYSPMA.clone()];
        let headers = HeaderMap::from_iter(header_values.into_iter());
        let inner = HttpClient::new(config.base_url(), headers, config.timeout())?;

        Ok(Client { inner,
                    provider,
                    config })
    }

    pub fn authorize_url(&self, state: Option<&str>) -> String {
        self.provider.authorize_url(state)
    }

    /// Exchange an authorization code and load the user it belongs to.
    pub async fn authenticate(&self, code: &str) -> Result<(AccessToken, OAuth2User)> {
        Counter::Authenticate.increment();
        let token = self.provider.exchange_code(&self.inner, code).await?;
        let user = self.user(&token.access_token).await?;
        Ok((token, user))
    }

    pub async fn user(&self, access_token: &str) -> Result<OAuth2User> {
        let raw = self.provider
                      .fetch_profile(&self.inner, access_token)
                      .await
                      .ok_or(Error::ProfileNotFound)?;
        let details = self.provider.normalize_details(&raw);
        let id = self.provider.user_id(&details).to_string();
        if id.is_empty() {
            warn!("NYSPMA profile has neither email_address nor id");
            return Err(Error::ProfileNotFound);
        }
        let extra_data = self.provider.extra_data(&raw);

        Ok(OAuth2User { id,
                        details,
                        extra_data })
    }

    pub fn provider(&self) -> String { self.provider.name().to_string() }
}
