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

use std::{ops::Deref,
          time::Duration};

use reqwest::{header::{HeaderMap,
                       HeaderName,
                       HeaderValue,
                       ACCEPT,
                       USER_AGENT},
              Client,
              Proxy};

use url::Url;

use crate::error::Result;

const NYSPMA_USER_AGENT: &str = "NYSPMA-OAuth-Client";
const APPLICATION_JSON: &str = "application/json";

lazy_static! {
    pub static ref USER_AGENT_NYSPMA: (HeaderName, HeaderValue) = (USER_AGENT, HeaderValue::from_static(NYSPMA_USER_AGENT));
    pub static ref ACCEPT_APPLICATION_JSON: (HeaderName, HeaderValue) = (ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
}

/// Async HTTP client shared by every request made against one identity
/// provider. Proxy settings are resolved once, for the url given to `new`;
/// requests to other hosts (a discovery link on another domain, say) reuse
/// that proxy choice instead of consulting `NO_PROXY` for their own host.
#[derive(Clone, Debug)]
pub struct HttpClient(Client);

impl HttpClient {
    pub fn new(url: &str, headers: HeaderMap, timeout: Duration) -> Result<Self> {
        let mut client = Client::builder();

        trace!("HttpClient: checking proxy for url: {:?}", url);
        let url = Url::parse(url)?;

        if let Some(proxy_url) = env_proxy::for_url(&url).to_string() {
            if url.scheme() == "http" {
                trace!("Setting http_proxy to {}", proxy_url);
                match Proxy::http(&proxy_url) {
                    Ok(p) => {
                        client = client.proxy(p);
                    }
                    Err(e) => warn!("Invalid proxy, err: {:?}", e),
                }
            }

            if url.scheme() == "https" {
                trace!("Setting https proxy to {}", proxy_url);
                match Proxy::https(&proxy_url) {
                    Ok(p) => {
                        client = client.proxy(p);
                    }
                    Err(e) => warn!("Invalid proxy, err: {:?}", e),
                }
            }
        } else {
            trace!("No proxy configured for url: {:?}", url);
        }

        let client = client.default_headers(headers).timeout(timeout).build()?;
        Ok(HttpClient(client))
    }
}

impl Deref for HttpClient {
    type Target = Client;

    fn deref(&self) -> &Self::Target { &self.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::iter::FromIterator;

    #[test]
    fn builds_for_a_valid_url() {
        let headers = HeaderMap::from_iter(vec![USER_AGENT_NYSPMA.clone(),
                                                ACCEPT_APPLICATION_JSON.clone()]);
        let client = HttpClient::new("https://associationdatabase.com",
                                     headers,
                                     Duration::from_secs(5));
        assert!(client.is_ok());
    }

    #[test]
    fn rejects_an_unparsable_url() {
        match HttpClient::new("not a url", HeaderMap::new(), Duration::from_secs(5)) {
            Err(Error::InvalidUrl(_)) => (),
            other => panic!("expected InvalidUrl, got {:?}", other.map(|_| ())),
        }
    }
}
