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

use std::{error,
          fmt};

#[derive(Debug)]
pub enum Error {
    Core(nyspma_core::Error),
    HttpClient(reqwest::Error),
    HttpResponse(reqwest::StatusCode, String),
    InvalidEnvironment(String),
    MalformedResponse(String),
    MissingProfileData,
    MissingProfileLink,
    ProfileNotFound,
    Serialization(serde_json::Error),
}

pub type Result<T> = ::std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match *self {
            Error::Core(ref e) => format!("{}", e),
            Error::HttpClient(ref e) => format!("{}", e),
            Error::HttpResponse(ref code, ref response) => {
                format!("Received a non-200 response, status={}, response={}",
                        code, response)
            }
            Error::InvalidEnvironment(ref e) => {
                format!("Invalid environment `{}`, valid choices are `production` and \
                         `staging`",
                        e)
            }
            Error::MalformedResponse(ref e) => format!("Response body is not a JSON object, {}", e),
            Error::MissingProfileData => "Profile response has no data.attributes".to_string(),
            Error::MissingProfileLink => "Response has no meta.links.me.href".to_string(),
            Error::ProfileNotFound => "No profile found for access token".to_string(),
            Error::Serialization(ref e) => format!("{}", e),
        };
        write!(f, "{}", msg)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Core(ref e) => Some(e),
            Error::HttpClient(ref e) => Some(e),
            Error::Serialization(ref e) => Some(e),
            _ => None,
        }
    }
}

impl From<nyspma_core::Error> for Error {
    fn from(err: nyspma_core::Error) -> Error { Error::Core(err) }
}
