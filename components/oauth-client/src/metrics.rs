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

//! Centralized definition of all OAuth client metrics that we
//! wish to track.

use std::borrow::Cow;

use nyspma_core::metrics;

pub enum Counter {
    Authenticate,
    AccessToken,
    Profile,
    ProfileNotFound,
}

impl metrics::CounterMetric for Counter {}

impl metrics::Metric for Counter {
    fn id(&self) -> Cow<'static, str> {
        match *self {
            Counter::Authenticate => "oauth.authenticate".into(),
            Counter::AccessToken => "oauth.access-token".into(),
            Counter::Profile => "oauth.profile".into(),
            Counter::ProfileNotFound => "oauth.profile-not-found".into(),
        }
    }
}
