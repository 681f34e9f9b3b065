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

//! Loading of TOML configuration files.

use std::{error,
          fs,
          path::Path,
          result};

use serde::de::DeserializeOwned;

use crate::error::Error;

pub trait ConfigFile: DeserializeOwned + Sized {
    type Error: error::Error + From<Error>;

    fn from_file<T: AsRef<Path>>(filepath: T) -> result::Result<Self, Self::Error> {
        let raw = fs::read_to_string(filepath.as_ref()).map_err(|e| {
                      Error::ConfigFile(format!("{}: {}", filepath.as_ref().display(), e))
                  })?;
        Self::from_raw(&raw)
    }

    fn from_raw(raw: &str) -> result::Result<Self, Self::Error> {
        let value: Self = toml::from_str(raw).map_err(|e| Error::ConfigFile(e.to_string()))?;
        Ok(value)
    }
}
