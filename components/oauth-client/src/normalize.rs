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

//! Mapping of provider profile payloads onto `UserDetails`.
//!
//! Every field is read through `RawProfile::str_or_default` or
//! `RawProfile::scalar`, so a missing or oddly typed key degrades to the
//! empty string instead of failing the login.

use serde_json::{Map,
                 Value};

use crate::{config::ExtraDataField,
            types::{ExtraData,
                    RawProfile,
                    UserDetails}};

pub const EMAIL_KEY: &str = "email_address";
pub const FIRST_NAME_KEY: &str = "first_name";
pub const LAST_NAME_KEY: &str = "last_name";
pub const ID_KEY: &str = "id";

// Drupal JSON:API attribute names and the profile keys they stand in for.
const ATTRIBUTE_ALIASES: &[(&str, &str)] = &[("mail", EMAIL_KEY),
                                             ("field_first_name", FIRST_NAME_KEY),
                                             ("field_last_name", LAST_NAME_KEY),
                                             ("drupal_internal__uid", ID_KEY)];

/// `username` is `email_address`, or `id` when the email is absent or empty,
/// or the empty string when both are missing. An empty `email_address` does
/// not win over `id`.
pub fn normalize_details(raw: &RawProfile) -> UserDetails {
    let first_name = raw.str_or_default(FIRST_NAME_KEY).trim().to_string();
    let last_name = raw.str_or_default(LAST_NAME_KEY).trim().to_string();
    let fullname = format!("{} {}", first_name, last_name).trim().to_string();
    let email = raw.str_or_default(EMAIL_KEY).trim().to_string();

    let username = if email.is_empty() {
        raw.scalar(ID_KEY).unwrap_or_default()
    } else {
        email.clone()
    };

    UserDetails { username,
                  email,
                  fullname,
                  first_name,
                  last_name }
}

pub fn extra_data(raw: &RawProfile, fields: &[ExtraDataField]) -> ExtraData {
    fields.iter()
          .filter_map(|field| raw.scalar(&field.source).map(|v| (field.dest.clone(), v)))
          .collect()
}

/// Profiles wrapped in an omniauth style envelope keep the user under `info`.
pub fn unwrap_envelope(map: Map<String, Value>) -> RawProfile {
    match map.get("info") {
        Some(Value::Object(info)) => RawProfile::from(info.clone()),
        _ => RawProfile::from(map),
    }
}

/// Build a profile from JSON:API `data.attributes`, adding the canonical
/// keys next to the Drupal field names.
pub fn profile_from_attributes(attributes: &Map<String, Value>) -> RawProfile {
    let mut profile = RawProfile::from(attributes.clone());
    for (from, to) in ATTRIBUTE_ALIASES {
        if let Some(value) = attributes.get(*from) {
            profile.insert(to, value.clone());
        }
    }
    profile
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile(value: Value) -> RawProfile { serde_json::from_value(value).unwrap() }

    #[test]
    fn complete_profile() {
        let raw = profile(json!({
            "first_name": "Jane",
            "last_name": "Doe",
            "email_address": "jane@x.org",
            "id": 42
        }));
        assert_eq!(normalize_details(&raw),
                   UserDetails { username:   "jane@x.org".to_string(),
                                 email:      "jane@x.org".to_string(),
                                 fullname:   "Jane Doe".to_string(),
                                 first_name: "Jane".to_string(),
                                 last_name:  "Doe".to_string(), });
    }

    #[test]
    fn empty_profile_is_all_empty_strings() {
        assert_eq!(normalize_details(&RawProfile::default()), UserDetails::default());
    }

    #[test]
    fn username_falls_back_to_id() {
        let raw = profile(json!({"id": 1174494, "first_name": "System"}));
        let details = normalize_details(&raw);
        assert_eq!(details.username, "1174494");
        assert_eq!(details.email, "");
        assert_eq!(details.fullname, "System");

        let raw = profile(json!({"id": "u-9", "email_address": ""}));
        assert_eq!(normalize_details(&raw).username, "u-9");
    }

    #[test]
    fn every_subset_of_missing_fields() {
        let full = json!({
            "first_name": "Jane",
            "last_name": "Doe",
            "email_address": "jane@x.org",
            "id": 42
        });
        let keys = ["first_name", "last_name", "email_address", "id"];
        for mask in 0..16u8 {
            let mut map = full.as_object().unwrap().clone();
            for (bit, key) in keys.iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    map.remove(*key);
                }
            }
            let details = normalize_details(&RawProfile::from(map.clone()));
            let value = serde_json::to_value(&details).unwrap();
            assert_eq!(value.as_object().unwrap().len(), 5, "mask {}", mask);

            let expected_username = if map.contains_key("email_address") {
                "jane@x.org"
            } else if map.contains_key("id") {
                "42"
            } else {
                ""
            };
            assert_eq!(details.username, expected_username, "mask {}", mask);
            assert_eq!(details.fullname,
                       format!("{} {}", details.first_name, details.last_name).trim(),
                       "mask {}",
                       mask);
        }
    }

    #[test]
    fn odd_types_degrade_to_empty() {
        let raw = profile(json!({
            "first_name": ["Jane"],
            "last_name": null,
            "email_address": 12,
            "id": {"value": 1}
        }));
        assert_eq!(normalize_details(&raw), UserDetails::default());
    }

    #[test]
    fn normalize_is_idempotent() {
        let raw = profile(json!({"first_name": " Jane ", "email_address": "jane@x.org"}));
        let first = normalize_details(&raw);
        assert_eq!(first, normalize_details(&raw));
        assert_eq!(first.first_name, "Jane");
        assert_eq!(first.fullname, "Jane");
    }

    #[test]
    fn extra_data_copies_configured_keys() {
        let raw = profile(json!({"id": 1174494, "org_id": "NYSPMA", "date_joined": ""}));
        let fields = vec![ExtraDataField { source: "id".to_string(),
                                           dest:   "id".to_string(), },
                          ExtraDataField { source: "org_id".to_string(),
                                           dest:   "organization".to_string(), },
                          ExtraDataField { source: "date_joined".to_string(),
                                           dest:   "date_joined".to_string(), },];
        let extra = extra_data(&raw, &fields);
        assert_eq!(extra.len(), 2);
        assert_eq!(extra["id"], "1174494");
        assert_eq!(extra["organization"], "NYSPMA");
    }

    #[test]
    fn envelope_is_unwrapped() {
        let map = json!({
            "provider": "tcs",
            "uid": 1174494,
            "info": {"first_name": "System", "email_address": "admin@tcs.com"}
        });
        let raw = unwrap_envelope(map.as_object().unwrap().clone());
        assert_eq!(raw.str_or_default("email_address"), "admin@tcs.com");
        assert!(raw.get("provider").is_none());

        let map = json!({"first_name": "Jane"});
        let raw = unwrap_envelope(map.as_object().unwrap().clone());
        assert_eq!(raw.str_or_default("first_name"), "Jane");
    }

    #[test]
    fn attributes_are_aliased() {
        let attributes = json!({
            "mail": "jane@x.org",
            "field_first_name": "Jane",
            "field_last_name": "Doe",
            "drupal_internal__uid": 7,
            "status": true
        });
        let raw = profile_from_attributes(attributes.as_object().unwrap());
        let details = normalize_details(&raw);
        assert_eq!(details.username, "jane@x.org");
        assert_eq!(details.fullname, "Jane Doe");
        assert_eq!(raw.scalar("id"), Some("7".to_string()));
        assert_eq!(raw.scalar("status"), Some("true".to_string()));
    }
}
