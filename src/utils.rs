use std::{fmt::Display, str::FromStr};

use serde::{de, Deserialize, Deserializer};
use sha2::{Digest, Sha256};

pub fn hash_password(password: &str, username: &str) -> Vec<u8> {
    Sha256::digest(format!("{password}:{username}")).to_vec()
}

/// Query strings carry `siteId=` for "no filter", which would otherwise fail to parse
pub fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<String>::deserialize(de)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}
