//! Serde helpers for secret fields.
//!
//! Secrets always serialize as a fixed mask. The plaintext is only written by
//! the explicit `Block::to_document` path.

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serializer};

/// Placeholder emitted instead of a secret value.
pub const SECRET_MASK: &str = "**********";

pub fn serialize_masked<S>(_secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(SECRET_MASK)
}

/// Deserialize a plaintext secret, refusing the mask placeholder.
pub fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if raw == SECRET_MASK {
        return Err(serde::de::Error::custom(
            "secret value is masked; load the block from its document instead",
        ));
    }
    Ok(SecretString::from(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Holder {
        #[serde(
            serialize_with = "serialize_masked",
            deserialize_with = "deserialize_secret"
        )]
        key: SecretString,
    }

    #[test]
    fn masks_on_serialize_and_reads_plaintext() {
        let holder: Holder = serde_json::from_str(r#"{"key":"sk-123"}"#).unwrap();
        assert_eq!(holder.key.expose_secret(), "sk-123");
        assert_eq!(
            serde_json::to_string(&holder).unwrap(),
            r#"{"key":"**********"}"#
        );
    }

    #[test]
    fn refuses_masked_placeholder() {
        let err = serde_json::from_str::<Holder>(r#"{"key":"**********"}"#).err();
        assert!(err.is_some());
    }
}
