//! Serde helpers for domain types whose wire encoding differs from their
//! in-memory representation.

/// EIP-55 checksummed `0x…` strings for [`Address`](crate::address::Address).
pub mod address {
    use core::str::FromStr;

    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use crate::address::Address;

    /// Serializes an address in its checksummed textual form.
    pub fn serialize<S>(address: &Address, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&address.to_string())
    }

    /// Deserializes an address from its textual form.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Address, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)
            .map(|s| Address::from_str(&s))?
            .map_err(D::Error::custom)
    }
}

/// Lowercase `0x…` strings for [`TxHash`](crate::address::TxHash).
pub mod tx_hash {
    use core::str::FromStr;

    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use crate::address::TxHash;

    /// Serializes a hash as a `0x`-prefixed hex string.
    pub fn serialize<S>(hash: &TxHash, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hash.to_string())
    }

    /// Deserializes a hash from its hex form.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<TxHash, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)
            .map(|s| TxHash::from_str(&s))?
            .map_err(D::Error::custom)
    }
}

/// Decimal strings for wei-denominated [`U256`](primitive_types::U256)
/// values. JSON numbers cannot carry full 256-bit precision, so values are
/// rendered as strings and accepted as either strings or integers.
pub mod u256_dec {
    use primitive_types::U256;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum DecimalRepr {
        Number(u64),
        Text(String),
    }

    /// Serializes the value as a decimal string.
    pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    /// Deserializes a decimal string or integer.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        match DecimalRepr::deserialize(deserializer)? {
            DecimalRepr::Number(n) => Ok(U256::from(n)),
            DecimalRepr::Text(s) => {
                safe_history_utils::u256_from_dec(&s).map_err(D::Error::custom)
            },
        }
    }
}

/// Optional hex byte payloads: `None` serializes as `null`, and both `null`
/// and an empty hex string deserialize to `None`.
pub mod hex_bytes_opt {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    /// Serializes the payload as a `0x`-prefixed hex string, or `null`.
    pub fn serialize<S>(data: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match data {
            Some(bytes) => serializer.serialize_str(&safe_history_utils::encode_hex(bytes)),
            None => serializer.serialize_none(),
        }
    }

    /// Deserializes an optional hex payload, normalizing empty to `None`.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text: Option<String> = Option::deserialize(deserializer)?;

        match text.as_deref() {
            None | Some("") | Some("0x") => Ok(None),
            Some(hex) => safe_history_utils::decode_hex(hex)
                .map(Some)
                .map_err(D::Error::custom),
        }
    }
}

/// Numeric 0/1/2 wire encoding for [`SafeOperation`](crate::tx::SafeOperation).
pub mod operation {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use crate::tx::SafeOperation;

    /// Serializes the operation as its numeric encoding.
    pub fn serialize<S>(operation: &SafeOperation, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(operation.as_u8())
    }

    /// Deserializes the numeric encoding.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<SafeOperation, D::Error>
    where
        D: Deserializer<'de>,
    {
        u8::deserialize(deserializer)
            .map(TryFrom::try_from)?
            .map_err(|raw| D::Error::custom(format!("invalid operation {raw}")))
    }
}

/// Display/FromStr encoding for
/// [`ConfirmationKind`](crate::confirmation::ConfirmationKind), uppercase
/// outbound and case-insensitive inbound.
pub mod confirmation_kind {
    use core::str::FromStr;

    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use crate::confirmation::ConfirmationKind;

    /// Serializes the kind in its uppercase form.
    pub fn serialize<S>(kind: &ConfirmationKind, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(kind.into())
    }

    /// Deserializes the kind, accepting any casing.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<ConfirmationKind, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)
            .map(|s| ConfirmationKind::from_str(&s))?
            .map_err(D::Error::custom)
    }
}
