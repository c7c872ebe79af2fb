use {
    alloy::primitives::U256,
    serde::{Deserialize, Deserializer, Serializer, de},
    serde_with::{DeserializeAs, SerializeAs},
    std::borrow::Cow,
};

/// Serializes a `U256` as a base-10 string. Deserialization also accepts
/// `0x`-prefixed hex strings.
pub struct DecimalU256;

impl SerializeAs<U256> for DecimalU256 {
    fn serialize_as<S: Serializer>(source: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&source.to_string())
    }
}

impl<'de> DeserializeAs<'de, U256> for DecimalU256 {
    fn deserialize_as<D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let value = Cow::<str>::deserialize(deserializer)?;
        match value.strip_prefix("0x") {
            Some(hex) => U256::from_str_radix(hex, 16),
            None => U256::from_str_radix(&value, 10),
        }
        .map_err(|err| de::Error::custom(format!("invalid U256 {value:?}: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use {super::*, serde::Serialize, serde_with::serde_as};

    #[serde_as]
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Amount(#[serde_as(as = "DecimalU256")] U256);

    #[test]
    fn serializes_as_decimal_string() {
        let amount = Amount(U256::from(1_000_000));
        assert_eq!(serde_json::to_string(&amount).unwrap(), r#""1000000""#);
    }

    #[test]
    fn deserializes_decimal_and_hex() {
        let decimal: Amount = serde_json::from_str(r#""255""#).unwrap();
        let hex: Amount = serde_json::from_str(r#""0xff""#).unwrap();
        assert_eq!(decimal, hex);
        assert!(serde_json::from_str::<Amount>(r#""nope""#).is_err());
    }
}
