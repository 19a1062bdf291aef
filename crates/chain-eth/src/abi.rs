//! Minimal ABI encoding for EVM function calls and event topics.
//!
//! Only static types are encoded: `address`, `bool`, `uint<N>` and
//! `bytes<N>`. Dynamic types parse, but encoding them fails with
//! [`EthError::UnsupportedType`].

use std::fmt;

use alloy_primitives::{B256, U256};
use sha3::{Digest, Keccak256};

use crate::address::Address;
use crate::error::EthError;

/// An ABI parameter type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiType {
    Address,
    Bool,
    /// `uint<N>`, N in bits.
    Uint(usize),
    /// `bytes<N>`, N in bytes.
    FixedBytes(usize),
    String,
    Bytes,
    Array(Box<AbiType>),
}

impl AbiType {
    /// Parses a Solidity type name. `uint` is an alias for `uint256`.
    pub fn parse(name: &str) -> Result<Self, EthError> {
        let name = name.trim();

        if let Some(inner) = name.strip_suffix(']') {
            let open = inner
                .rfind('[')
                .ok_or_else(|| EthError::UnsupportedType(name.to_string()))?;
            return Ok(AbiType::Array(Box::new(AbiType::parse(&inner[..open])?)));
        }

        match name {
            "address" => return Ok(AbiType::Address),
            "bool" => return Ok(AbiType::Bool),
            "string" => return Ok(AbiType::String),
            "bytes" => return Ok(AbiType::Bytes),
            "uint" => return Ok(AbiType::Uint(256)),
            _ => {}
        }

        if let Some(bits) = name.strip_prefix("uint").and_then(parse_size) {
            if bits % 8 == 0 && (8..=256).contains(&bits) {
                return Ok(AbiType::Uint(bits));
            }
        } else if let Some(len) = name.strip_prefix("bytes").and_then(parse_size) {
            if (1..=32).contains(&len) {
                return Ok(AbiType::FixedBytes(len));
            }
        }

        Err(EthError::UnsupportedType(name.to_string()))
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, AbiType::String | AbiType::Bytes | AbiType::Array(_))
    }
}

/// Parses a type size suffix. Only canonical decimal is accepted, so
/// `uint0256` and `bytes+32` are rejected.
fn parse_size(digits: &str) -> Option<usize> {
    let size = digits.parse::<usize>().ok()?;
    (size.to_string() == digits).then_some(size)
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Address => f.write_str("address"),
            AbiType::Bool => f.write_str("bool"),
            AbiType::Uint(bits) => write!(f, "uint{bits}"),
            AbiType::FixedBytes(len) => write!(f, "bytes{len}"),
            AbiType::String => f.write_str("string"),
            AbiType::Bytes => f.write_str("bytes"),
            AbiType::Array(inner) => write!(f, "{inner}[]"),
        }
    }
}

/// A single typed argument for [`encode_function_call`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Address(Address),
    Uint(U256),
    Bool(bool),
    /// Right-padded to 32 bytes; length must equal the declared `bytes<N>`.
    FixedBytes(Vec<u8>),
    String(String),
    Bytes(Vec<u8>),
}

impl AbiValue {
    fn kind(&self) -> &'static str {
        match self {
            AbiValue::Address(_) => "address",
            AbiValue::Uint(_) => "uint",
            AbiValue::Bool(_) => "bool",
            AbiValue::FixedBytes(_) => "fixed bytes",
            AbiValue::String(_) => "string",
            AbiValue::Bytes(_) => "bytes",
        }
    }
}

/// Keccak-256 of arbitrary bytes.
pub fn keccak256(data: impl AsRef<[u8]>) -> B256 {
    let hash: [u8; 32] = Keccak256::digest(data.as_ref()).into();
    B256::from(hash)
}

/// Builds `name(type1,type2,...)` with no whitespace.
pub fn canonical_signature(name: &str, param_types: &[&str]) -> String {
    let params: Vec<&str> = param_types.iter().map(|t| t.trim()).collect();
    format!("{}({})", name.trim(), params.join(","))
}

/// First 4 bytes of the Keccak-256 hash of a function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&hash[..4]);
    sel
}

/// Keccak-256 of the canonical event signature; the mandatory topics[0]
/// of any log filter targeting that event.
pub fn event_signature_hash(name: &str, param_types: &[&str]) -> B256 {
    keccak256(canonical_signature(name, param_types).as_bytes())
}

/// Splits `name(t1,t2)` into its name and parsed parameter types.
pub fn parse_signature(signature: &str) -> Result<(String, Vec<AbiType>), EthError> {
    let signature = signature.trim();
    let open = signature.find('(').ok_or_else(|| {
        EthError::MalformedData(format!("signature {signature:?} has no parameter list"))
    })?;
    let params = signature[open + 1..].strip_suffix(')').ok_or_else(|| {
        EthError::MalformedData(format!("signature {signature:?} is not closed"))
    })?;

    let name = signature[..open].trim();
    if name.is_empty() {
        return Err(EthError::MalformedData(format!(
            "signature {signature:?} has no function name"
        )));
    }

    // Tuples are the only place a nested parenthesis can appear.
    if params.contains('(') {
        return Err(EthError::UnsupportedType(params.to_string()));
    }

    let types = if params.trim().is_empty() {
        Vec::new()
    } else {
        params
            .split(',')
            .map(AbiType::parse)
            .collect::<Result<Vec<_>, _>>()?
    };

    Ok((name.to_string(), types))
}

/// Encodes a function call as `selector || word(arg0) || word(arg1) || ...`.
///
/// The selector is derived from the canonical form of `signature`, so
/// `"balanceOf( address )"` and `"balanceOf(address)"` encode identically.
pub fn encode_function_call(signature: &str, args: &[AbiValue]) -> Result<Vec<u8>, EthError> {
    let (name, types) = parse_signature(signature)?;

    if let Some(dynamic) = types.iter().find(|t| t.is_dynamic()) {
        return Err(EthError::UnsupportedType(dynamic.to_string()));
    }

    if types.len() != args.len() {
        return Err(EthError::MalformedData(format!(
            "{name} expects {} argument(s), got {}",
            types.len(),
            args.len()
        )));
    }

    let type_names: Vec<String> = types.iter().map(ToString::to_string).collect();
    let type_refs: Vec<&str> = type_names.iter().map(String::as_str).collect();
    let canonical = canonical_signature(&name, &type_refs);

    let mut data = Vec::with_capacity(4 + args.len() * 32);
    data.extend_from_slice(&selector(&canonical));

    for (ty, value) in types.iter().zip(args) {
        data.extend_from_slice(&encode_param(ty, value)?);
    }

    Ok(data)
}

/// Encodes one static argument as a 32-byte ABI word.
fn encode_param(ty: &AbiType, value: &AbiValue) -> Result<[u8; 32], EthError> {
    let mut word = [0u8; 32];

    match (ty, value) {
        (_, AbiValue::String(_)) | (_, AbiValue::Bytes(_)) => {
            return Err(EthError::UnsupportedType(value.kind().to_string()));
        }
        (AbiType::Address, AbiValue::Address(addr)) => {
            // Left-pad: 12 zero bytes + 20 address bytes.
            word[12..].copy_from_slice(addr.as_bytes());
        }
        (AbiType::Uint(bits), AbiValue::Uint(v)) => {
            if v.bit_len() > *bits {
                return Err(EthError::MalformedData(format!(
                    "value {v} does not fit in uint{bits}"
                )));
            }
            word = v.to_be_bytes::<32>();
        }
        (AbiType::Bool, AbiValue::Bool(b)) => {
            word[31] = u8::from(*b);
        }
        (AbiType::FixedBytes(len), AbiValue::FixedBytes(bytes)) => {
            if bytes.len() != *len {
                return Err(EthError::MalformedData(format!(
                    "bytes{len} argument has {} bytes",
                    bytes.len()
                )));
            }
            // Right-pad: data + trailing zero bytes.
            word[..*len].copy_from_slice(bytes);
        }
        (ty, value) => {
            return Err(EthError::MalformedData(format!(
                "expected {ty} argument, got {}",
                value.kind()
            )));
        }
    }

    Ok(word)
}

/// Recovers an indexed `address` parameter from a log topic: the low 20
/// bytes of the word.
pub fn decode_topic_address(topic: &B256) -> Address {
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&topic[12..]);
    Address::new(addr)
}

/// Left-pads an address to a 32-byte topic word.
pub fn address_to_topic(address: &Address) -> B256 {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    B256::from(word)
}

/// Interprets a big-endian byte payload as an unsigned integer.
///
/// Any length is accepted as long as the value fits in 256 bits.
pub fn decode_uint256(data: &[u8]) -> Result<U256, EthError> {
    if data.is_empty() {
        return Err(EthError::MalformedData("empty uint256 payload".into()));
    }

    let first = data.iter().position(|b| *b != 0).unwrap_or(data.len());
    let significant = &data[first..];
    if significant.len() > 32 {
        return Err(EthError::MalformedData(format!(
            "{} byte payload exceeds 256 bits",
            data.len()
        )));
    }
    if significant.is_empty() {
        return Ok(U256::ZERO);
    }

    Ok(U256::from_be_slice(significant))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, RngCore};

    const TRANSFER_HASH: &str =
        "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

    fn dead() -> Address {
        Address::parse("0x000000000000000000000000000000000000dEaD").unwrap()
    }

    #[test]
    fn transfer_event_hash_matches_known_constant() {
        let hash = event_signature_hash("Transfer", &["address", "address", "uint256"]);
        assert_eq!(hash.to_string(), TRANSFER_HASH);
    }

    #[test]
    fn canonical_signature_strips_whitespace() {
        assert_eq!(
            canonical_signature(" Transfer ", &["address", " address", "uint256 "]),
            "Transfer(address,address,uint256)"
        );
        assert_eq!(canonical_signature("decimals", &[]), "decimals()");
    }

    #[test]
    fn known_selectors() {
        assert_eq!(hex::encode(selector("balanceOf(address)")), "70a08231");
        assert_eq!(hex::encode(selector("transfer(address,uint256)")), "a9059cbb");
        assert_eq!(hex::encode(selector("decimals()")), "313ce567");
    }

    #[test]
    fn parse_type_names() {
        assert_eq!(AbiType::parse("address").unwrap(), AbiType::Address);
        assert_eq!(AbiType::parse("uint").unwrap(), AbiType::Uint(256));
        assert_eq!(AbiType::parse("uint8").unwrap(), AbiType::Uint(8));
        assert_eq!(AbiType::parse("bytes32").unwrap(), AbiType::FixedBytes(32));
        assert_eq!(
            AbiType::parse("address[]").unwrap(),
            AbiType::Array(Box::new(AbiType::Address))
        );
        assert!(AbiType::parse("uint7").is_err());
        assert!(AbiType::parse("bytes33").is_err());
        assert!(AbiType::parse("int256").is_err());
    }

    #[test]
    fn non_canonical_sizes_are_rejected() {
        for name in ["uint0256", "uint+256", "bytes+32", "bytes032"] {
            assert_eq!(AbiType::parse(name), Err(EthError::UnsupportedType(name.to_string())));
        }
        assert!(encode_function_call("f(uint0256)", &[AbiValue::Uint(U256::from(1))]).is_err());
    }

    #[test]
    fn encode_balance_of_call() {
        let data =
            encode_function_call("balanceOf(address)", &[AbiValue::Address(dead())]).unwrap();

        // 4 (selector) + 32 (address) = 36 bytes.
        assert_eq!(data.len(), 36);
        assert_eq!(hex::encode(&data[..4]), "70a08231");
        // Address is left-padded to 32 bytes starting at offset 4.
        assert_eq!(&data[4..16], &[0u8; 12]);
        assert_eq!(data[34], 0xde);
        assert_eq!(data[35], 0xad);
    }

    #[test]
    fn encode_normalizes_signature() {
        let spaced =
            encode_function_call("balanceOf( uint )", &[AbiValue::Uint(U256::from(1))]).unwrap();
        let canonical =
            encode_function_call("balanceOf(uint256)", &[AbiValue::Uint(U256::from(1))]).unwrap();
        assert_eq!(spaced, canonical);
    }

    #[test]
    fn encode_uint_and_bool_words() {
        let data = encode_function_call(
            "f(uint256,bool)",
            &[AbiValue::Uint(U256::from(100)), AbiValue::Bool(true)],
        )
        .unwrap();

        assert_eq!(data.len(), 68);
        assert_eq!(&data[4..35], &[0u8; 31]);
        assert_eq!(data[35], 100);
        assert_eq!(data[67], 1);
    }

    #[test]
    fn encode_fixed_bytes_right_padded() {
        let data =
            encode_function_call("f(bytes2)", &[AbiValue::FixedBytes(vec![0xca, 0xfe])]).unwrap();
        assert_eq!(&data[4..6], &[0xca, 0xfe]);
        assert_eq!(&data[6..], &[0u8; 30]);
    }

    #[test]
    fn encode_rejects_dynamic_signature_types() {
        let err = encode_function_call("setName(string)", &[AbiValue::String("x".into())])
            .unwrap_err();
        assert_eq!(err, EthError::UnsupportedType("string".into()));

        let err = encode_function_call("f(address[])", &[]).unwrap_err();
        assert_eq!(err, EthError::UnsupportedType("address[]".into()));
    }

    #[test]
    fn encode_rejects_dynamic_values() {
        let err = encode_function_call("f(address)", &[AbiValue::Bytes(vec![1, 2])]).unwrap_err();
        assert_eq!(err, EthError::UnsupportedType("bytes".into()));
    }

    #[test]
    fn encode_rejects_tuples() {
        let err = encode_function_call("f((address,uint256))", &[]).unwrap_err();
        assert!(matches!(err, EthError::UnsupportedType(_)));
    }

    #[test]
    fn encode_checks_arity_and_types() {
        assert!(matches!(
            encode_function_call("balanceOf(address)", &[]),
            Err(EthError::MalformedData(_))
        ));
        assert!(matches!(
            encode_function_call("balanceOf(address)", &[AbiValue::Bool(true)]),
            Err(EthError::MalformedData(_))
        ));
    }

    #[test]
    fn encode_checks_uint_width() {
        let err = encode_function_call("f(uint8)", &[AbiValue::Uint(U256::from(256))]).unwrap_err();
        assert!(matches!(err, EthError::MalformedData(_)));
        assert!(encode_function_call("f(uint8)", &[AbiValue::Uint(U256::from(255))]).is_ok());
    }

    #[test]
    fn malformed_signatures() {
        assert!(parse_signature("balanceOf").is_err());
        assert!(parse_signature("balanceOf(address").is_err());
        assert!(parse_signature("(address)").is_err());
    }

    #[test]
    fn topic_address_takes_low_20_bytes() {
        let mut word = [0xffu8; 32];
        word[12..].copy_from_slice(dead().as_bytes());

        // High bytes are ignored, not validated.
        assert_eq!(decode_topic_address(&B256::from(word)), dead());
    }

    #[test]
    fn topic_address_round_trip() {
        let mut rng = rand::thread_rng();
        for _ in 0..256 {
            let mut bytes = [0u8; 20];
            rng.fill_bytes(&mut bytes);
            let addr = Address::new(bytes);

            let topic = address_to_topic(&addr);
            assert_eq!(&topic[..12], &[0u8; 12]);
            assert_eq!(decode_topic_address(&topic), addr);
        }
    }

    #[test]
    fn uint256_round_trip() {
        let mut rng = rand::thread_rng();
        for _ in 0..256 {
            let mut limbs = [0u64; 4];
            // Vary the width so small values are covered too.
            let used = rng.gen_range(0..=4);
            for limb in limbs.iter_mut().take(used) {
                *limb = rng.gen();
            }
            let v = U256::from_limbs(limbs);

            let word = v.to_be_bytes::<32>();
            assert_eq!(decode_uint256(&word).unwrap(), v);
        }
        assert_eq!(decode_uint256(&U256::MAX.to_be_bytes::<32>()).unwrap(), U256::MAX);
    }

    #[test]
    fn decode_uint256_short_and_long_payloads() {
        assert_eq!(decode_uint256(&[0x05, 0xf5, 0xe1, 0x00]).unwrap(), U256::from(100_000_000u64));

        let mut padded = vec![0u8; 40];
        padded[39] = 42;
        assert_eq!(decode_uint256(&padded).unwrap(), U256::from(42));

        let mut too_wide = vec![0u8; 33];
        too_wide[0] = 1;
        assert!(matches!(decode_uint256(&too_wide), Err(EthError::MalformedData(_))));
    }

    #[test]
    fn decode_uint256_empty_errors() {
        assert_eq!(
            decode_uint256(&[]).unwrap_err(),
            EthError::MalformedData("empty uint256 payload".into())
        );
    }
}
