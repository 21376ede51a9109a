//! Wire messages for the EOTS manager RPC protocol.
//!
//! Every frame on the wire is a 4-byte big-endian length prefix followed by
//! a bincode-encoded [`RpcRequest`] or [`RpcResponse`]. Byte fields are raw
//! binary; scalars and x-only field elements are 32-byte big-endian. Public
//! keys travel in the 33-byte compressed form (the server also accepts the
//! bare 32-byte x-only form, which encodes the same identity).

use serde::{Deserialize, Serialize};

use eots_types::{Bip340PublicKey, EotsError, EotsSignature, PublicRandomness, SchnorrSignature};

/// Maximum frame body size. Requests carry at most a message blob and a
/// passphrase; anything bigger is a protocol violation.
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

/// A request from client to server. Mirrors the manager trait one-for-one.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum RpcRequest {
    /// Reachability probe; the client sends one before its constructor
    /// returns.
    Ping,
    CreateKey {
        name: String,
        passphrase: String,
        hd_path: String,
    },
    CreateRandomnessBatch {
        pk: Vec<u8>,
        chain_id: Vec<u8>,
        start_height: u64,
        num: u32,
    },
    KeyRecord {
        pk: Vec<u8>,
        passphrase: String,
    },
    SignEots {
        pk: Vec<u8>,
        chain_id: Vec<u8>,
        msg: Vec<u8>,
        height: u64,
        passphrase: String,
    },
    SignSchnorr {
        pk: Vec<u8>,
        msg: Vec<u8>,
        passphrase: String,
    },
}

/// A response from server to client.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum RpcResponse {
    Pong,
    /// The 33-byte compressed public key of the created key.
    CreateKey { pk: Vec<u8> },
    /// Public nonces in height order.
    CreateRandomnessBatch { public_nonces: Vec<PublicRandomness> },
    KeyRecord { name: String, private_key: Vec<u8> },
    SignEots { sig: EotsSignature },
    SignSchnorr { sig: SchnorrSignature },
    Error(WireError),
}

impl RpcResponse {
    /// The variant name, for diagnostics that must not echo payloads
    /// (a `KeyRecord` response carries a private key).
    pub fn variant_name(&self) -> &'static str {
        match self {
            RpcResponse::Pong => "Pong",
            RpcResponse::CreateKey { .. } => "CreateKey",
            RpcResponse::CreateRandomnessBatch { .. } => "CreateRandomnessBatch",
            RpcResponse::KeyRecord { .. } => "KeyRecord",
            RpcResponse::SignEots { .. } => "SignEots",
            RpcResponse::SignSchnorr { .. } => "SignSchnorr",
            RpcResponse::Error(_) => "Error",
        }
    }
}

/// Error kinds on the wire. Each variant is a distinct, stable status code
/// (see [`WireError::code`]); the embedded payloads reconstruct the exact
/// [`EotsError`] on the client side, so kinds cross the wire verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireError {
    AlreadyExists { name: String },
    AlreadyCommitted { height: u64 },
    NotFound { what: String },
    MissingRandomness { height: u64 },
    WrongPassphrase,
    InvalidArgument { reason: String },
    Storage { reason: String },
    Transient { reason: String },
}

impl WireError {
    /// The stable numeric status code for this kind.
    pub fn code(&self) -> u16 {
        match self {
            WireError::AlreadyExists { .. } => 1,
            WireError::AlreadyCommitted { .. } => 2,
            WireError::NotFound { .. } => 3,
            WireError::MissingRandomness { .. } => 4,
            WireError::WrongPassphrase => 5,
            WireError::InvalidArgument { .. } => 6,
            WireError::Storage { .. } => 7,
            WireError::Transient { .. } => 8,
        }
    }

    pub fn from_error(e: &EotsError) -> Self {
        match e {
            EotsError::AlreadyExists(name) => WireError::AlreadyExists { name: name.clone() },
            EotsError::AlreadyCommitted { height } => {
                WireError::AlreadyCommitted { height: *height }
            }
            EotsError::NotFound(what) => WireError::NotFound { what: what.clone() },
            EotsError::MissingRandomness { height } => {
                WireError::MissingRandomness { height: *height }
            }
            EotsError::WrongPassphrase => WireError::WrongPassphrase,
            EotsError::InvalidArgument(reason) => WireError::InvalidArgument {
                reason: reason.clone(),
            },
            EotsError::Storage(reason) => WireError::Storage {
                reason: reason.clone(),
            },
            EotsError::Transient(reason) => WireError::Transient {
                reason: reason.clone(),
            },
        }
    }

    pub fn into_error(self) -> EotsError {
        match self {
            WireError::AlreadyExists { name } => EotsError::AlreadyExists(name),
            WireError::AlreadyCommitted { height } => EotsError::AlreadyCommitted { height },
            WireError::NotFound { what } => EotsError::NotFound(what),
            WireError::MissingRandomness { height } => EotsError::MissingRandomness { height },
            WireError::WrongPassphrase => EotsError::WrongPassphrase,
            WireError::InvalidArgument { reason } => EotsError::InvalidArgument(reason),
            WireError::Storage { reason } => EotsError::Storage(reason),
            WireError::Transient { reason } => EotsError::Transient(reason),
        }
    }
}

/// Parse a wire public key: 33-byte compressed (prefix `0x02`/`0x03`) or
/// bare 32-byte x-only.
pub fn parse_wire_pk(bytes: &[u8]) -> Result<Bip340PublicKey, EotsError> {
    match bytes.len() {
        33 if bytes[0] == 0x02 || bytes[0] == 0x03 => Bip340PublicKey::from_slice(&bytes[1..]),
        32 => Bip340PublicKey::from_slice(bytes),
        _ => Err(EotsError::InvalidArgument(format!(
            "public key must be 33-byte compressed or 32-byte x-only, got {} bytes",
            bytes.len()
        ))),
    }
}

/// Encode an x-only key in the compressed wire form (even-y prefix).
pub fn wire_pk(pk: &Bip340PublicKey) -> Vec<u8> {
    let mut out = Vec::with_capacity(33);
    out.push(0x02);
    out.extend_from_slice(pk.as_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_roundtrip() {
        let msg = RpcRequest::SignEots {
            pk: vec![0x02; 33],
            chain_id: b"BTC".to_vec(),
            msg: b"block hash".to_vec(),
            height: 12345,
            passphrase: "pw".into(),
        };
        let bytes = bincode::serialize(&msg).unwrap();
        let decoded: RpcRequest = bincode::deserialize(&bytes).unwrap();
        match decoded {
            RpcRequest::SignEots { height, chain_id, .. } => {
                assert_eq!(height, 12345);
                assert_eq!(chain_id, b"BTC");
            }
            other => panic!("expected SignEots, got {:?}", other),
        }
    }

    #[test]
    fn response_roundtrip() {
        let msg = RpcResponse::CreateRandomnessBatch {
            public_nonces: vec![
                PublicRandomness::new([1u8; 32]),
                PublicRandomness::new([2u8; 32]),
            ],
        };
        let bytes = bincode::serialize(&msg).unwrap();
        let decoded: RpcResponse = bincode::deserialize(&bytes).unwrap();
        match decoded {
            RpcResponse::CreateRandomnessBatch { public_nonces } => {
                assert_eq!(public_nonces.len(), 2);
                assert_eq!(public_nonces[0].as_bytes(), &[1u8; 32]);
            }
            other => panic!("expected CreateRandomnessBatch, got {:?}", other),
        }
    }

    #[test]
    fn ping_roundtrip() {
        let bytes = bincode::serialize(&RpcRequest::Ping).unwrap();
        let decoded: RpcRequest = bincode::deserialize(&bytes).unwrap();
        assert!(matches!(decoded, RpcRequest::Ping));
    }

    #[test]
    fn every_error_kind_roundtrips_verbatim() {
        let errors = vec![
            EotsError::AlreadyExists("alice".into()),
            EotsError::AlreadyCommitted { height: 102 },
            EotsError::NotFound("key 'bob'".into()),
            EotsError::MissingRandomness { height: 99 },
            EotsError::WrongPassphrase,
            EotsError::InvalidArgument("bad length".into()),
            EotsError::Storage("disk on fire".into()),
            EotsError::Transient("connection reset".into()),
        ];

        let mut seen_codes = std::collections::HashSet::new();
        for original in errors {
            let wire = WireError::from_error(&original);
            assert!(seen_codes.insert(wire.code()), "codes must be distinct");

            let bytes = bincode::serialize(&RpcResponse::Error(wire)).unwrap();
            let decoded: RpcResponse = bincode::deserialize(&bytes).unwrap();
            let RpcResponse::Error(wire_back) = decoded else {
                panic!("expected error response");
            };
            let reconstructed = wire_back.into_error();
            assert_eq!(
                std::mem::discriminant(&reconstructed),
                std::mem::discriminant(&original),
                "kind must survive the wire"
            );
            assert_eq!(reconstructed.to_string(), original.to_string());
        }
    }

    #[test]
    fn parse_wire_pk_accepts_both_forms() {
        let x = [0x42u8; 32];
        let mut compressed = vec![0x03];
        compressed.extend_from_slice(&x);

        assert_eq!(parse_wire_pk(&compressed).unwrap().as_bytes(), &x);
        assert_eq!(parse_wire_pk(&x).unwrap().as_bytes(), &x);
    }

    #[test]
    fn parse_wire_pk_rejects_garbage() {
        assert!(parse_wire_pk(&[0u8; 31]).is_err());
        assert!(parse_wire_pk(&[0u8; 34]).is_err());
        // 33 bytes with an invalid SEC1 prefix.
        assert!(parse_wire_pk(&[0x05; 33]).is_err());
    }

    #[test]
    fn wire_pk_roundtrips_through_parse() {
        let pk = Bip340PublicKey::new([0x7C; 32]);
        let encoded = wire_pk(&pk);
        assert_eq!(encoded.len(), 33);
        assert_eq!(parse_wire_pk(&encoded).unwrap(), pk);
    }

    #[test]
    fn corrupt_bytes_rejected_gracefully() {
        let garbage = vec![0xFF, 0x00, 0xDE, 0xAD, 0xBE, 0xEF];
        assert!(bincode::deserialize::<RpcRequest>(&garbage).is_err());
        assert!(bincode::deserialize::<RpcResponse>(&garbage).is_err());
    }

    #[test]
    fn truncated_message_rejected() {
        let msg = RpcRequest::CreateKey {
            name: "alice".into(),
            passphrase: "pw".into(),
            hd_path: String::new(),
        };
        let bytes = bincode::serialize(&msg).unwrap();
        assert!(bincode::deserialize::<RpcRequest>(&bytes[..bytes.len() / 2]).is_err());
    }

    #[test]
    fn empty_bytes_rejected() {
        assert!(bincode::deserialize::<RpcRequest>(&[]).is_err());
    }
}
