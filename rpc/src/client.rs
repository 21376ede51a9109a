//! Blocking RPC client implementing the [`EotsManager`] trait.

use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Mutex;
use std::time::Duration;

use eots_manager::EotsManager;
use eots_types::{
    Bip340PublicKey, EotsError, EotsSignature, KeyRecord, PublicRandomness, SchnorrSignature,
    SecretKey,
};

use crate::messages::{wire_pk, RpcRequest, RpcResponse, MAX_FRAME_SIZE};

/// Timeout for the initial TCP connection attempt.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for reading a single response frame. Generous because the
/// passphrase KDF on the server side is deliberately slow.
const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// A connection to a remote EOTS manager.
///
/// The constructor dials the server and performs one `Ping`; a dead address
/// fails before the constructor returns. Calls are serialized over the one
/// connection. No caching, no retry: transport failures surface as
/// [`EotsError::Transient`] and the caller decides whether to redial.
pub struct EotsManagerRpcClient {
    stream: Mutex<TcpStream>,
}

impl EotsManagerRpcClient {
    /// Connect to `addr` ("ip:port") with the default timeout.
    pub fn connect(addr: &str) -> Result<Self, EotsError> {
        Self::connect_with_timeout(addr, CONNECT_TIMEOUT)
    }

    /// Connect with an explicit connection timeout.
    pub fn connect_with_timeout(addr: &str, timeout: Duration) -> Result<Self, EotsError> {
        let sock_addr: SocketAddr = addr
            .to_socket_addrs()
            .map_err(|e| EotsError::Transient(format!("cannot resolve {addr}: {e}")))?
            .next()
            .ok_or_else(|| EotsError::Transient(format!("no address for {addr}")))?;

        let stream = TcpStream::connect_timeout(&sock_addr, timeout)
            .map_err(|e| EotsError::Transient(format!("cannot connect to {addr}: {e}")))?;
        stream
            .set_read_timeout(Some(READ_TIMEOUT))
            .map_err(|e| EotsError::Transient(format!("socket setup: {e}")))?;
        stream
            .set_write_timeout(Some(READ_TIMEOUT))
            .map_err(|e| EotsError::Transient(format!("socket setup: {e}")))?;
        stream
            .set_nodelay(true)
            .map_err(|e| EotsError::Transient(format!("socket setup: {e}")))?;

        let client = Self {
            stream: Mutex::new(stream),
        };

        // Reachability probe: the server must answer before we hand the
        // client out.
        match client.call(&RpcRequest::Ping)? {
            RpcResponse::Pong => Ok(client),
            other => Err(EotsError::Transient(format!(
                "unexpected ping response: {}",
                other.variant_name()
            ))),
        }
    }

    /// Send one request and read one response frame.
    fn call(&self, request: &RpcRequest) -> Result<RpcResponse, EotsError> {
        let body = bincode::serialize(request)
            .map_err(|e| EotsError::InvalidArgument(format!("cannot encode request: {e}")))?;
        if body.len() > MAX_FRAME_SIZE {
            return Err(EotsError::InvalidArgument(format!(
                "request of {} bytes exceeds the {} byte frame limit",
                body.len(),
                MAX_FRAME_SIZE
            )));
        }

        let mut stream = self
            .stream
            .lock()
            .map_err(|_| EotsError::Transient("client lock poisoned".into()))?;

        let write_err = |e: std::io::Error| EotsError::Transient(format!("write failed: {e}"));
        let len_bytes = (body.len() as u32).to_be_bytes();
        stream.write_all(&len_bytes).map_err(write_err)?;
        stream.write_all(&body).map_err(write_err)?;
        stream.flush().map_err(write_err)?;

        let mut len_buf = [0u8; 4];
        stream
            .read_exact(&mut len_buf)
            .map_err(|e| EotsError::Transient(format!("read failed: {e}")))?;
        let body_len = u32::from_be_bytes(len_buf) as usize;
        if body_len == 0 || body_len > MAX_FRAME_SIZE {
            return Err(EotsError::Transient(format!(
                "invalid response frame length {body_len}"
            )));
        }
        let mut response = vec![0u8; body_len];
        stream
            .read_exact(&mut response)
            .map_err(|e| EotsError::Transient(format!("read failed: {e}")))?;

        bincode::deserialize(&response)
            .map_err(|e| EotsError::Transient(format!("cannot decode response: {e}")))
    }
}

/// Map an unexpected response variant to a transport error.
fn unexpected(response: RpcResponse) -> EotsError {
    match response {
        RpcResponse::Error(wire) => wire.into_error(),
        other => EotsError::Transient(format!(
            "unexpected response type: {}",
            other.variant_name()
        )),
    }
}

impl EotsManager for EotsManagerRpcClient {
    fn create_key(
        &self,
        name: &str,
        passphrase: &str,
        hd_path: &str,
    ) -> Result<[u8; 33], EotsError> {
        let response = self.call(&RpcRequest::CreateKey {
            name: name.to_string(),
            passphrase: passphrase.to_string(),
            hd_path: hd_path.to_string(),
        })?;
        match response {
            RpcResponse::CreateKey { pk } => pk.try_into().map_err(|pk: Vec<u8>| {
                EotsError::Transient(format!("server returned a {}-byte public key", pk.len()))
            }),
            other => Err(unexpected(other)),
        }
    }

    fn create_randomness_batch(
        &self,
        pk: &Bip340PublicKey,
        chain_id: &[u8],
        start_height: u64,
        num: u32,
    ) -> Result<Vec<PublicRandomness>, EotsError> {
        let response = self.call(&RpcRequest::CreateRandomnessBatch {
            pk: wire_pk(pk),
            chain_id: chain_id.to_vec(),
            start_height,
            num,
        })?;
        match response {
            RpcResponse::CreateRandomnessBatch { public_nonces } => Ok(public_nonces),
            other => Err(unexpected(other)),
        }
    }

    fn key_record(
        &self,
        pk: &Bip340PublicKey,
        passphrase: &str,
    ) -> Result<KeyRecord, EotsError> {
        let response = self.call(&RpcRequest::KeyRecord {
            pk: wire_pk(pk),
            passphrase: passphrase.to_string(),
        })?;
        match response {
            RpcResponse::KeyRecord { name, private_key } => {
                let secret: [u8; 32] = private_key.try_into().map_err(|sk: Vec<u8>| {
                    EotsError::Transient(format!("server returned a {}-byte secret", sk.len()))
                })?;
                Ok(KeyRecord {
                    name,
                    secret: SecretKey(secret),
                })
            }
            other => Err(unexpected(other)),
        }
    }

    fn sign_eots(
        &self,
        pk: &Bip340PublicKey,
        chain_id: &[u8],
        msg: &[u8],
        height: u64,
        passphrase: &str,
    ) -> Result<EotsSignature, EotsError> {
        let response = self.call(&RpcRequest::SignEots {
            pk: wire_pk(pk),
            chain_id: chain_id.to_vec(),
            msg: msg.to_vec(),
            height,
            passphrase: passphrase.to_string(),
        })?;
        match response {
            RpcResponse::SignEots { sig } => Ok(sig),
            other => Err(unexpected(other)),
        }
    }

    fn sign_schnorr(
        &self,
        pk: &Bip340PublicKey,
        msg: &[u8],
        passphrase: &str,
    ) -> Result<SchnorrSignature, EotsError> {
        let response = self.call(&RpcRequest::SignSchnorr {
            pk: wire_pk(pk),
            msg: msg.to_vec(),
            passphrase: passphrase.to_string(),
        })?;
        match response {
            RpcResponse::SignSchnorr { sig } => Ok(sig),
            other => Err(unexpected(other)),
        }
    }

    fn close(&self) -> Result<(), EotsError> {
        let stream = self
            .stream
            .lock()
            .map_err(|_| EotsError::Transient("client lock poisoned".into()))?;
        stream
            .shutdown(Shutdown::Both)
            .map_err(|e| EotsError::Transient(format!("shutdown failed: {e}")))
    }
}
