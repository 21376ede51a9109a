//! TCP server exposing a manager over the wire protocol.

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use eots_manager::EotsManager;
use eots_types::EotsError;

use crate::messages::{parse_wire_pk, RpcRequest, RpcResponse, WireError, MAX_FRAME_SIZE};

/// Serves [`EotsManager`] operations to remote clients: one tokio task per
/// connection, blocking manager work (Argon2 KDF, LMDB commits) pushed onto
/// the blocking pool.
pub struct RpcServer {
    manager: Arc<dyn EotsManager>,
}

impl RpcServer {
    pub fn new(manager: Arc<dyn EotsManager>) -> Self {
        Self { manager }
    }

    /// Accept connections on `listener` until the task is dropped.
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        tracing::info!(addr = %listener.local_addr()?, "EOTS manager RPC listening");
        loop {
            let (stream, peer) = listener.accept().await?;
            tracing::debug!(%peer, "accepted RPC connection");
            let manager = Arc::clone(&self.manager);
            tokio::spawn(async move {
                handle_connection(stream, manager).await;
                tracing::debug!(%peer, "RPC connection closed");
            });
        }
    }
}

/// Read framed requests from one client until it disconnects or violates
/// the protocol. A dropped connection abandons only the in-flight response;
/// storage writes that already committed stay committed.
async fn handle_connection(stream: TcpStream, manager: Arc<dyn EotsManager>) {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    loop {
        let mut len_buf = [0u8; 4];
        if reader.read_exact(&mut len_buf).await.is_err() {
            break;
        }
        let body_len = u32::from_be_bytes(len_buf) as usize;
        if body_len == 0 || body_len > MAX_FRAME_SIZE {
            tracing::warn!(body_len, "oversized or empty RPC frame, dropping connection");
            break;
        }
        let mut body = vec![0u8; body_len];
        if reader.read_exact(&mut body).await.is_err() {
            break;
        }

        let response = match bincode::deserialize::<RpcRequest>(&body) {
            Ok(request) => dispatch(Arc::clone(&manager), request).await,
            Err(e) => RpcResponse::Error(WireError::InvalidArgument {
                reason: format!("malformed request: {e}"),
            }),
        };

        let bytes = match bincode::serialize(&response) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(error = %e, "failed to encode RPC response");
                break;
            }
        };
        let len_bytes = (bytes.len() as u32).to_be_bytes();
        if write_half.write_all(&len_bytes).await.is_err()
            || write_half.write_all(&bytes).await.is_err()
            || write_half.flush().await.is_err()
        {
            break;
        }
    }
}

async fn dispatch(manager: Arc<dyn EotsManager>, request: RpcRequest) -> RpcResponse {
    if matches!(request, RpcRequest::Ping) {
        return RpcResponse::Pong;
    }

    // Everything else touches the KDF or storage and may block for a while.
    let result = tokio::task::spawn_blocking(move || handle_request(&*manager, request)).await;
    match result {
        Ok(response) => response,
        Err(e) => RpcResponse::Error(WireError::Storage {
            reason: format!("request handler panicked or was cancelled: {e}"),
        }),
    }
}

fn handle_request(manager: &dyn EotsManager, request: RpcRequest) -> RpcResponse {
    let result = try_handle(manager, request);
    match result {
        Ok(response) => response,
        Err(e) => RpcResponse::Error(WireError::from_error(&e)),
    }
}

fn try_handle(manager: &dyn EotsManager, request: RpcRequest) -> Result<RpcResponse, EotsError> {
    match request {
        RpcRequest::Ping => Ok(RpcResponse::Pong),

        RpcRequest::CreateKey {
            name,
            passphrase,
            hd_path,
        } => {
            let pk = manager.create_key(&name, &passphrase, &hd_path)?;
            Ok(RpcResponse::CreateKey { pk: pk.to_vec() })
        }

        RpcRequest::CreateRandomnessBatch {
            pk,
            chain_id,
            start_height,
            num,
        } => {
            let pk = parse_wire_pk(&pk)?;
            let public_nonces =
                manager.create_randomness_batch(&pk, &chain_id, start_height, num)?;
            Ok(RpcResponse::CreateRandomnessBatch { public_nonces })
        }

        RpcRequest::KeyRecord { pk, passphrase } => {
            let pk = parse_wire_pk(&pk)?;
            let record = manager.key_record(&pk, &passphrase)?;
            Ok(RpcResponse::KeyRecord {
                name: record.name,
                private_key: record.secret.as_bytes().to_vec(),
            })
        }

        RpcRequest::SignEots {
            pk,
            chain_id,
            msg,
            height,
            passphrase,
        } => {
            let pk = parse_wire_pk(&pk)?;
            let sig = manager.sign_eots(&pk, &chain_id, &msg, height, &passphrase)?;
            Ok(RpcResponse::SignEots { sig })
        }

        RpcRequest::SignSchnorr {
            pk,
            msg,
            passphrase,
        } => {
            let pk = parse_wire_pk(&pk)?;
            let sig = manager.sign_schnorr(&pk, &msg, &passphrase)?;
            Ok(RpcResponse::SignSchnorr { sig })
        }
    }
}
