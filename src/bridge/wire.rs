// Wire format between the client and the authority.
// Everything crossing the trust boundary goes through encode/decode here.
use bevy::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Order, OrderIntent, PlayerId};

/// Client -> authority
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Per-connection counter, increases with every submission
    pub sequence: u64,
    pub intent: OrderIntent,
}

/// Authority -> client
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum AuthorityNotice {
    OrderExecuted {
        unit: Entity,
        order: Order,
        sequence: u64,
    },
    OwnershipChanged {
        unit: Entity,
        owner: Option<PlayerId>,
    },
}

/// A request as the authority receives it. `from` is stamped by the
/// connection the bytes arrived on, never taken from the payload.
#[derive(Clone, Debug)]
pub struct InboundFrame {
    pub from: PlayerId,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum WireError {
    #[error("failed to encode message: {0}")]
    Encode(#[source] bincode::Error),
    #[error("failed to decode message: {0}")]
    Decode(#[source] bincode::Error),
}

pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, WireError> {
    bincode::serialize(message).map_err(WireError::Encode)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, WireError> {
    bincode::deserialize(bytes).map_err(WireError::Decode)
}
