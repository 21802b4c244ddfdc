// Order authority bridge - the trust boundary between a player's session and
// the simulation authority
//
// Submodules:
// - wire: serialized messages crossing the boundary
// - client: submission side (order link, pending orders, confirmations)
// - authority: validation and execution of received orders
//
// The two sides share nothing but the byte channels below. In a single-player
// build both ends live in one process; a network transport carries the same
// frames.

pub mod authority;
pub mod client;
pub mod wire;

use crossbeam_channel::{Receiver, Sender};
use thiserror::Error;

use crate::types::PlayerId;
use wire::InboundFrame;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("authority is no longer reachable")]
    Disconnected,
}

/// Client end of a connection to the authority. The connection, not the
/// client code, decides which player a frame comes from.
pub struct ClientConnection {
    player: PlayerId,
    outbound: Sender<InboundFrame>,
    notices: Receiver<Vec<u8>>,
}

impl ClientConnection {
    pub(crate) fn new(player: PlayerId, outbound: Sender<InboundFrame>, notices: Receiver<Vec<u8>>) -> Self {
        Self { player, outbound, notices }
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    /// Queue a frame for the authority. Never blocks.
    pub fn send(&self, bytes: Vec<u8>) -> Result<(), TransportError> {
        self.outbound
            .send(InboundFrame { from: self.player, bytes })
            .map_err(|_| TransportError::Disconnected)
    }

    /// Notices that arrived since the last call
    pub fn receive(&self) -> impl Iterator<Item = Vec<u8>> + '_ {
        self.notices.try_iter()
    }
}

pub use authority::{validate_and_execute, validate_order, OrderAuthority, OrderRejection};
pub use client::{OrderLink, PendingOrder};
pub use wire::{AuthorityNotice, OrderRequest, WireError};
