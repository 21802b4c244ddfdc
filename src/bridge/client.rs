// Client side of the order bridge: submit intents, track what is still
// unconfirmed, turn authority notices into events.
//
// Rejections are silent, so an unconfirmed order is settled one of three ways:
// a confirmation for it or for any later request (requests are processed in
// order), its unit disappearing, or a timeout.
use bevy::prelude::*;
use std::collections::HashMap;

use super::wire::{self, AuthorityNotice, OrderRequest};
use super::ClientConnection;
use crate::constants::PENDING_ORDER_TIMEOUT_TICKS;
use crate::events::{OrderConfirmed, OwnershipChanged};
use crate::types::{Controllable, Order, OrderIntent, PlayerId};

/// Submitted but not yet confirmed
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingOrder {
    pub order: Order,
    pub sequence: u64,
    pub submitted_tick: u64,
}

/// The session's link to the authority
#[derive(Resource)]
pub struct OrderLink {
    connection: ClientConnection,
    next_sequence: u64,
    tick: u64,
    timeout_ticks: u64,
    pending: HashMap<Entity, PendingOrder>,
}

impl OrderLink {
    pub fn new(connection: ClientConnection) -> Self {
        Self {
            connection,
            next_sequence: 1,
            tick: 0,
            timeout_ticks: PENDING_ORDER_TIMEOUT_TICKS,
            pending: HashMap::new(),
        }
    }

    /// How many feedback ticks an order may stay unconfirmed. Networked hosts
    /// with real latency want more than the default.
    pub fn with_pending_timeout(mut self, ticks: u64) -> Self {
        self.timeout_ticks = ticks;
        self
    }

    pub fn player(&self) -> PlayerId {
        self.connection.player()
    }

    /// Send an intent to the authority exactly once. Does not wait and does
    /// not assume success; a newer submission for the same unit supersedes
    /// the pending one. Returns the sequence number used.
    pub fn submit(&mut self, intent: OrderIntent) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let request = OrderRequest { sequence, intent };
        let sent = wire::encode(&request)
            .map_err(|err| err.to_string())
            .and_then(|bytes| self.connection.send(bytes).map_err(|err| err.to_string()));

        match sent {
            Ok(()) => {
                let pending = PendingOrder {
                    order: intent.order,
                    sequence,
                    submitted_tick: self.tick,
                };
                self.pending.insert(intent.unit, pending);
            }
            Err(err) => warn!("Order #{} for unit {:?} was not sent: {}", sequence, intent.unit, err),
        }
        sequence
    }

    pub fn pending(&self, unit: Entity) -> Option<&PendingOrder> {
        self.pending.get(&unit)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// A confirmation for `sequence` settles that order and everything sent
    /// before it: earlier requests were already processed, so any of them
    /// still pending was rejected
    fn settle(&mut self, sequence: u64) {
        let before = self.pending.len();
        self.pending.retain(|_, pending| pending.sequence > sequence);
        let rejected = (before - self.pending.len()).saturating_sub(1);
        if rejected > 0 {
            debug!("{} orders before #{} were not confirmed", rejected, sequence);
        }
    }

    /// Drop bookkeeping for a unit this player no longer controls
    pub fn forget(&mut self, unit: Entity) {
        self.pending.remove(&unit);
    }

    /// Drop bookkeeping for units that no longer exist
    fn forget_missing<F>(&mut self, exists: F)
    where
        F: Fn(Entity) -> bool,
    {
        self.pending.retain(|&unit, _| exists(unit));
    }

    /// Presume orders rejected once they outlive the timeout, then advance
    fn end_tick(&mut self) {
        let (tick, timeout) = (self.tick, self.timeout_ticks);
        self.pending.retain(|unit, pending| {
            let expired = tick.saturating_sub(pending.submitted_tick) >= timeout;
            if expired {
                debug!("Order #{} for unit {:?} timed out unconfirmed", pending.sequence, unit);
            }
            !expired
        });
        self.tick += 1;
    }
}

/// System: Turn authority notices into confirmation and ownership events
pub fn receive_authority_notices(
    mut link: ResMut<OrderLink>,
    units: Query<(), With<Controllable>>,
    mut confirmed: EventWriter<OrderConfirmed>,
    mut ownership: EventWriter<OwnershipChanged>,
) {
    let frames: Vec<Vec<u8>> = link.connection.receive().collect();

    for bytes in frames {
        let notice: AuthorityNotice = match wire::decode(&bytes) {
            Ok(notice) => notice,
            Err(err) => {
                warn!("Dropping malformed authority notice: {}", err);
                continue;
            }
        };

        match notice {
            AuthorityNotice::OrderExecuted { unit, order, sequence } => {
                link.settle(sequence);
                confirmed.write(OrderConfirmed { unit, order, sequence });
            }
            AuthorityNotice::OwnershipChanged { unit, owner } => {
                if owner != Some(link.player()) {
                    link.forget(unit);
                }
                ownership.write(OwnershipChanged { unit, owner });
            }
        }
    }

    link.forget_missing(|unit| units.contains(unit));
    link.end_tick();
}
