// Authority side of the order bridge.
// Every request is re-validated here against authoritative state, regardless
// of what the client already checked. Failed requests are dropped whole.
use bevy::prelude::*;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::collections::HashMap;
use thiserror::Error;

use super::wire::{self, AuthorityNotice, InboundFrame, OrderRequest};
use super::ClientConnection;
use crate::events::{OrderIssued, TransferOwnership};
use crate::selection::filter::{OwnershipPolicy, SelectabilityFilter};
use crate::types::{ActiveOrder, Controllable, Order, OrderIntent, PlayerId, UnitCapabilities};

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum OrderRejection {
    #[error("unit {0:?} does not exist")]
    UnknownUnit(Entity),
    #[error("{player} does not control unit {unit:?}")]
    NotOwner { player: PlayerId, unit: Entity },
    #[error("unit {0:?} cannot move")]
    CannotMove(Entity),
    #[error("move destination {0} is not a finite point")]
    InvalidDestination(Vec3),
    #[error("unit {0:?} cannot attack")]
    CannotAttack(Entity),
    #[error("attack target {0:?} does not exist")]
    UnknownTarget(Entity),
    #[error("{target:?} is not a valid attack target for {player}")]
    InvalidTarget { player: PlayerId, target: Entity },
}

/// Receives order frames from every connected client and mirrors notices back.
/// Holds its own copy of the ownership rules; client-side filtering is never
/// trusted.
#[derive(Resource)]
pub struct OrderAuthority {
    inbound_tx: Sender<InboundFrame>,
    inbound: Receiver<InboundFrame>,
    observers: HashMap<PlayerId, Sender<Vec<u8>>>,
    rules: SelectabilityFilter,
}

impl Default for OrderAuthority {
    fn default() -> Self {
        Self::with_policy(SelectabilityFilter::default())
    }
}

impl OrderAuthority {
    pub fn with_policy(rules: SelectabilityFilter) -> Self {
        let (inbound_tx, inbound) = unbounded();
        Self {
            inbound_tx,
            inbound,
            observers: HashMap::new(),
            rules,
        }
    }

    /// Swap the ownership rules used to validate attack targets
    pub fn set_policy(&mut self, policy: impl OwnershipPolicy) {
        self.rules = SelectabilityFilter::new(policy);
    }

    pub fn rules(&self) -> &SelectabilityFilter {
        &self.rules
    }

    /// Open a connection for `player`. Frames sent through it are stamped
    /// with that player; a later connection for the same player replaces the
    /// notice route of the earlier one.
    pub fn connect(&mut self, player: PlayerId) -> ClientConnection {
        let (notice_tx, notice_rx) = unbounded();
        self.observers.insert(player, notice_tx);
        info!("Player {} connected to order authority", player);
        ClientConnection::new(player, self.inbound_tx.clone(), notice_rx)
    }

    /// Send a notice to one player. Disconnected observers are forgotten.
    pub fn notify(&mut self, player: PlayerId, notice: &AuthorityNotice) {
        let Some(observer) = self.observers.get(&player) else { return };

        let bytes = match wire::encode(notice) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("Dropping notice for {}: {}", player, err);
                return;
            }
        };

        if observer.send(bytes).is_err() {
            debug!("Player {} stopped listening for notices", player);
            self.observers.remove(&player);
        }
    }

    /// Frames received since the last tick, in arrival order
    fn drain(&self) -> Vec<InboundFrame> {
        self.inbound.try_iter().collect()
    }
}

/// Independent re-check of an intent against authoritative state.
/// `lookup` returns the current state of an entity, None if it is gone.
pub fn validate_order<F>(
    intent: &OrderIntent,
    from: PlayerId,
    rules: &SelectabilityFilter,
    lookup: F,
) -> Result<(), OrderRejection>
where
    F: Fn(Entity) -> Option<Controllable>,
{
    let unit = lookup(intent.unit).ok_or(OrderRejection::UnknownUnit(intent.unit))?;
    if !unit.is_owned_by(from) {
        return Err(OrderRejection::NotOwner { player: from, unit: intent.unit });
    }

    match intent.order {
        Order::Move { destination } => {
            if !unit.can(UnitCapabilities::CAN_MOVE) {
                return Err(OrderRejection::CannotMove(intent.unit));
            }
            if !destination.is_finite() {
                return Err(OrderRejection::InvalidDestination(destination));
            }
        }
        Order::Attack { target } => {
            if !unit.can(UnitCapabilities::CAN_ATTACK) {
                return Err(OrderRejection::CannotAttack(intent.unit));
            }
            let victim = lookup(target).ok_or(OrderRejection::UnknownTarget(target))?;
            if target == intent.unit || !rules.is_attack_target(Some(&victim), from) {
                return Err(OrderRejection::InvalidTarget { player: from, target });
            }
        }
        Order::Stop => {}
    }

    Ok(())
}

/// Validate a request and, if it passes, make it the unit's active order.
/// The newest validated order for a unit always replaces the previous one.
pub fn validate_and_execute(
    request: &OrderRequest,
    from: PlayerId,
    rules: &SelectabilityFilter,
    units: &Query<&Controllable>,
    orders: &mut Query<&mut ActiveOrder>,
) -> Result<OrderIssued, OrderRejection> {
    let intent = request.intent;
    validate_order(&intent, from, rules, |entity| units.get(entity).ok().copied())?;

    let mut active = orders
        .get_mut(intent.unit)
        .map_err(|_| OrderRejection::UnknownUnit(intent.unit))?;
    *active = ActiveOrder {
        order: Some(intent.order),
        sequence: request.sequence,
        issued_by: Some(from),
    };

    Ok(OrderIssued {
        unit: intent.unit,
        order: intent.order,
        issued_by: from,
        sequence: request.sequence,
    })
}

/// System: Apply queued ownership transfers and notify the old and new owners
pub fn ownership_transfer_system(
    mut requests: EventReader<TransferOwnership>,
    mut units: Query<&mut Controllable>,
    mut authority: ResMut<OrderAuthority>,
) {
    for request in requests.read() {
        let Ok(mut unit) = units.get_mut(request.unit) else {
            debug!("Ignoring ownership transfer of missing unit {:?}", request.unit);
            continue;
        };

        let previous = unit.owner;
        if previous == request.new_owner {
            continue;
        }
        unit.owner = request.new_owner;

        info!(
            "Unit {:?} transferred from {:?} to {:?}",
            request.unit, previous, request.new_owner
        );

        let notice = AuthorityNotice::OwnershipChanged {
            unit: request.unit,
            owner: request.new_owner,
        };
        for player in [previous, request.new_owner].into_iter().flatten() {
            authority.notify(player, &notice);
        }
    }
}

/// System: Validate and execute every order request received since last tick
pub fn order_authority_system(
    mut authority: ResMut<OrderAuthority>,
    units: Query<&Controllable>,
    mut orders: Query<&mut ActiveOrder>,
    mut issued: EventWriter<OrderIssued>,
) {
    for frame in authority.drain() {
        let request: OrderRequest = match wire::decode(&frame.bytes) {
            Ok(request) => request,
            Err(err) => {
                warn!("Dropping malformed order frame from {}: {}", frame.from, err);
                continue;
            }
        };

        match validate_and_execute(&request, frame.from, &authority.rules, &units, &mut orders) {
            Ok(event) => {
                debug!(
                    "Executed {:?} order #{} for unit {:?} from {}",
                    event.order.kind(),
                    event.sequence,
                    event.unit,
                    event.issued_by
                );
                authority.notify(
                    frame.from,
                    &AuthorityNotice::OrderExecuted {
                        unit: event.unit,
                        order: event.order,
                        sequence: event.sequence,
                    },
                );
                issued.write(event);
            }
            Err(rejection) => {
                debug!("Rejected order #{} from {}: {}", request.sequence, frame.from, rejection);
            }
        }
    }
}
