//! Subscription-gated notification delivery.
//!
//! Telemetry is fire-and-forget: frames produced while nobody is subscribed are
//! dropped, and a frame the transport refuses is not retried.

use crate::config::DELIVERY_LOG_EVERY;
use crate::error::{DeliveryError, TransportError};
use crate::telemetry::{WireFrame, WIRE_FRAME_LEN};
use crate::{log_debug, log_info, log_warn};

/// Client Characteristic Configuration value for "notifications enabled".
pub const CCC_NOTIFY: u16 = 0x0001;

/// Outbound side of the wireless link.
pub trait NotifyTransport {
    /// Queues one notification without blocking.
    fn send_notification(&mut self, payload: &[u8; WIRE_FRAME_LEN]) -> Result<(), TransportError>;
}

impl<T: NotifyTransport + ?Sized> NotifyTransport for &mut T {
    fn send_notification(&mut self, payload: &[u8; WIRE_FRAME_LEN]) -> Result<(), TransportError> {
        (**self).send_notification(payload)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Delivery {
    Sent,
    Dropped,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeliveryStats {
    pub sent: u32,
    pub dropped: u32,
    pub busy: u32,
}

pub struct DeliveryGate<T> {
    transport: T,
    subscribed: bool,
    stats: DeliveryStats,
}

impl<T: NotifyTransport> DeliveryGate<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            subscribed: false,
            stats: DeliveryStats::default(),
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    pub fn stats(&self) -> DeliveryStats {
        self.stats
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Only the transport's event path calls this, never the acquisition path.
    pub fn on_subscription_changed(&mut self, enabled: bool) {
        if enabled != self.subscribed {
            log_info!(
                "Telemetry notifications {}",
                if enabled { "enabled" } else { "disabled" }
            );
        }
        self.subscribed = enabled;
    }

    /// Maps a CCC write to a subscription: only [`CCC_NOTIFY`] enables.
    pub fn on_ccc_written(&mut self, value: u16) {
        log_debug!("CCC written: 0x{:04X}", value);
        self.on_subscription_changed(value == CCC_NOTIFY);
    }

    /// Explicit disconnect from the link. The only event that treats the
    /// connection as lost.
    pub fn on_disconnected(&mut self) {
        self.on_subscription_changed(false);
    }

    /// Sends `frame` if a client is subscribed, otherwise drops it.
    ///
    /// A transport refusal is reported as [`DeliveryError::TransportBusy`] and
    /// leaves the subscription untouched.
    pub fn deliver(&mut self, frame: WireFrame) -> Result<Delivery, DeliveryError> {
        if !self.subscribed {
            self.stats.dropped = self.stats.dropped.wrapping_add(1);
            if self.stats.dropped % DELIVERY_LOG_EVERY == 0 {
                log_debug!("Notifications disabled, {} frames dropped", self.stats.dropped);
            }
            return Ok(Delivery::Dropped);
        }

        match self.transport.send_notification(frame.as_bytes()) {
            Ok(()) => {
                self.stats.sent = self.stats.sent.wrapping_add(1);
                if self.stats.sent % DELIVERY_LOG_EVERY == 0 {
                    log_debug!("{} notifications sent", self.stats.sent);
                }
                Ok(Delivery::Sent)
            }
            Err(e) => {
                self.stats.busy = self.stats.busy.wrapping_add(1);
                log_warn!("Notification failed: {:?} (busy #{})", e, self.stats.busy);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;

    fn frame(tag: u8) -> WireFrame {
        WireFrame::from_bytes([tag; 14])
    }

    #[test]
    fn unsubscribed_never_touches_transport() {
        let mut gate = DeliveryGate::new(MockTransport::default());
        for i in 0..20 {
            assert_eq!(gate.deliver(frame(i)), Ok(Delivery::Dropped));
        }
        assert!(gate.transport().sent().is_empty());
        assert_eq!(gate.transport().attempts(), 0);
        assert_eq!(gate.stats().dropped, 20);
    }

    #[test]
    fn subscribed_sends_full_fourteen_bytes() {
        let mut gate = DeliveryGate::new(MockTransport::default());
        gate.on_subscription_changed(true);
        assert_eq!(gate.deliver(frame(7)), Ok(Delivery::Sent));
        assert_eq!(gate.transport().sent(), &[[7u8; 14]]);
    }

    #[test]
    fn transport_sees_frame_bytes_in_order() {
        let mut bytes = [0u8; WIRE_FRAME_LEN];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = 0xA0 | i as u8;
        }
        let mut gate = DeliveryGate::new(MockTransport::default());
        gate.on_subscription_changed(true);
        assert_eq!(gate.deliver(WireFrame::from_bytes(bytes)), Ok(Delivery::Sent));
        assert_eq!(gate.transport().sent(), &[bytes]);
    }

    #[test]
    fn ccc_only_notify_value_enables() {
        let mut gate = DeliveryGate::new(MockTransport::default());
        gate.on_ccc_written(0x0001);
        assert!(gate.is_subscribed());
        for value in [0x0000, 0x0002, 0x0003, 0xFFFF] {
            gate.on_ccc_written(0x0001);
            gate.on_ccc_written(value);
            assert!(!gate.is_subscribed(), "0x{:04X}", value);
        }
    }

    #[test]
    fn busy_transport_keeps_subscription() {
        let mut gate = DeliveryGate::new(MockTransport::default().busy_for(1));
        gate.on_subscription_changed(true);
        assert_eq!(gate.deliver(frame(1)), Err(DeliveryError::TransportBusy));
        assert!(gate.is_subscribed());
        assert_eq!(gate.deliver(frame(2)), Ok(Delivery::Sent));
        assert_eq!(gate.transport().sent(), &[[2u8; 14]]);
        assert_eq!(gate.stats().busy, 1);
    }

    #[test]
    fn disconnect_resets_subscription() {
        let mut gate = DeliveryGate::new(MockTransport::default());
        gate.on_ccc_written(CCC_NOTIFY);
        gate.on_disconnected();
        assert!(!gate.is_subscribed());
        assert_eq!(gate.deliver(frame(3)), Ok(Delivery::Dropped));
        assert_eq!(gate.transport().attempts(), 0);
    }

    #[test]
    fn unsubscribe_mid_stream_stops_next_frame() {
        let mut gate = DeliveryGate::new(MockTransport::default());
        gate.on_subscription_changed(true);
        gate.deliver(frame(1)).unwrap();
        gate.deliver(frame(2)).unwrap();
        gate.on_subscription_changed(false);
        gate.deliver(frame(3)).unwrap();
        assert_eq!(gate.transport().sent(), &[[1u8; 14], [2u8; 14]]);
    }
}
