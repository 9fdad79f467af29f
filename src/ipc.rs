use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex as RawMutex, channel::Channel};

use crate::config::{LINK_EVENT_QUEUE_DEPTH, NOTIFY_QUEUE_DEPTH};
use crate::delivery::NotifyTransport;
use crate::error::TransportError;
use crate::link::{LinkEvent, Outbound};
use crate::signal::ReadySignal;
use crate::telemetry::{WireFrame, WIRE_FRAME_LEN};

/// Set by the INT1 task, consumed by the telemetry task.
pub static DATA_READY: ReadySignal = ReadySignal::new();

/* link channels */
pub static LINK_TX_CH: Channel<RawMutex, Outbound, NOTIFY_QUEUE_DEPTH> = Channel::new();
pub static LINK_EVENT_CH: Channel<RawMutex, LinkEvent, LINK_EVENT_QUEUE_DEPTH> = Channel::new();

/// Notification transport backed by [`LINK_TX_CH`]. A full queue is "busy".
pub struct LinkTransport;

impl NotifyTransport for LinkTransport {
    fn send_notification(&mut self, payload: &[u8; WIRE_FRAME_LEN]) -> Result<(), TransportError> {
        LINK_TX_CH
            .try_send(Outbound::Notify(WireFrame::from_bytes(*payload)))
            .map_err(|_| TransportError::Busy)
    }
}
