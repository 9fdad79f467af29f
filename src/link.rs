//! UART framing to the BLE network co-processor.
//!
//! The co-processor owns the GATT server and the connection. Frames in both
//! directions share one layout:
//!
//! ```text
//! [0xAA, 0x55][len][seq][kind][payload: len bytes][crc16 LE]
//! ```
//!
//! The CRC (CRC-16/CCITT-FALSE) covers everything before it.

use crc16::{State, CCITT_FALSE};
use heapless::{Deque, Vec};

use crate::config::CONFIG_BUFFER_LEN;
use crate::telemetry::WireFrame;
use crate::{log_debug, log_warn};

pub const LINK_SYNC: [u8; 2] = [0xAA, 0x55];
pub const LINK_HEADER_LEN: usize = 5;
pub const LINK_MAX_PAYLOAD: usize = 32;
pub const LINK_MAX_FRAME: usize = LINK_HEADER_LEN + LINK_MAX_PAYLOAD + 2;

/// Frame kinds.
pub mod kind {
    // MCU -> radio
    pub const NOTIFY: u8 = 0x01;
    pub const CONFIG_WRITE_RSP: u8 = 0x02;
    pub const CONFIG_READ_RSP: u8 = 0x03;
    // radio -> MCU
    pub const CONNECTED: u8 = 0x80;
    pub const DISCONNECTED: u8 = 0x81;
    pub const CCC_WRITTEN: u8 = 0x82;
    pub const CONFIG_WRITE: u8 = 0x83;
    pub const CONFIG_READ: u8 = 0x84;
}

pub const STATUS_OK: u8 = 0x00;

/// Events the co-processor reports about the client.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    Connected,
    Disconnected { reason: u8 },
    CccWritten(u16),
    ConfigWrite { offset: u16, data: Vec<u8, LINK_MAX_PAYLOAD> },
    ConfigRead { offset: u16 },
}

/// Frames the MCU sends to the co-processor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outbound {
    Notify(WireFrame),
    ConfigWriteRsp { status: u8 },
    ConfigReadRsp { status: u8, data: Vec<u8, CONFIG_BUFFER_LEN> },
}

impl Outbound {
    /// Serialises into `out`, returning the frame length.
    pub fn encode(&self, seq: u8, out: &mut [u8; LINK_MAX_FRAME]) -> usize {
        let mut payload: Vec<u8, LINK_MAX_PAYLOAD> = Vec::new();
        let kind = match self {
            Outbound::Notify(frame) => {
                let _ = payload.extend_from_slice(frame.as_bytes());
                kind::NOTIFY
            }
            Outbound::ConfigWriteRsp { status } => {
                let _ = payload.push(*status);
                kind::CONFIG_WRITE_RSP
            }
            Outbound::ConfigReadRsp { status, data } => {
                let _ = payload.push(*status);
                let _ = payload.extend_from_slice(data);
                kind::CONFIG_READ_RSP
            }
        };
        write_frame(kind, seq, &payload, out)
    }
}

fn write_frame(kind: u8, seq: u8, payload: &[u8], out: &mut [u8; LINK_MAX_FRAME]) -> usize {
    let len = payload.len().min(LINK_MAX_PAYLOAD);
    out[..2].copy_from_slice(&LINK_SYNC);
    out[2] = len as u8;
    out[3] = seq;
    out[4] = kind;
    out[LINK_HEADER_LEN..LINK_HEADER_LEN + len].copy_from_slice(&payload[..len]);
    let crc_pos = LINK_HEADER_LEN + len;
    let crc = State::<CCITT_FALSE>::calculate(&out[..crc_pos]).to_le_bytes();
    out[crc_pos] = crc[0];
    out[crc_pos + 1] = crc[1];
    crc_pos + 2
}

/// Byte-at-a-time frame decoder for the receive side.
///
/// Feed bytes with [`push`](Self::push) and drain events with
/// [`poll`](Self::poll) until it returns `None`. Anything that is not a
/// well-formed frame (bad sync, oversize length, CRC mismatch, unknown kind,
/// short payload) is discarded. After a bad length or CRC the bytes following
/// the broken frame's first sync byte are scanned again, so a valid frame that
/// was swallowed by a truncated one is still decoded.
#[derive(Default)]
pub struct LinkDecoder {
    buf: Vec<u8, LINK_MAX_FRAME>,
    // Bytes not yet run through the frame state machine
    pending: Deque<u8, { 2 * LINK_MAX_FRAME }>,
}

impl LinkDecoder {
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            pending: Deque::new(),
        }
    }

    pub fn push(&mut self, byte: u8) {
        if self.pending.push_back(byte).is_err() {
            log_warn!("Link decoder backlog full, byte dropped");
        }
    }

    /// Runs queued bytes until one event is decoded or the queue is empty.
    pub fn poll(&mut self) -> Option<LinkEvent> {
        while let Some(byte) = self.pending.pop_front() {
            if let Some(event) = self.step(byte) {
                return Some(event);
            }
        }
        None
    }

    fn step(&mut self, byte: u8) -> Option<LinkEvent> {
        match self.buf.len() {
            0 if byte != LINK_SYNC[0] => return None,
            1 if byte != LINK_SYNC[1] => {
                self.buf.clear();
                if byte == LINK_SYNC[0] {
                    let _ = self.buf.push(byte);
                }
                return None;
            }
            _ => {}
        }

        // Capacity holds: the length byte is checked before the payload arrives
        let _ = self.buf.push(byte);
        if self.buf.len() == 3 && byte as usize > LINK_MAX_PAYLOAD {
            log_warn!("Link frame length {} too large, resyncing", byte);
            self.rescan();
            return None;
        }
        if self.buf.len() < LINK_HEADER_LEN {
            return None;
        }

        let len = self.buf[2] as usize;
        let crc_pos = LINK_HEADER_LEN + len;
        if self.buf.len() < crc_pos + 2 {
            return None;
        }

        let received = u16::from_le_bytes([self.buf[crc_pos], self.buf[crc_pos + 1]]);
        let calculated = State::<CCITT_FALSE>::calculate(&self.buf[..crc_pos]);
        if calculated != received {
            log_warn!("Link CRC mismatch: {:04X} vs {:04X}", calculated, received);
            self.rescan();
            return None;
        }

        let event = parse_event(self.buf[4], &self.buf[LINK_HEADER_LEN..crc_pos]);
        self.buf.clear();
        event
    }

    /// Drops the leading sync byte and queues the rest of the frame buffer
    /// ahead of any unread input.
    fn rescan(&mut self) {
        for &byte in self.buf[1..].iter().rev() {
            let _ = self.pending.push_front(byte);
        }
        self.buf.clear();
    }
}

fn parse_event(kind: u8, payload: &[u8]) -> Option<LinkEvent> {
    let u16_at = |i: usize| -> Option<u16> {
        Some(u16::from_le_bytes([*payload.get(i)?, *payload.get(i + 1)?]))
    };
    let event = match kind {
        kind::CONNECTED => Some(LinkEvent::Connected),
        kind::DISCONNECTED => payload
            .first()
            .map(|&reason| LinkEvent::Disconnected { reason }),
        kind::CCC_WRITTEN => u16_at(0).map(LinkEvent::CccWritten),
        kind::CONFIG_WRITE => u16_at(0).and_then(|offset| {
            Vec::from_slice(&payload[2..])
                .ok()
                .map(|data| LinkEvent::ConfigWrite { offset, data })
        }),
        kind::CONFIG_READ => u16_at(0).map(|offset| LinkEvent::ConfigRead { offset }),
        other => {
            log_warn!("Unknown link frame kind 0x{:02X}", other);
            return None;
        }
    };
    if event.is_none() {
        log_warn!("Short payload for link frame kind 0x{:02X}", kind);
    } else {
        log_debug!("Link frame kind 0x{:02X}, {} payload bytes", kind, payload.len());
    }
    event
}
