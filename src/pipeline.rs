//! Acquisition-to-telemetry loop.
//!
//! One [`Pipeline::tick`] per poll period: heartbeat first, so the indicator
//! keeps blinking whatever the sensor does, then at most one fetch-encode-deliver
//! cycle if the data-ready signal is pending.

use heapless::Vec;

use crate::config::{CONFIG_BUFFER_LEN, HEARTBEAT_TOGGLE_TICKS, STATS_REPORT_TICKS};
use crate::control::ConfigBuffer;
use crate::delivery::{Delivery, DeliveryGate, DeliveryStats, NotifyTransport};
use crate::drivers::imu::SampleSource;
use crate::error::{DeliveryError, DriverError};
use crate::heartbeat::{Heartbeat, Indicator};
use crate::link::{LinkEvent, Outbound, STATUS_OK};
use crate::signal::ReadySignal;
use crate::telemetry;
use crate::{log_debug, log_info, log_warn};

/// Result of one acquisition step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepOutcome {
    /// No data-ready was pending.
    Idle,
    Delivered,
    /// Sampled, but nobody is subscribed.
    Dropped,
    FetchFailed(DriverError),
    DeliveryFailed(DeliveryError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PipelineStats {
    pub ticks: u32,
    pub samples: u32,
    pub fetch_errors: u32,
    pub delivery: DeliveryStats,
}

pub struct Pipeline<'a, S, T, L> {
    ready: &'a ReadySignal,
    sensor: S,
    gate: DeliveryGate<T>,
    config: ConfigBuffer,
    heartbeat: Heartbeat,
    indicator: L,
    ticks: u32,
    samples: u32,
    fetch_errors: u32,
}

impl<'a, S, T, L> Pipeline<'a, S, T, L>
where
    S: SampleSource,
    T: NotifyTransport,
    L: Indicator,
{
    pub fn new(ready: &'a ReadySignal, sensor: S, transport: T, indicator: L) -> Self {
        Self {
            ready,
            sensor,
            gate: DeliveryGate::new(transport),
            config: ConfigBuffer::new(),
            heartbeat: Heartbeat::new(HEARTBEAT_TOGGLE_TICKS),
            indicator,
            ticks: 0,
            samples: 0,
            fetch_errors: 0,
        }
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn gate(&self) -> &DeliveryGate<T> {
        &self.gate
    }

    pub fn config(&self) -> &ConfigBuffer {
        &self.config
    }

    pub fn indicator(&self) -> &L {
        &self.indicator
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            ticks: self.ticks,
            samples: self.samples,
            fetch_errors: self.fetch_errors,
            delivery: self.gate.stats(),
        }
    }

    /// Consumes a pending data-ready and runs one fetch-encode-deliver cycle.
    ///
    /// The signal is cleared before the fetch, so an interrupt landing during
    /// the fetch is kept for the next step. A failed fetch is not retried here.
    pub async fn acquisition_step(&mut self) -> StepOutcome {
        if !self.ready.take() {
            return StepOutcome::Idle;
        }

        let sample = match self.sensor.fetch_sample().await {
            Ok(sample) => sample,
            Err(e) => {
                self.fetch_errors = self.fetch_errors.wrapping_add(1);
                log_warn!("Sample fetch failed: {:?}", e);
                return StepOutcome::FetchFailed(e);
            }
        };
        self.samples = self.samples.wrapping_add(1);

        let frame = telemetry::encode(&sample);
        match self.gate.deliver(frame) {
            Ok(Delivery::Sent) => StepOutcome::Delivered,
            Ok(Delivery::Dropped) => StepOutcome::Dropped,
            Err(e) => StepOutcome::DeliveryFailed(e),
        }
    }

    pub fn heartbeat_step(&mut self) {
        if let Some(level) = self.heartbeat.tick() {
            self.indicator.set_level(level);
        }
    }

    pub async fn tick(&mut self) -> StepOutcome {
        self.heartbeat_step();
        let outcome = self.acquisition_step().await;

        self.ticks = self.ticks.wrapping_add(1);
        if self.ticks % STATS_REPORT_TICKS == 0 {
            let s = self.stats();
            log_info!(
                "Stats: ticks={} samples={} fetch_errors={} sent={} dropped={} busy={}",
                s.ticks,
                s.samples,
                s.fetch_errors,
                s.delivery.sent,
                s.delivery.dropped,
                s.delivery.busy
            );
        }
        outcome
    }

    /// Applies an event from the radio. Config requests produce a response.
    pub fn handle_link_event(&mut self, event: LinkEvent) -> Option<Outbound> {
        match event {
            LinkEvent::Connected => {
                log_info!("Client connected");
                None
            }
            LinkEvent::Disconnected { reason } => {
                log_info!("Client disconnected (reason 0x{:02X})", reason);
                self.gate.on_disconnected();
                None
            }
            LinkEvent::CccWritten(value) => {
                self.gate.on_ccc_written(value);
                None
            }
            LinkEvent::ConfigWrite { offset, data } => {
                let status = match self.config.write(offset as usize, &data) {
                    Ok(n) => {
                        log_debug!("Config write: {} bytes at {}", n, offset);
                        STATUS_OK
                    }
                    Err(e) => e.att_code(),
                };
                Some(Outbound::ConfigWriteRsp { status })
            }
            LinkEvent::ConfigRead { offset } => {
                let mut buf = [0u8; CONFIG_BUFFER_LEN];
                let (status, data) = match self.config.read(offset as usize, &mut buf) {
                    Ok(n) => (STATUS_OK, Vec::from_slice(&buf[..n]).unwrap_or_default()),
                    Err(e) => {
                        log_warn!("Config read rejected: offset {}", offset);
                        (e.att_code(), Vec::new())
                    }
                };
                Some(Outbound::ConfigReadRsp { status, data })
            }
        }
    }
}
