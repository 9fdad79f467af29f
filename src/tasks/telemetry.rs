use defmt::*;
use embassy_executor::task;
use embassy_stm32::gpio::Output;
use embassy_stm32::i2c::I2c;
use embassy_stm32::mode::Async;
use embassy_time::{Duration, Ticker};

use crate::config::SENSOR_POLL_INTERVAL_MS;
use crate::drivers::{I2cRegisterBus, Lsm6dsl};
use crate::ipc::{LinkTransport, LINK_EVENT_CH, LINK_TX_CH};
use crate::pipeline::Pipeline;

pub type SensorBus = I2cRegisterBus<I2c<'static, Async>>;
pub type FirmwarePipeline = Pipeline<'static, Lsm6dsl<SensorBus>, LinkTransport, Output<'static>>;

#[task]
pub async fn telemetry_task(mut pipeline: FirmwarePipeline) {
    info!(
        "Telemetry task started - polling every {}ms",
        SENSOR_POLL_INTERVAL_MS
    );
    let mut ticker = Ticker::every(Duration::from_millis(SENSOR_POLL_INTERVAL_MS));

    loop {
        ticker.next().await;

        // Subscription and config changes land before this cycle's sample
        while let Ok(event) = LINK_EVENT_CH.try_receive() {
            if let Some(reply) = pipeline.handle_link_event(event) {
                if LINK_TX_CH.try_send(reply).is_err() {
                    warn!("Link TX queue full, config response dropped");
                }
            }
        }

        pipeline.tick().await;
    }
}
