use defmt::*;
use embassy_executor::task;
use embassy_stm32::exti::ExtiInput;

use crate::ipc::DATA_READY;
use crate::signal::SensorTrigger;

/// Interrupt side of the pipeline: only ever raises the ready flag.
#[task]
pub async fn data_ready_task(mut int1: ExtiInput<'static>) {
    info!("Data-ready task started");
    loop {
        int1.wait_for_rising_edge().await;
        DATA_READY.on_trigger(SensorTrigger::DATA_READY_ALL);
    }
}
