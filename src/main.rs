#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use {defmt_rtt as _, panic_probe as _};

use tessen_embassy::{
    config::LSM6DSL_I2C_ADDR,
    drivers::{I2cRegisterBus, Lsm6dsl, SensorConfig},
    ipc::{LinkTransport, DATA_READY},
    tasks::{data_ready_task, link_rx_task, link_tx_task, telemetry_task},
    Board, Pipeline,
};

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Starting tessen-embassy motion telemetry");
    let board = match Board::init() {
        Ok(board) => board,
        Err(e) => {
            error!("Board init failed: {:?}", e);
            return;
        }
    };

    spawner.spawn(link_rx_task(board.radio_rx)).unwrap();
    spawner.spawn(link_tx_task(board.radio_tx)).unwrap();
    info!("Link tasks spawned");

    let mut imu = Lsm6dsl::new(I2cRegisterBus::new(board.imu_i2c, LSM6DSL_I2C_ADDR));
    match imu.activate(SensorConfig::DEFAULT).await {
        Ok(()) => match imu.arm_data_ready().await {
            Ok(()) => {
                spawner.spawn(data_ready_task(board.imu_int1)).unwrap();
                info!("Data-ready trigger armed");
            }
            Err(e) => error!("Data-ready routing failed: {:?}", e),
        },
        // Keep heartbeat and link alive; the sensor just never reports ready
        Err(e) => error!("LSM6DSL activation failed: {:?}, running unsampled", e),
    }

    let pipeline = Pipeline::new(&DATA_READY, imu, LinkTransport, board.led);
    spawner.spawn(telemetry_task(pipeline)).unwrap();
    info!("Telemetry task spawned");
}
