pub mod data_ready;
pub mod link;
pub mod telemetry;

pub use data_ready::data_ready_task;
pub use link::{link_rx_task, link_tx_task};
pub use telemetry::{telemetry_task, FirmwarePipeline, SensorBus};
