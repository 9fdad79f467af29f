pub mod bus;
pub mod imu;

pub use bus::{I2cRegisterBus, RegisterBus};
pub use imu::{Lsm6dsl, RawSample, SampleSource, SensorConfig, Vector3};
