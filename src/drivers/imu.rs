use core::f32::consts::PI;

use crate::config::{CTRL1_XL_104HZ_2G, CTRL2_G_104HZ_250DPS, CTRL3_C_DEFAULT};
use crate::drivers::bus::RegisterBus;
use crate::error::{ActivationStage, DriverError, SampleChannel};
use crate::{log_debug, log_error, log_info};

// LSM6DSL Register Addresses
const LSM6DSL_DRDY_PULSE_CFG_G: u8 = 0x0B;
const LSM6DSL_INT1_CTRL: u8 = 0x0D;
const LSM6DSL_CTRL1_XL: u8 = 0x10;
const LSM6DSL_CTRL2_G: u8 = 0x11;
const LSM6DSL_CTRL3_C: u8 = 0x12;
// OUT_TEMP_L..OUTZ_H_XL: temperature, gyro xyz, accel xyz, all little-endian
const LSM6DSL_OUT_TEMP_L: u8 = 0x20;
const LSM6DSL_OUTPUT_BLOCK_LEN: usize = 14;

// Data-ready as a ~75 µs pulse per sample instead of a level held until read
const DRDY_PULSED: u8 = 1 << 7;
const INT1_DRDY_XL: u8 = 1 << 0;
const INT1_DRDY_G: u8 = 1 << 1;

const STANDARD_GRAVITY: f32 = 9.80665;
const TEMP_LSB_PER_DEG_C: f32 = 256.0;
const TEMP_OFFSET_DEG_C: f32 = 25.0;

// Physical range of a valid reading, in the units the driver reports
pub const ACCEL_LIMIT_MS2: f32 = 20.0 * STANDARD_GRAVITY;
pub const GYRO_LIMIT_RADS: f32 = 2000.0 * PI / 180.0;
pub const TEMP_MIN_DEG_C: f32 = -40.0;
pub const TEMP_MAX_DEG_C: f32 = 85.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    fn within(&self, limit: f32) -> bool {
        let range = -limit..=limit;
        range.contains(&self.x) && range.contains(&self.y) && range.contains(&self.z)
    }
}

/// One reading: acceleration in m/s², angular rate in rad/s, die temperature in °C.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample {
    pub accel: Vector3,
    pub gyro: Vector3,
    pub temperature: f32,
    pub index: u32,
}

impl RawSample {
    /// Checks the sensor's physical range. Anything outside is a driver or
    /// bus fault and is rejected rather than clamped.
    pub fn validate(&self) -> Result<(), DriverError> {
        if !self.accel.within(ACCEL_LIMIT_MS2) {
            return Err(DriverError::OutOfRange(SampleChannel::Accel));
        }
        if !self.gyro.within(GYRO_LIMIT_RADS) {
            return Err(DriverError::OutOfRange(SampleChannel::Gyro));
        }
        if !(TEMP_MIN_DEG_C..=TEMP_MAX_DEG_C).contains(&self.temperature) {
            return Err(DriverError::OutOfRange(SampleChannel::Temperature));
        }
        Ok(())
    }
}

/// Accelerometer full scale, `CTRL1_XL[3:2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelRange {
    G2,
    G4,
    G8,
    G16,
}

impl AccelRange {
    pub const fn from_ctrl1_xl(value: u8) -> Self {
        match (value >> 2) & 0x03 {
            0b00 => AccelRange::G2,
            0b01 => AccelRange::G16,
            0b10 => AccelRange::G4,
            _ => AccelRange::G8,
        }
    }

    pub const fn mg_per_lsb(self) -> f32 {
        match self {
            AccelRange::G2 => 0.061,
            AccelRange::G4 => 0.122,
            AccelRange::G8 => 0.244,
            AccelRange::G16 => 0.488,
        }
    }
}

/// Gyroscope full scale, `CTRL2_G[3:1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GyroRange {
    Dps125,
    Dps250,
    Dps500,
    Dps1000,
    Dps2000,
}

impl GyroRange {
    pub const fn from_ctrl2_g(value: u8) -> Self {
        // FS_125 overrides FS_G
        if value & 0x02 != 0 {
            return GyroRange::Dps125;
        }
        match (value >> 2) & 0x03 {
            0b00 => GyroRange::Dps250,
            0b01 => GyroRange::Dps500,
            0b10 => GyroRange::Dps1000,
            _ => GyroRange::Dps2000,
        }
    }

    pub const fn mdps_per_lsb(self) -> f32 {
        match self {
            GyroRange::Dps125 => 4.375,
            GyroRange::Dps250 => 8.75,
            GyroRange::Dps500 => 17.5,
            GyroRange::Dps1000 => 35.0,
            GyroRange::Dps2000 => 70.0,
        }
    }
}

/// Operating mode registers, written once at activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorConfig {
    pub accel_ctrl: u8,
    pub gyro_ctrl: u8,
    pub general_ctrl: u8,
}

impl SensorConfig {
    pub const DEFAULT: Self = Self {
        accel_ctrl: CTRL1_XL_104HZ_2G,
        gyro_ctrl: CTRL2_G_104HZ_250DPS,
        general_ctrl: CTRL3_C_DEFAULT,
    };

    pub const fn accel_range(&self) -> AccelRange {
        AccelRange::from_ctrl1_xl(self.accel_ctrl)
    }

    pub const fn gyro_range(&self) -> GyroRange {
        GyroRange::from_ctrl2_g(self.gyro_ctrl)
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Anything that can hand the acquisition loop a fresh sample.
#[allow(async_fn_in_trait)]
pub trait SampleSource {
    async fn fetch_sample(&mut self) -> Result<RawSample, DriverError>;
}

pub struct Lsm6dsl<B> {
    bus: B,
    config: SensorConfig,
    next_index: u32,
}

impl<B: RegisterBus> Lsm6dsl<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            config: SensorConfig::DEFAULT,
            next_index: 1,
        }
    }

    pub fn config(&self) -> SensorConfig {
        self.config
    }

    pub fn release(self) -> B {
        self.bus
    }

    /// Writes accel control, gyro control and general control, in that order.
    ///
    /// Every write is attempted even after a failure; the first failing stage
    /// is reported. There is no rollback and no read-back, so an error leaves
    /// the sensor in an undefined operating mode.
    pub async fn activate(&mut self, config: SensorConfig) -> Result<(), DriverError> {
        log_info!("Activating LSM6DSL...");
        let writes = [
            (ActivationStage::AccelControl, LSM6DSL_CTRL1_XL, config.accel_ctrl),
            (ActivationStage::GyroControl, LSM6DSL_CTRL2_G, config.gyro_ctrl),
            (ActivationStage::GeneralControl, LSM6DSL_CTRL3_C, config.general_ctrl),
        ];

        let mut first_failure = None;
        for (stage, reg, value) in writes {
            if let Err(e) = self.bus.write_register(reg, value).await {
                log_error!(
                    "Activation write {:?} (reg 0x{:02X} = 0x{:02X}) failed: {:?}",
                    stage,
                    reg,
                    value,
                    e
                );
                first_failure.get_or_insert(stage);
            }
        }
        self.config = config;

        match first_failure {
            Some(stage) => Err(DriverError::ActivationFailed { stage }),
            None => {
                log_info!(
                    "LSM6DSL active: accel {:?}, gyro {:?}",
                    config.accel_range(),
                    config.gyro_range()
                );
                Ok(())
            }
        }
    }

    /// Routes accel and gyro data-ready to INT1 in pulsed mode.
    ///
    /// Latched mode holds INT1 high until the outputs are read, so a failed
    /// fetch would leave no further rising edge. Pulsed mode gives one edge per
    /// new sample whether or not the previous one was read.
    pub async fn arm_data_ready(&mut self) -> Result<(), DriverError> {
        self.bus
            .write_register(LSM6DSL_DRDY_PULSE_CFG_G, DRDY_PULSED)
            .await?;
        self.bus
            .write_register(LSM6DSL_INT1_CTRL, INT1_DRDY_XL | INT1_DRDY_G)
            .await?;
        log_debug!("Data-ready routed to INT1");
        Ok(())
    }

    /// One burst read of temperature, angular rate and acceleration.
    pub async fn fetch_sample(&mut self) -> Result<RawSample, DriverError> {
        let mut raw = [0u8; LSM6DSL_OUTPUT_BLOCK_LEN];
        self.bus.read_registers(LSM6DSL_OUT_TEMP_L, &mut raw).await?;

        let word = |i: usize| i16::from_le_bytes([raw[i], raw[i + 1]]) as f32;

        let accel_scale = self.config.accel_range().mg_per_lsb() / 1000.0 * STANDARD_GRAVITY;
        let gyro_scale = self.config.gyro_range().mdps_per_lsb() / 1000.0 * PI / 180.0;

        let sample = RawSample {
            temperature: word(0) / TEMP_LSB_PER_DEG_C + TEMP_OFFSET_DEG_C,
            gyro: Vector3::new(word(2) * gyro_scale, word(4) * gyro_scale, word(6) * gyro_scale),
            accel: Vector3::new(
                word(8) * accel_scale,
                word(10) * accel_scale,
                word(12) * accel_scale,
            ),
            index: self.next_index,
        };
        sample.validate()?;

        // Only successful fetches consume an index
        self.next_index = self.next_index.wrapping_add(1);
        Ok(sample)
    }
}

impl<B: RegisterBus> SampleSource for Lsm6dsl<B> {
    async fn fetch_sample(&mut self) -> Result<RawSample, DriverError> {
        Lsm6dsl::fetch_sample(self).await
    }
}
