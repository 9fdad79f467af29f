//! Error types for the acquisition and telemetry pipeline.

/// Register bus failure, reduced to what the driver can act on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// Device did not acknowledge its address or a data byte.
    Nack,
    /// Arbitration lost or bus fault.
    Bus,
    /// Overrun or other controller-level failure.
    Other,
}

/// Which activation write failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActivationStage {
    /// Accelerometer control (`CTRL1_XL`).
    AccelControl,
    /// Gyroscope control (`CTRL2_G`).
    GyroControl,
    /// General control (`CTRL3_C`).
    GeneralControl,
}

/// Measurement channel that violated its physical range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleChannel {
    Accel,
    Gyro,
    Temperature,
}

/// Sensor driver error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError {
    /// Register read/write failed; the caller may retry on the next ready event.
    BusError(BusError),
    /// One of the activation writes failed. The sensor is in an undefined mode.
    ActivationFailed { stage: ActivationStage },
    /// Converted reading outside the sensor's physical range.
    OutOfRange(SampleChannel),
}

impl From<BusError> for DriverError {
    fn from(e: BusError) -> Self {
        DriverError::BusError(e)
    }
}

/// Failure reported by the notification transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Outbound buffer full; try again on a later cycle.
    Busy,
}

/// Delivery gate error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeliveryError {
    /// The transport refused the notification. Not a connection-state change.
    TransportBusy,
}

impl From<TransportError> for DeliveryError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Busy => DeliveryError::TransportBusy,
        }
    }
}

/// Configuration characteristic error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `offset + len` runs past the end of the buffer.
    InvalidOffset,
}

impl ConfigError {
    /// ATT protocol error code reported back to the client.
    pub const fn att_code(self) -> u8 {
        match self {
            ConfigError::InvalidOffset => 0x07,
        }
    }
}
