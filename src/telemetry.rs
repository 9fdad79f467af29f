//! 14-byte telemetry frame.
//!
//! Seven little-endian `i16` fixed-point fields, in this order:
//!
//! | offset | field   | scale |
//! |--------|---------|-------|
//! | 0      | accel_x | 1000  |
//! | 2      | accel_y | 1000  |
//! | 4      | accel_z | 1000  |
//! | 6      | gyro_x  | 1000  |
//! | 8      | gyro_y  | 1000  |
//! | 10     | gyro_z  | 1000  |
//! | 12     | temp    | 100   |
//!
//! Divide a received field by its scale to recover m/s², rad/s or °C.

use bytemuck::{Pod, Zeroable};

use crate::drivers::imu::RawSample;

pub const WIRE_FRAME_LEN: usize = 14;
pub const MOTION_SCALE: f32 = 1000.0;
pub const TEMPERATURE_SCALE: f32 = 100.0;

/// Field layout of a frame. Each field holds the little-endian representation,
/// so the struct's bytes are the wire bytes on any host.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Zeroable, Pod)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameFields {
    pub accel_x: i16,
    pub accel_y: i16,
    pub accel_z: i16,
    pub gyro_x: i16,
    pub gyro_y: i16,
    pub gyro_z: i16,
    pub temperature: i16,
}

impl FrameFields {
    fn native_to_le(self) -> Self {
        Self {
            accel_x: self.accel_x.to_le(),
            accel_y: self.accel_y.to_le(),
            accel_z: self.accel_z.to_le(),
            gyro_x: self.gyro_x.to_le(),
            gyro_y: self.gyro_y.to_le(),
            gyro_z: self.gyro_z.to_le(),
            temperature: self.temperature.to_le(),
        }
    }

    fn le_to_native(self) -> Self {
        Self {
            accel_x: i16::from_le(self.accel_x),
            accel_y: i16::from_le(self.accel_y),
            accel_z: i16::from_le(self.accel_z),
            gyro_x: i16::from_le(self.gyro_x),
            gyro_y: i16::from_le(self.gyro_y),
            gyro_z: i16::from_le(self.gyro_z),
            temperature: i16::from_le(self.temperature),
        }
    }
}

/// Physical values recovered from a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TelemetryValues {
    pub accel: [f32; 3],
    pub gyro: [f32; 3],
    pub temperature: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WireFrame([u8; WIRE_FRAME_LEN]);

impl WireFrame {
    pub const fn from_bytes(bytes: [u8; WIRE_FRAME_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; WIRE_FRAME_LEN] {
        &self.0
    }

    pub fn fields(&self) -> FrameFields {
        bytemuck::cast::<_, FrameFields>(self.0).le_to_native()
    }

    pub fn decode(&self) -> TelemetryValues {
        let f = self.fields();
        let motion = |v: i16| v as f32 / MOTION_SCALE;
        TelemetryValues {
            accel: [motion(f.accel_x), motion(f.accel_y), motion(f.accel_z)],
            gyro: [motion(f.gyro_x), motion(f.gyro_y), motion(f.gyro_z)],
            temperature: f.temperature as f32 / TEMPERATURE_SCALE,
        }
    }
}

/// Scale, truncate toward zero, keep the low 16 bits.
///
/// No clamping: the driver's range check is the only guard. A value whose
/// scaled magnitude exceeds `i16` silently wraps (40.0 × 1000 becomes -25536).
fn fixed_point(value: f32, scale: f32) -> i16 {
    (value * scale) as i32 as i16
}

/// Packs a sample into a fresh frame.
pub fn encode(sample: &RawSample) -> WireFrame {
    let fields = FrameFields {
        accel_x: fixed_point(sample.accel.x, MOTION_SCALE),
        accel_y: fixed_point(sample.accel.y, MOTION_SCALE),
        accel_z: fixed_point(sample.accel.z, MOTION_SCALE),
        gyro_x: fixed_point(sample.gyro.x, MOTION_SCALE),
        gyro_y: fixed_point(sample.gyro.y, MOTION_SCALE),
        gyro_z: fixed_point(sample.gyro.z, MOTION_SCALE),
        temperature: fixed_point(sample.temperature, TEMPERATURE_SCALE),
    };
    WireFrame(bytemuck::cast(fields.native_to_le()))
}
