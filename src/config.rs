// Centralize all configuration constants
pub const SENSOR_POLL_INTERVAL_MS: u64 = 100;
pub const HEARTBEAT_PERIOD_MS: u64 = 1000;
pub const HEARTBEAT_TOGGLE_TICKS: u32 = (HEARTBEAT_PERIOD_MS / SENSOR_POLL_INTERVAL_MS) as u32;
// One stats line every 10 s of loop time
pub const STATS_REPORT_TICKS: u32 = 100;

pub const I2C_FREQUENCY_HZ: u32 = 100_000;
pub const LSM6DSL_I2C_ADDR: u8 = 0x6A;
pub const UART_BAUDRATE: u32 = 1_000_000;

// Register values written at activation (104 Hz, ±2 g, ±250 dps, BDU + IF_INC)
pub const CTRL1_XL_104HZ_2G: u8 = 0x60;
pub const CTRL2_G_104HZ_250DPS: u8 = 0x60;
pub const CTRL3_C_DEFAULT: u8 = 0x44;

// Configuration characteristic
pub const CONFIG_BUFFER_LEN: usize = 16;

// Channel sizes
pub const NOTIFY_QUEUE_DEPTH: usize = 4;
pub const LINK_EVENT_QUEUE_DEPTH: usize = 8;
pub const LINK_DMA_BUF_LEN: usize = 256;

// Diagnostics cadence for the delivery gate
pub const DELIVERY_LOG_EVERY: u32 = 10;
