//! Configuration characteristic backing store.

use crate::config::CONFIG_BUFFER_LEN;
use crate::error::ConfigError;
use crate::log_warn;

/// Fixed-size read/write buffer exposed to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigBuffer {
    bytes: [u8; CONFIG_BUFFER_LEN],
}

impl ConfigBuffer {
    pub const fn new() -> Self {
        Self {
            bytes: [0; CONFIG_BUFFER_LEN],
        }
    }

    pub fn as_bytes(&self) -> &[u8; CONFIG_BUFFER_LEN] {
        &self.bytes
    }

    /// Writes `data` at `offset`. All or nothing: a write running past the end
    /// is rejected before any byte is copied.
    pub fn write(&mut self, offset: usize, data: &[u8]) -> Result<usize, ConfigError> {
        let end = offset
            .checked_add(data.len())
            .filter(|&end| end <= CONFIG_BUFFER_LEN)
            .ok_or_else(|| {
                log_warn!(
                    "Config write rejected: offset {} + len {} > {}",
                    offset,
                    data.len(),
                    CONFIG_BUFFER_LEN
                );
                ConfigError::InvalidOffset
            })?;
        self.bytes[offset..end].copy_from_slice(data);
        Ok(data.len())
    }

    /// Copies from `offset` into `out`, as much as fits. Reading exactly at
    /// the end yields zero bytes; past the end is an error.
    pub fn read(&self, offset: usize, out: &mut [u8]) -> Result<usize, ConfigError> {
        let tail = self
            .bytes
            .get(offset..)
            .ok_or(ConfigError::InvalidOffset)?;
        let n = tail.len().min(out.len());
        out[..n].copy_from_slice(&tail[..n]);
        Ok(n)
    }
}

impl Default for ConfigBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_at_offset() {
        let mut cfg = ConfigBuffer::new();
        assert_eq!(cfg.write(4, &[1, 2, 3]), Ok(3));
        assert_eq!(&cfg.as_bytes()[3..8], &[0, 1, 2, 3, 0]);
    }

    #[test]
    fn write_filling_to_the_end_is_accepted() {
        let mut cfg = ConfigBuffer::new();
        assert_eq!(cfg.write(14, &[0xAA, 0xBB]), Ok(2));
        assert_eq!(&cfg.as_bytes()[14..], &[0xAA, 0xBB]);
    }

    #[test]
    fn write_past_the_end_is_rejected_without_partial_apply() {
        let mut cfg = ConfigBuffer::new();
        cfg.write(0, &[0x5A; 16]).unwrap();
        let before = cfg.clone();
        assert_eq!(cfg.write(15, &[1, 2]), Err(ConfigError::InvalidOffset));
        assert_eq!(cfg, before);
    }

    #[test]
    fn huge_offset_does_not_overflow() {
        let mut cfg = ConfigBuffer::new();
        assert_eq!(cfg.write(usize::MAX, &[1]), Err(ConfigError::InvalidOffset));
    }

    #[test]
    fn read_is_clipped_to_buffer() {
        let mut cfg = ConfigBuffer::new();
        cfg.write(12, &[9, 8, 7, 6]).unwrap();
        let mut out = [0u8; 8];
        assert_eq!(cfg.read(12, &mut out), Ok(4));
        assert_eq!(&out[..4], &[9, 8, 7, 6]);
        assert_eq!(cfg.read(16, &mut out), Ok(0));
        assert_eq!(cfg.read(17, &mut out), Err(ConfigError::InvalidOffset));
    }
}
