//! Typed scoped reads over an external process's address space.

use crate::error::{Error, Result};

/// Addresses below this are certainly invalid; reads against them are
/// rejected without touching the target process.
pub const ADDRESS_FLOOR: u64 = 0x10000;

/// Read access to an attached process's memory.
///
/// `read_bytes` is the single required primitive; every typed accessor is
/// built on top of it. No implementation may cache: the observed process
/// reallocates freely between calls, so every read must be issued fresh.
/// Retry policy, if any, belongs to callers.
pub trait ReadMemory {
    /// Base load address of the target module.
    fn base_address(&self) -> u64;

    /// Read exactly `size` bytes at an absolute address.
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>>;

    /// Whether the attached process still exists. Defaults to `true` for
    /// readers that cannot tell (e.g. dump-backed ones).
    fn is_alive(&self) -> bool {
        true
    }

    /// `read_bytes` with the sanity-floor check applied first.
    fn read_checked(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        if address < ADDRESS_FLOOR {
            return Err(Error::MemoryReadFailed {
                address,
                message: format!("address below sanity floor {ADDRESS_FLOOR:#x}"),
            });
        }
        self.read_bytes(address, size)
    }

    fn read_f32(&self, address: u64) -> Result<f32> {
        Ok(f32::from_le_bytes(array_at(
            address,
            self.read_checked(address, 4)?,
        )?))
    }

    fn read_i16(&self, address: u64) -> Result<i16> {
        Ok(i16::from_le_bytes(array_at(
            address,
            self.read_checked(address, 2)?,
        )?))
    }

    fn read_i64(&self, address: u64) -> Result<i64> {
        Ok(i64::from_le_bytes(array_at(
            address,
            self.read_checked(address, 8)?,
        )?))
    }

    /// Read a 64-bit pointer value.
    fn read_pointer(&self, address: u64) -> Result<u64> {
        Ok(u64::from_le_bytes(array_at(
            address,
            self.read_checked(address, 8)?,
        )?))
    }

    /// Read a NUL-terminated string of at most `max_len` bytes.
    ///
    /// A missing terminator truncates at `max_len` rather than failing;
    /// invalid UTF-8 is replaced lossily.
    fn read_string(&self, address: u64, max_len: usize) -> Result<String> {
        let bytes = self.read_checked(address, max_len)?;
        let len = memchr::memchr(0, &bytes).unwrap_or(bytes.len());
        Ok(String::from_utf8_lossy(&bytes[..len]).into_owned())
    }
}

fn array_at<const N: usize>(address: u64, bytes: Vec<u8>) -> Result<[u8; N]> {
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| Error::MemoryReadFailed {
            address,
            message: format!("short read: {} of {} bytes", bytes.len(), N),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MockMemoryBuilder;

    #[test]
    fn read_below_floor_short_circuits() {
        // The region exists, but the floor check must reject the address
        // before the backing read is even attempted.
        let reader = MockMemoryBuilder::new(0x1000)
            .region(0x100, vec![1, 2, 3, 4])
            .build();
        let err = reader.read_f32(0x100).unwrap_err();
        assert!(err.is_read_fault());
        assert_eq!(reader.reads_issued(), 0);
    }

    #[test]
    fn read_f32_little_endian() {
        let reader = MockMemoryBuilder::new(0x1000)
            .f32_at(0x20000, 1.5)
            .build();
        assert_eq!(reader.read_f32(0x20000).unwrap(), 1.5);
    }

    #[test]
    fn read_string_stops_at_nul() {
        let reader = MockMemoryBuilder::new(0x1000)
            .str_at(0x20000, "idPlayer", 50)
            .build();
        assert_eq!(reader.read_string(0x20000, 50).unwrap(), "idPlayer");
    }

    #[test]
    fn read_string_without_terminator_truncates() {
        let reader = MockMemoryBuilder::new(0x1000)
            .region(0x20000, b"abcdef".to_vec())
            .build();
        assert_eq!(reader.read_string(0x20000, 6).unwrap(), "abcdef");
    }

    #[test]
    fn read_pointer_round_trip() {
        let reader = MockMemoryBuilder::new(0x1000)
            .u64_at(0x20000, 0xDEAD_BEEF)
            .build();
        assert_eq!(reader.read_pointer(0x20000).unwrap(), 0xDEAD_BEEF);
    }
}
