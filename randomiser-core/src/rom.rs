use sha2::{Digest, Sha256};

use crate::{RandomiserError, Result};

/// Byte used by the cartridge for unused space.
pub const FREE_BYTE: u8 = 0xFF;

/// GBA cartridge ROM is mapped at this address; pointers stored in the data
/// tables are absolute bus addresses.
pub const ROM_BASE_ADDRESS: u32 = 0x0800_0000;
const ROM_MAX_SIZE: u32 = 0x0200_0000;

pub const HEADER_TITLE_OFFSET: usize = 0xA0;
pub const HEADER_TITLE_LEN: usize = 12;
pub const HEADER_CODE_OFFSET: usize = 0xAC;
pub const HEADER_CODE_LEN: usize = 4;

/// The full data blob, owned by a single pipeline run.
///
/// The buffer length is fixed at construction: every accessor is
/// bounds-checked and nothing can shrink or grow it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rom {
    bytes: Vec<u8>,
}

impl Rom {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Number of bytes available from `offset` to the end of the buffer.
    pub fn remaining(&self, offset: usize) -> usize {
        self.bytes.len().saturating_sub(offset)
    }

    fn span(&self, offset: usize, width: usize) -> Result<std::ops::Range<usize>> {
        let end = offset
            .checked_add(width)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(RandomiserError::OutOfBounds {
                offset,
                width,
                len: self.bytes.len(),
            })?;
        Ok(offset..end)
    }

    pub fn slice(&self, offset: usize, width: usize) -> Result<&[u8]> {
        let range = self.span(offset, width)?;
        Ok(&self.bytes[range])
    }

    pub fn slice_mut(&mut self, offset: usize, width: usize) -> Result<&mut [u8]> {
        let range = self.span(offset, width)?;
        Ok(&mut self.bytes[range])
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8> {
        Ok(self.slice(offset, 1)?[0])
    }

    pub fn write_u8(&mut self, offset: usize, value: u8) -> Result<()> {
        self.slice_mut(offset, 1)?[0] = value;
        Ok(())
    }

    pub fn read_u16(&self, offset: usize) -> Result<u16> {
        let b = self.slice(offset, 2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn write_u16(&mut self, offset: usize, value: u16) -> Result<()> {
        self.slice_mut(offset, 2)?
            .copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn read_u32(&self, offset: usize) -> Result<u32> {
        let b = self.slice(offset, 4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn write_u32(&mut self, offset: usize, value: u32) -> Result<()> {
        self.slice_mut(offset, 4)?
            .copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Reads at most `max_len` bytes, stopping at the first NUL.
    pub fn read_fixed_string(&self, offset: usize, max_len: usize) -> Result<String> {
        let raw = self.slice(offset, max_len)?;
        let nul_pos = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        Ok(String::from_utf8_lossy(&raw[..nul_pos]).into_owned())
    }

    /// Writes `value` into a `max_len` byte field, padding with NUL.
    ///
    /// Input longer than the field is truncated without error.
    pub fn write_fixed_string(&mut self, offset: usize, value: &str, max_len: usize) -> Result<()> {
        let field = self.slice_mut(offset, max_len)?;
        let src = value.as_bytes();
        let n = src.len().min(max_len);
        field[..n].copy_from_slice(&src[..n]);
        field[n..].fill(0);
        Ok(())
    }

    /// Returns the first offset at or after `start` where `size` consecutive
    /// bytes are all `0xFF`.
    pub fn find_free_run(&self, size: usize, start: usize) -> Option<usize> {
        if size == 0 || start >= self.bytes.len() {
            return None;
        }

        let mut run_start = start;
        let mut run_len = 0usize;
        for (i, &b) in self.bytes.iter().enumerate().skip(start) {
            if b == FREE_BYTE {
                if run_len == 0 {
                    run_start = i;
                }
                run_len += 1;
                if run_len == size {
                    return Some(run_start);
                }
            } else {
                run_len = 0;
            }
        }
        None
    }

    /// SHA-256 of the whole buffer as lowercase hex.
    pub fn checksum(&self) -> String {
        checksum(&self.bytes)
    }
}

pub fn checksum(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Translates a bus address stored in the ROM into a file offset.
pub fn pointer_to_offset(pointer: u32) -> Result<usize> {
    if !(ROM_BASE_ADDRESS..ROM_BASE_ADDRESS + ROM_MAX_SIZE).contains(&pointer) {
        return Err(RandomiserError::InvalidPointer(pointer));
    }
    Ok((pointer - ROM_BASE_ADDRESS) as usize)
}

pub fn offset_to_pointer(offset: usize) -> Result<u32> {
    u32::try_from(offset)
        .ok()
        .filter(|&o| o < ROM_MAX_SIZE)
        .map(|o| o + ROM_BASE_ADDRESS)
        .ok_or(RandomiserError::OutOfBounds {
            offset,
            width: 0,
            len: ROM_MAX_SIZE as usize,
        })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RomHeader {
    pub title: String,
    pub code: String,
}

impl RomHeader {
    pub fn parse(rom: &Rom) -> Result<Self> {
        Ok(Self {
            title: rom
                .read_fixed_string(HEADER_TITLE_OFFSET, HEADER_TITLE_LEN)?
                .trim_end()
                .to_string(),
            code: rom.read_fixed_string(HEADER_CODE_OFFSET, HEADER_CODE_LEN)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_and_writes_little_endian() {
        let mut rom = Rom::from_bytes(vec![0; 8]);
        rom.write_u16(0, 0xBEEF).unwrap();
        rom.write_u32(4, 0x1234_5678).unwrap();
        assert_eq!(rom.as_bytes(), &[0xEF, 0xBE, 0, 0, 0x78, 0x56, 0x34, 0x12]);
        assert_eq!(rom.read_u16(0).unwrap(), 0xBEEF);
        assert_eq!(rom.read_u32(4).unwrap(), 0x1234_5678);
    }

    #[test]
    fn rejects_access_past_the_end() {
        let mut rom = Rom::from_bytes(vec![0; 4]);
        assert!(matches!(
            rom.read_u32(1),
            Err(RandomiserError::OutOfBounds { offset: 1, width: 4, len: 4 })
        ));
        assert!(rom.write_u16(3, 1).is_err());
        assert!(rom.read_u16(usize::MAX).is_err());
        assert_eq!(rom.as_bytes(), &[0, 0, 0, 0]);
    }

    #[test]
    fn fixed_strings_pad_and_truncate() {
        let mut rom = Rom::from_bytes(vec![0xAA; 8]);
        rom.write_fixed_string(0, "AB", 4).unwrap();
        assert_eq!(&rom.as_bytes()[..5], &[b'A', b'B', 0, 0, 0xAA]);
        assert_eq!(rom.read_fixed_string(0, 4).unwrap(), "AB");

        rom.write_fixed_string(0, "ABCDEFG", 4).unwrap();
        assert_eq!(rom.read_fixed_string(0, 4).unwrap(), "ABCD");
        assert_eq!(rom.as_bytes()[4], 0xAA);
    }

    #[test]
    fn free_run_is_all_ff() {
        let bytes = vec![0xFF, 0x00, 0xFF, 0xFF, 0x10, 0xFF, 0xFF, 0xFF, 0x00];
        let rom = Rom::from_bytes(bytes.clone());

        let off = rom.find_free_run(3, 0).unwrap();
        assert_eq!(off, 5);
        assert!(bytes[off..off + 3].iter().all(|&b| b == 0xFF));

        assert_eq!(rom.find_free_run(2, 0), Some(2));
        assert_eq!(rom.find_free_run(1, 6), Some(6));
        assert_eq!(rom.find_free_run(4, 0), None);
        assert_eq!(rom.find_free_run(1, 100), None);
        assert_eq!(rom.find_free_run(0, 0), None);
    }

    #[test]
    fn free_run_at_buffer_end() {
        let rom = Rom::from_bytes(vec![0x00, 0xFF, 0xFF]);
        assert_eq!(rom.find_free_run(2, 0), Some(1));
    }

    #[test]
    fn checksum_is_stable() {
        let a = Rom::from_bytes(b"abc".to_vec());
        assert_eq!(
            a.checksum(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        let b = Rom::from_bytes(b"abd".to_vec());
        assert_ne!(a.checksum(), b.checksum());
    }

    #[test]
    fn translates_pointers() {
        assert_eq!(pointer_to_offset(0x0823_EAF0).unwrap(), 0x23EAF0);
        assert!(pointer_to_offset(0x0200_0000).is_err());
        assert_eq!(offset_to_pointer(0x100).unwrap(), 0x0800_0100);
    }

    #[test]
    fn parses_header() {
        let mut rom = Rom::from_bytes(vec![0; 0xC0]);
        rom.write_fixed_string(HEADER_TITLE_OFFSET, "POKEMON FIRE", 12).unwrap();
        rom.write_fixed_string(HEADER_CODE_OFFSET, "BPRE", 4).unwrap();
        let header = RomHeader::parse(&rom).unwrap();
        assert_eq!(header.title, "POKEMON FIRE");
        assert_eq!(header.code, "BPRE");
    }
}
