use std::io::{Read, Seek, SeekFrom};

use crate::error::{Lz86Error, Result};

/// Size of the opaque codec properties blob (lc/lp/pb byte + LE dictionary size).
pub const PROPS_LEN: usize = 5;
/// Offset of the little-endian uncompressed size field.
pub const SIZE_OFFSET: usize = 1 + PROPS_LEN;
/// Total header length; the payload starts right after it.
pub const HEADER_LEN: usize = SIZE_OFFSET + 8;

pub const FILTER_NONE: u8 = 0;
/// Reserved for the x86 branch-conversion filter; never produced here.
pub const FILTER_X86: u8 = 1;

/// The fixed 14-byte preamble of a compressed file.
///
/// ```text
/// offset size field
///   0     1   filter id (0 = none, 1 = x86)
///   1     5   codec properties
///   6     8   uncompressed size (little endian)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    pub filter_id: u8,
    pub codec_props: [u8; PROPS_LEN],
    pub uncompressed_size: u64,
}

impl ContainerHeader {
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        write_header(
            &mut buf,
            self.filter_id,
            &self.codec_props,
            self.uncompressed_size,
        );
        buf
    }

    pub fn parse(buf: &[u8]) -> Result<Self> {
        let uncompressed_size = read_uncompressed_size(buf)?;
        let mut codec_props = [0u8; PROPS_LEN];
        codec_props.copy_from_slice(&buf[1..SIZE_OFFSET]);
        Ok(Self {
            filter_id: buf[0],
            codec_props,
            uncompressed_size,
        })
    }

    /// Decoded `(lc, lp, pb)` from the first properties byte.
    pub fn lc_lp_pb(&self) -> (u8, u8, u8) {
        let mut d = self.codec_props[0];
        let lc = d % 9;
        d /= 9;
        (lc, d % 5, d / 5)
    }

    pub fn dictionary_size(&self) -> u32 {
        u32::from_le_bytes([
            self.codec_props[1],
            self.codec_props[2],
            self.codec_props[3],
            self.codec_props[4],
        ])
    }

    pub fn props_hex(&self) -> String {
        hex::encode(self.codec_props)
    }
}

/// Write the header fields at their fixed offsets.
///
/// Panics if `buf` is shorter than [`HEADER_LEN`]; sizing the buffer is the caller's job.
pub fn write_header(buf: &mut [u8], filter_id: u8, codec_props: &[u8; PROPS_LEN], size: u64) {
    let hdr = &mut buf[..HEADER_LEN];
    hdr[0] = filter_id;
    hdr[1..SIZE_OFFSET].copy_from_slice(codec_props);
    let mut t = size;
    for b in &mut hdr[SIZE_OFFSET..] {
        *b = t as u8;
        t >>= 8;
    }
}

pub fn read_uncompressed_size(buf: &[u8]) -> Result<u64> {
    if buf.len() < HEADER_LEN {
        return Err(Lz86Error::TruncatedHeader {
            found: buf.len() as u64,
        });
    }
    Ok(buf[SIZE_OFFSET..HEADER_LEN]
        .iter()
        .enumerate()
        .fold(0u64, |acc, (i, &b)| acc | (u64::from(b) << (8 * i))))
}

/// Read only the size field of a container, without touching the payload.
pub fn read_size_at<F: Read + Seek>(f: &mut F) -> Result<u64> {
    let len = f.seek(SeekFrom::End(0))?;
    if len < HEADER_LEN as u64 {
        return Err(Lz86Error::TruncatedHeader { found: len });
    }
    f.seek(SeekFrom::Start(SIZE_OFFSET as u64))?;
    let mut size = [0u8; 8];
    f.read_exact(&mut size)?;
    Ok(u64::from_le_bytes(size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const PROPS: [u8; PROPS_LEN] = [0x5d, 0x00, 0x00, 0x01, 0x00];

    #[test]
    fn layout_matches_fixed_offsets() {
        let mut buf = [0xAAu8; HEADER_LEN + 3];
        write_header(&mut buf, FILTER_NONE, &PROPS, 0x0102_0304_0506_0708);
        assert_eq!(buf[0], 0);
        assert_eq!(&buf[1..6], &PROPS);
        assert_eq!(
            &buf[6..14],
            &[0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]
        );
        // bytes past the header are untouched
        assert_eq!(&buf[14..], &[0xAA; 3]);
    }

    #[test]
    fn short_buffers_are_truncated() {
        for n in 0..HEADER_LEN {
            let buf = vec![0u8; n];
            match read_uncompressed_size(&buf) {
                Err(Lz86Error::TruncatedHeader { found }) => assert_eq!(found, n as u64),
                other => panic!("expected TruncatedHeader for {n} bytes, got {other:?}"),
            }
        }
    }

    #[test]
    fn parse_decodes_props() {
        let hdr = ContainerHeader {
            filter_id: FILTER_NONE,
            codec_props: PROPS,
            uncompressed_size: 20,
        };
        let parsed = ContainerHeader::parse(&hdr.to_bytes()).unwrap();
        assert_eq!(parsed, hdr);
        assert_eq!(parsed.lc_lp_pb(), (3, 0, 2));
        assert_eq!(parsed.dictionary_size(), 1 << 16);
        assert_eq!(parsed.props_hex(), "5d00000100");
    }

    #[test]
    fn read_size_at_seeks_to_size_field() {
        let mut bytes = ContainerHeader {
            filter_id: FILTER_NONE,
            codec_props: PROPS,
            uncompressed_size: u64::from(u32::MAX) + 1,
        }
        .to_bytes()
        .to_vec();
        bytes.extend_from_slice(b"payload");
        let mut cur = Cursor::new(bytes);
        assert_eq!(read_size_at(&mut cur).unwrap(), 1 << 32);

        let mut short = Cursor::new(vec![0u8; 13]);
        assert!(matches!(
            read_size_at(&mut short),
            Err(Lz86Error::TruncatedHeader { found: 13 })
        ));
    }
}
