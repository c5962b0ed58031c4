use std::io::Cursor;

use lz86_core::container::header::{
    ContainerHeader, HEADER_LEN, PROPS_LEN, read_size_at, read_uncompressed_size, write_header,
};
use lz86_core::Lz86Error;
use proptest::prelude::*;

proptest! {
    #[test]
    fn header_fields_survive_the_byte_layout(
        filter_id in 0u8..=1,
        props in any::<[u8; PROPS_LEN]>(),
        size in any::<u64>(),
        tail in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        let mut buf = vec![0u8; HEADER_LEN];
        write_header(&mut buf, filter_id, &props, size);
        buf.extend_from_slice(&tail);

        prop_assert_eq!(buf[0], filter_id);
        prop_assert_eq!(&buf[1..6], &props[..]);
        prop_assert_eq!(&buf[6..14], &size.to_le_bytes()[..]);
        prop_assert_eq!(read_uncompressed_size(&buf).unwrap(), size);
        prop_assert_eq!(read_size_at(&mut Cursor::new(&buf)).unwrap(), size);

        let parsed = ContainerHeader::parse(&buf).unwrap();
        prop_assert_eq!(parsed.codec_props, props);
        prop_assert_eq!(parsed.uncompressed_size, size);
    }
}

#[test]
fn boundary_sizes() {
    for size in [0, (1u64 << 32) - 1, 1u64 << 32, (1u64 << 32) + 1, u64::MAX] {
        let hdr = ContainerHeader {
            filter_id: 0,
            codec_props: [0x5d, 0, 0, 1, 0],
            uncompressed_size: size,
        };
        let bytes = hdr.to_bytes();
        assert_eq!(read_uncompressed_size(&bytes).unwrap(), size);
        assert_eq!(ContainerHeader::parse(&bytes).unwrap(), hdr);
    }
}

#[test]
fn size_spanning_both_words() {
    let hdr = ContainerHeader {
        filter_id: 0,
        codec_props: [0; PROPS_LEN],
        uncompressed_size: 0x0102_0304_0506_0708,
    };
    assert_eq!(
        &hdr.to_bytes()[6..],
        &[0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]
    );
}

#[test]
fn short_buffers_are_truncated_headers() {
    for len in 0..HEADER_LEN {
        let buf = vec![0xffu8; len];
        assert!(matches!(
            read_uncompressed_size(&buf),
            Err(Lz86Error::TruncatedHeader { found }) if found == len as u64
        ));
        assert!(matches!(
            read_size_at(&mut Cursor::new(&buf)),
            Err(Lz86Error::TruncatedHeader { found }) if found == len as u64
        ));
    }
    assert!(read_uncompressed_size(&[0u8; HEADER_LEN]).is_ok());
}

#[test]
#[should_panic]
fn writing_into_a_short_buffer_panics() {
    let mut buf = [0u8; HEADER_LEN - 1];
    write_header(&mut buf, 0, &[0; PROPS_LEN], 1);
}
