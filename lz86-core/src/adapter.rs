use tracing::debug;

use crate::codec::status::SZ_ERROR_MEM;
use crate::codec::{CodecParams, CodecStatus, EntropyCodec, ProgressFn};
use crate::container::header::{ContainerHeader, FILTER_NONE, HEADER_LEN, write_header};
use crate::error::{Lz86Error, Result};

/// Capacity allocated for a container of `input_len` bytes.
///
/// The `/3 + 128` slack is an empirical margin, not a proven bound for every
/// coder; a codec that overruns it fails with `OutputBufferTooSmall`.
pub fn max_encoded_len(input_len: usize) -> usize {
    HEADER_LEN + input_len + input_len / 3 + 128
}

/// Encode `input` into a fresh `header + payload` buffer.
pub fn encode(
    codec: &dyn EntropyCodec,
    input: &[u8],
    params: &CodecParams,
    progress: &mut ProgressFn<'_>,
) -> Result<Vec<u8>> {
    let mut out = vec![0u8; max_encoded_len(input.len())];
    let n = encode_into(codec, input, &mut out, params, progress)?;
    out.truncate(n);
    out.shrink_to_fit();
    Ok(out)
}

/// Encode into a caller-provided buffer; returns the container length.
pub fn encode_into(
    codec: &dyn EntropyCodec,
    input: &[u8],
    out: &mut [u8],
    params: &CodecParams,
    progress: &mut ProgressFn<'_>,
) -> Result<usize> {
    if out.len() < HEADER_LEN {
        return Err(Lz86Error::OutputBufferTooSmall {
            capacity: out.len(),
            needed: HEADER_LEN,
        });
    }
    let capacity = out.len();
    let (head, payload) = out.split_at_mut(HEADER_LEN);
    let encoded = codec
        .encode(input, payload, params, progress)
        .map_err(|status| match status {
            CodecStatus::Aborted => Lz86Error::Cancelled,
            CodecStatus::OutputFull => Lz86Error::OutputBufferTooSmall {
                capacity,
                needed: max_encoded_len(input.len()).max(capacity + 1),
            },
            CodecStatus::Failed(code) => Lz86Error::EncodeFailed(code),
        })?;
    write_header(head, FILTER_NONE, &encoded.props, input.len() as u64);
    debug!(
        codec = codec.name(),
        input = input.len(),
        payload = encoded.len,
        "encoded"
    );
    Ok(HEADER_LEN + encoded.len)
}

/// Decode a whole container back to the original bytes.
pub fn decode(
    codec: &dyn EntropyCodec,
    container: &[u8],
    progress: &mut ProgressFn<'_>,
) -> Result<Vec<u8>> {
    let header = ContainerHeader::parse(container)?;
    if header.filter_id != FILTER_NONE {
        return Err(Lz86Error::UnsupportedFilter(header.filter_id));
    }
    let out = codec
        .decode(
            &header.codec_props,
            &container[HEADER_LEN..],
            header.uncompressed_size,
            progress,
        )
        .map_err(|status| match status {
            CodecStatus::Aborted => Lz86Error::Cancelled,
            CodecStatus::OutputFull => Lz86Error::DecodeFailed(SZ_ERROR_MEM),
            CodecStatus::Failed(code) => Lz86Error::DecodeFailed(code),
        })?;
    if out.len() as u64 != header.uncompressed_size {
        return Err(Lz86Error::SizeMismatch {
            expected: header.uncompressed_size,
            actual: out.len() as u64,
        });
    }
    Ok(out)
}
