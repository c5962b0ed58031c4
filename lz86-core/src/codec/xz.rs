use xz2::stream::{Action, LzmaOptions, Status, Stream};

use super::status::{
    SZ_ERROR_DATA, SZ_ERROR_FAIL, SZ_ERROR_INPUT_EOF, SZ_ERROR_MEM, SZ_ERROR_PARAM,
    SZ_ERROR_UNSUPPORTED,
};
use super::{CodecParams, CodecStatus, Encoded, EntropyCodec, ProgressFn};
use crate::container::header::PROPS_LEN;

/// liblzma's `.lzma` ("alone") header: properties + 8-byte size.
const ALONE_HEADER_LEN: usize = PROPS_LEN + 8;
const DECODE_GROW: usize = 64 * 1024;
const MAX_PREALLOC: u64 = 64 * 1024 * 1024;

pub const DEFAULT_TICK_BYTES: usize = 256 * 1024;
pub const MAX_LEVEL: u32 = 9;
/// liblzma's `LZMA_DICT_SIZE_MIN`.
pub const MIN_DICTIONARY_SIZE: u32 = 4096;

/// LZMA1 through liblzma.
///
/// The encoder emits the alone format; its 13-byte header is split off so that
/// only the properties reach the caller. Decoding re-synthesizes that header
/// with an unknown size and relies on the end marker the encoder always writes.
pub struct XzLzma {
    tick_bytes: usize,
}

impl XzLzma {
    pub fn new() -> Self {
        Self::with_tick_bytes(DEFAULT_TICK_BYTES)
    }

    /// Report progress every `tick_bytes` of input.
    pub fn with_tick_bytes(tick_bytes: usize) -> Self {
        Self {
            tick_bytes: tick_bytes.max(1),
        }
    }
}

impl Default for XzLzma {
    fn default() -> Self {
        Self::new()
    }
}

fn status_of(e: xz2::stream::Error) -> CodecStatus {
    use xz2::stream::Error;
    let code = match e {
        Error::Data => SZ_ERROR_DATA,
        Error::Mem | Error::MemLimit => SZ_ERROR_MEM,
        Error::Options => SZ_ERROR_PARAM,
        Error::Format => SZ_ERROR_UNSUPPORTED,
        _ => SZ_ERROR_FAIL,
    };
    CodecStatus::Failed(code)
}

/// Splits encoder output: the alone header goes to `alone`, the rest to `out`.
struct SplitOutput<'a> {
    alone: [u8; ALONE_HEADER_LEN],
    alone_len: usize,
    out: &'a mut [u8],
    written: usize,
}

impl<'a> SplitOutput<'a> {
    fn new(out: &'a mut [u8]) -> Self {
        Self {
            alone: [0u8; ALONE_HEADER_LEN],
            alone_len: 0,
            out,
            written: 0,
        }
    }

    fn props(&self) -> [u8; PROPS_LEN] {
        let mut p = [0u8; PROPS_LEN];
        p.copy_from_slice(&self.alone[..PROPS_LEN]);
        p
    }

    /// One `process` call; returns bytes of `input` consumed.
    fn step(
        &mut self,
        stream: &mut Stream,
        input: &[u8],
        action: Action,
    ) -> Result<(usize, Status), CodecStatus> {
        let (in0, out0) = (stream.total_in(), stream.total_out());
        let in_header = self.alone_len < ALONE_HEADER_LEN;
        let status = if in_header {
            stream.process(input, &mut self.alone[self.alone_len..], action)
        } else {
            if self.written == self.out.len() {
                return Err(CodecStatus::OutputFull);
            }
            stream.process(input, &mut self.out[self.written..], action)
        }
        .map_err(status_of)?;

        let consumed = (stream.total_in() - in0) as usize;
        let produced = (stream.total_out() - out0) as usize;
        if in_header {
            self.alone_len += produced;
        } else {
            self.written += produced;
        }
        if matches!(status, Status::MemNeeded) && consumed == 0 && produced == 0 {
            return Err(CodecStatus::Failed(SZ_ERROR_FAIL));
        }
        Ok((consumed, status))
    }
}

impl EntropyCodec for XzLzma {
    fn name(&self) -> &'static str {
        "lzma"
    }

    fn encode(
        &self,
        input: &[u8],
        output: &mut [u8],
        params: &CodecParams,
        progress: &mut ProgressFn<'_>,
    ) -> Result<Encoded, CodecStatus> {
        if params.level > MAX_LEVEL || params.dictionary_size < MIN_DICTIONARY_SIZE {
            return Err(CodecStatus::Failed(SZ_ERROR_PARAM));
        }
        let mut opts = LzmaOptions::new_preset(params.level).map_err(status_of)?;
        opts.dict_size(params.dictionary_size);
        let mut stream = Stream::new_lzma_encoder(&opts).map_err(status_of)?;
        let mut sink = SplitOutput::new(output);

        let mut pos = 0usize;
        loop {
            let end = input.len().min(pos.saturating_add(self.tick_bytes));
            let last = end == input.len();
            let action = if last { Action::Finish } else { Action::Run };
            let mut chunk = &input[pos..end];
            loop {
                let (consumed, status) = sink.step(&mut stream, chunk, action)?;
                chunk = &chunk[consumed..];
                pos += consumed;
                if matches!(status, Status::StreamEnd) {
                    return Ok(Encoded {
                        len: sink.written,
                        props: sink.props(),
                    });
                }
                if !last && chunk.is_empty() {
                    break;
                }
            }
            if progress(stream.total_in(), sink.written as u64).is_break() {
                return Err(CodecStatus::Aborted);
            }
        }
    }

    fn decode(
        &self,
        props: &[u8; PROPS_LEN],
        payload: &[u8],
        expected_len: u64,
        progress: &mut ProgressFn<'_>,
    ) -> Result<Vec<u8>, CodecStatus> {
        let mut stream = Stream::new_lzma_decoder(u64::MAX).map_err(status_of)?;
        let mut alone = [0xFFu8; ALONE_HEADER_LEN];
        alone[..PROPS_LEN].copy_from_slice(props);

        // liblzma will not consume input into a zero-capacity buffer.
        let mut out: Vec<u8> = Vec::with_capacity(expected_len.clamp(1, MAX_PREALLOC) as usize);
        let mut hdr = &alone[..];
        while !hdr.is_empty() {
            if out.len() == out.capacity() {
                out.reserve(DECODE_GROW);
            }
            let before = stream.total_in();
            stream
                .process_vec(hdr, &mut out, Action::Run)
                .map_err(status_of)?;
            let consumed = (stream.total_in() - before) as usize;
            if consumed == 0 {
                return Err(CodecStatus::Failed(SZ_ERROR_DATA));
            }
            hdr = &hdr[consumed..];
        }

        let mut pos = 0usize;
        loop {
            let end = payload.len().min(pos.saturating_add(self.tick_bytes));
            let last = end == payload.len();
            let action = if last { Action::Finish } else { Action::Run };
            let mut chunk = &payload[pos..end];
            loop {
                if out.len() == out.capacity() {
                    out.reserve(DECODE_GROW);
                }
                let (in0, out0) = (stream.total_in(), stream.total_out());
                let status = stream
                    .process_vec(chunk, &mut out, action)
                    .map_err(status_of)?;
                let consumed = (stream.total_in() - in0) as usize;
                let produced = stream.total_out() - out0;
                chunk = &chunk[consumed..];
                pos += consumed;

                // Overshooting the declared size is left for the caller to report.
                if matches!(status, Status::StreamEnd) || out.len() as u64 > expected_len {
                    return Ok(out);
                }
                let output_full = out.len() == out.capacity();
                if consumed == 0 && produced == 0 && !output_full {
                    let code = if chunk.is_empty() {
                        SZ_ERROR_INPUT_EOF
                    } else {
                        SZ_ERROR_DATA
                    };
                    return Err(CodecStatus::Failed(code));
                }
                if !last && chunk.is_empty() && !output_full {
                    break;
                }
            }
            let consumed_payload = stream.total_in() - ALONE_HEADER_LEN as u64;
            if progress(consumed_payload, out.len() as u64).is_break() {
                return Err(CodecStatus::Aborted);
            }
        }
    }
}
