use std::ops::ControlFlow;

use crate::container::header::PROPS_LEN;

/// 7-Zip style status codes surfaced through `EncodeFailed` / `DecodeFailed`.
pub mod status {
    pub const SZ_ERROR_DATA: i32 = 1;
    pub const SZ_ERROR_MEM: i32 = 2;
    pub const SZ_ERROR_UNSUPPORTED: i32 = 4;
    pub const SZ_ERROR_PARAM: i32 = 5;
    pub const SZ_ERROR_INPUT_EOF: i32 = 6;
    pub const SZ_ERROR_FAIL: i32 = 11;
}

/// Progress callback handed to a codec: `(bytes_in, bytes_out)`, cumulative.
/// Returning `Break` asks the codec to abort.
pub type ProgressFn<'a> = dyn FnMut(u64, u64) -> ControlFlow<()> + 'a;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CodecStatus {
    /// The progress callback asked to stop.
    Aborted,
    /// The output region filled up before the stream ended.
    OutputFull,
    Failed(i32),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CodecParams {
    pub level: u32,
    pub dictionary_size: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Encoded {
    /// Payload bytes written to the output region.
    pub len: usize,
    pub props: [u8; PROPS_LEN],
}

/// Black-box entropy coder.
///
/// Both calls take the whole input at once and may call `progress` zero or
/// more times with non-decreasing arguments; they never call it after
/// returning.
pub trait EntropyCodec: Send + Sync {
    fn name(&self) -> &'static str;

    fn encode(
        &self,
        input: &[u8],
        output: &mut [u8],
        params: &CodecParams,
        progress: &mut ProgressFn<'_>,
    ) -> Result<Encoded, CodecStatus>;

    fn decode(
        &self,
        props: &[u8; PROPS_LEN],
        payload: &[u8],
        expected_len: u64,
        progress: &mut ProgressFn<'_>,
    ) -> Result<Vec<u8>, CodecStatus>;
}

pub mod xz;
