/// Limits applied while decoding.
///
/// Lengths on the wire are peer-controlled; these bound what a decoder will
/// accept before reading the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Maximum decoded string or byte-buffer length. Default: `u32::MAX`.
    pub max_string_len: usize,
    /// Maximum decoded list length, and total size of a streamed byte
    /// result. Default: `u32::MAX`.
    pub max_list_len: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_string_len: u32::MAX as usize,
            max_list_len: u32::MAX as usize,
        }
    }
}
