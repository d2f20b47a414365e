/// Base-91 digit codec used by compressed positions and Mic-E altitude.
pub mod base91;
/// Zero-copy byte reader for decoding frames and fixed-width payload fields.
pub mod reader;
/// Byte writer for encoding AX.25 frames into a caller-owned buffer.
pub mod writer;
