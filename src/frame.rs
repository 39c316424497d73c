//! # PCM Frame Codec
//!
//! Converts between the wire representation of an audio frame (raw bytes of
//! 4-byte little-endian Float32 samples) and the sample vectors the denoiser
//! operates on.
//!
//! ## Wire Format:
//! - **Encoding**: IEEE 754 single-precision floats
//! - **Byte order**: Little-endian
//! - **Frame size**: Exactly `frame_length * 4` bytes
//!
//! A frame of the wrong byte length is a transport contract violation and is
//! rejected here, before it can ever reach `process_frame`.

use crate::error::{DenoiseError, DenoiseResult};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::Cursor;

/// Size of one encoded sample on the wire.
const BYTES_PER_SAMPLE: usize = 4;

/// Decode a binary frame into Float32 samples.
///
/// ## Parameters:
/// - **data**: Raw frame bytes received from the transport
/// - **frame_length**: The session's fixed number of samples per frame
///
/// ## Returns:
/// - **Ok(samples)**: Exactly `frame_length` decoded samples
/// - **Err(FrameLengthMismatch)**: The payload is not `frame_length * 4` bytes
pub fn decode_frame(data: &[u8], frame_length: usize) -> DenoiseResult<Vec<f32>> {
    let expected_bytes = frame_length * BYTES_PER_SAMPLE;
    if data.len() != expected_bytes {
        return Err(DenoiseError::FrameLengthMismatch {
            expected: expected_bytes,
            got: data.len(),
        });
    }

    let mut cursor = Cursor::new(data);
    let mut samples = Vec::with_capacity(frame_length);
    while let Ok(sample) = cursor.read_f32::<LittleEndian>() {
        samples.push(sample);
    }

    Ok(samples)
}

/// Encode Float32 samples into the binary wire format.
///
/// ## Returns:
/// `samples.len() * 4` bytes of little-endian Float32 data, the same byte
/// length as the frame that produced them.
pub fn encode_frame(samples: &[f32]) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples.len() * BYTES_PER_SAMPLE);
    for &sample in samples {
        // Writing to a Vec cannot fail
        data.write_f32::<LittleEndian>(sample).expect("write to Vec");
    }
    data
}
