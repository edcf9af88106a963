//! Unaligned access to the samples of a raw byte buffer.
//!
//! Caller buffers are plain `[u8]` with no alignment guarantees, so samples are
//! always copied in and out instead of casting the whole slice.

use bytemuck::{AnyBitPattern, NoUninit};

/// Read the `idx`th `T` sized sample
pub fn read<T: AnyBitPattern>(buf: &[u8], idx: usize) -> T {
    let size = size_of::<T>();
    bytemuck::pod_read_unaligned(&buf[idx * size..(idx + 1) * size])
}

/// Overwrite the `idx`th `T` sized sample
pub fn write<T: NoUninit>(buf: &mut [u8], idx: usize, value: T) {
    let size = size_of::<T>();
    buf[idx * size..(idx + 1) * size].copy_from_slice(bytemuck::bytes_of(&value));
}

#[test]
fn test_unaligned() {
    let mut buf = [0u8; 9];
    // Deliberately start at an odd offset
    write::<i16>(&mut buf[1..], 1, -2);
    write::<f32>(&mut buf[1..], 1, 0.5);
    assert_eq!(read::<f32>(&buf[1..], 1), 0.5);
    write::<u16>(&mut buf[1..], 0, 0x1234);
    assert_eq!(read::<u16>(&buf[1..], 0), 0x1234);
    assert_eq!(read::<u8>(&buf, 1), 0x1234u16.to_ne_bytes()[0]);
}
