//! Placement of program images into memory.
//!
//! An image is a sequence of big-endian `u16` words: the first one is the origin address,
//! the rest is copied to memory starting at the origin.
use crate::errors::LoadProgramError;
use crate::hardware::memory::Memory;
use std::fs;
use std::path::Path;

/// Where an image ended up in memory.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub origin: u16,
    /// Number of words written, at most `0x10000 - origin`.
    pub word_count: usize,
    /// True if words beyond the top of the address space were dropped.
    pub truncated: bool,
}

/// Reads a complete image file.
///
/// # Errors
/// - File cannot be opened or read
pub fn read_image_file(path: &Path) -> Result<Vec<u8>, LoadProgramError> {
    fs::read(path).map_err(|source| LoadProgramError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Copies the image into memory at its origin. The words are not validated as instructions.
///
/// # Errors
/// - Image is shorter than the origin word
pub fn load_image(memory: &mut Memory, image: &[u8]) -> Result<LoadedImage, LoadProgramError> {
    let Some((header, payload)) = image.split_first_chunk::<2>() else {
        return Err(LoadProgramError::ProgramMissingOrigHeader);
    };
    let origin = u16::from_be_bytes(*header);
    let words = payload.chunks_exact(2);
    if !words.remainder().is_empty() {
        log::warn!("Ignoring trailing odd byte of image loaded at {origin:#06X}");
    }
    let available = words.len();
    let destination = memory.slice_from_mut(origin);
    let capacity = destination.len();
    for (cell, word) in destination.iter_mut().zip(words) {
        *cell = u16::from_be_bytes([word[0], word[1]]);
    }
    let loaded = LoadedImage {
        origin,
        word_count: available.min(capacity),
        truncated: available > capacity,
    };
    if loaded.truncated {
        log::warn!(
            "Image at {origin:#06X} has {available} words, only {capacity} fit below the top of memory"
        );
    }
    log::debug!("Loaded {loaded:?}");
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::keyboard::Keyboard;
    use googletest::prelude::*;

    fn memory() -> Memory {
        Memory::new(Keyboard::disconnected())
    }

    #[gtest]
    pub fn test_load_image_big_endian() {
        let mut mem = memory();
        let loaded = load_image(&mut mem, &[0x30, 0x00, 0x12, 0x34, 0x56, 0x78]).unwrap();
        expect_that!(
            loaded,
            eq(LoadedImage {
                origin: 0x3000,
                word_count: 2,
                truncated: false
            })
        );
        expect_that!(mem.read(0x3000), eq(0x1234));
        expect_that!(mem.read(0x3001), eq(0x5678));
        expect_that!(mem.read(0x3002), eq(0));
    }
    #[gtest]
    pub fn test_load_image_empty() {
        let mut mem = memory();
        expect_that!(
            load_image(&mut mem, &[]).unwrap_err().to_string(),
            eq("Program is missing valid .ORIG header")
        );
        expect_that!(
            load_image(&mut mem, &[0x30]).unwrap_err().to_string(),
            eq("Program is missing valid .ORIG header")
        );
    }
    #[gtest]
    pub fn test_load_image_header_only() {
        let mut mem = memory();
        let loaded = load_image(&mut mem, &[0x40, 0x00]).unwrap();
        expect_that!(loaded.origin, eq(0x4000));
        expect_that!(loaded.word_count, eq(0));
    }
    #[gtest]
    pub fn test_load_image_ignores_odd_byte() {
        let mut mem = memory();
        let loaded = load_image(&mut mem, &[0x30, 0x00, 0xAB, 0xCD, 0xEF]).unwrap();
        expect_that!(loaded.word_count, eq(1));
        expect_that!(mem.read(0x3000), eq(0xABCD));
        expect_that!(mem.read(0x3001), eq(0));
    }
    #[gtest]
    pub fn test_load_image_stops_at_top_of_memory() {
        let mut mem = memory();
        let image = [0xFF, 0xFE, 0x00, 0x01, 0x00, 0x02, 0x00, 0x03];
        let loaded = load_image(&mut mem, &image).unwrap();
        expect_that!(loaded.word_count, eq(2));
        expect_that!(loaded.truncated, eq(true));
        expect_that!(mem.read(0xFFFE), eq(1));
        expect_that!(mem.read(0xFFFF), eq(2));
        // no wrap around to the bottom
        expect_that!(mem.read(0x0000), eq(0));
    }
    #[gtest]
    pub fn test_read_image_file_missing() {
        let err = read_image_file(Path::new("does/not/exist.obj")).unwrap_err();
        expect_that!(
            matches!(err, LoadProgramError::Io { .. }),
            eq(true)
        );
    }
}
