//! Program image loading.
//!
//! Two formats:
//! 1. **ELF:** loadable segments are copied into flash/RAM by address and
//!    the entry point becomes the start PC.
//! 2. **Flat binary:** the image is copied to the configured start PC
//!    (the flash base by default).

use object::{Object, ObjectSegment};
use tracing::debug;

use crate::common::SimError;
use crate::config::Config;
use crate::soc::Router;

/// Loads `data` into the machine and returns the start PC.
///
/// # Errors
///
/// Fails when the ELF is malformed, a segment falls outside flash/RAM, or
/// the entry point is unmapped.
pub fn load_image(router: &mut Router, config: &Config, data: &[u8]) -> Result<u32, SimError> {
    if data.starts_with(b"\x7fELF") {
        load_elf(router, data)
    } else {
        let base = config.general.start_pc;
        if !router.load_bytes(base, data) {
            return Err(SimError::SegmentOutOfRange {
                addr: base,
                len: data.len(),
            });
        }
        debug!(base = format_args!("{base:#010x}"), len = data.len(), "flat image loaded");
        Ok(base)
    }
}

fn load_elf(router: &mut Router, data: &[u8]) -> Result<u32, SimError> {
    let file = object::File::parse(data)?;
    for segment in file.segments() {
        let addr = segment.address() as u32;
        let bytes = segment.data()?;
        if bytes.is_empty() {
            continue;
        }
        if !router.load_bytes(addr, bytes) {
            return Err(SimError::SegmentOutOfRange {
                addr,
                len: bytes.len(),
            });
        }
        debug!(
            addr = format_args!("{addr:#010x}"),
            len = bytes.len(),
            "segment loaded"
        );
    }
    let entry = file.entry() as u32;
    if router.classify(entry).is_none() {
        return Err(SimError::BadEntryPoint(entry));
    }
    Ok(entry)
}
