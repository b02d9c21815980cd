use crate::raw::{APP_SUBTYPE_FACTORY, APP_SUBTYPE_OTA_0, PartitionInfo};
use core::fmt;
#[cfg(feature = "defmt")]
use defmt::{debug, trace};

/// Number of ROM slots a boot loader supports unless configured otherwise.
pub const DEFAULT_MAX_ROMS: usize = 4;

/// The ROM slot part of the persisted boot configuration.
///
/// The boot loader loads it from flash before the scan and writes it back only if
/// [`reconcile`] reports a change. This crate never persists it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BootConfig<const MAX_ROMS: usize = DEFAULT_MAX_ROMS> {
    /// Flash offset of the image in each slot
    pub roms: [u32; MAX_ROMS],
    /// Number of slots in use
    pub count: u8,
}

impl<const MAX_ROMS: usize> Default for BootConfig<MAX_ROMS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const MAX_ROMS: usize> BootConfig<MAX_ROMS> {
    pub const fn new() -> Self {
        const { assert!(MAX_ROMS <= u8::MAX as usize, "ROM count is stored in a u8") };
        Self {
            roms: [0; MAX_ROMS],
            count: 0,
        }
    }

    /// Creates a config with the given slots in use. Extra offsets beyond the capacity are
    /// dropped.
    pub fn from_roms(roms: &[u32]) -> Self {
        let mut config = Self::new();
        let count = roms.len().min(MAX_ROMS);
        config.roms[..count].copy_from_slice(&roms[..count]);
        config.count = count as u8;
        config
    }

    pub const fn capacity(&self) -> usize {
        MAX_ROMS
    }

    /// Offset of the image in `slot`, if the slot is in use
    pub fn rom(&self, slot: usize) -> Option<u32> {
        self.active_roms().get(slot).copied()
    }

    pub fn active_roms(&self) -> &[u32] {
        let count = (self.count as usize).min(MAX_ROMS);
        &self.roms[..count]
    }
}

/// Maps an app subtype to its ROM slot. Factory and `ota_0` share slot 0, `ota_n` uses slot n.
/// Subtypes below `ota_0` (other than factory) or beyond the capacity have no slot.
pub const fn slot_index(subtype: u8, capacity: usize) -> Option<usize> {
    let index = if subtype == APP_SUBTYPE_FACTORY {
        0
    } else {
        match subtype.checked_sub(APP_SUBTYPE_OTA_0) {
            Some(index) => index as usize,
            None => return None,
        }
    };

    if index < capacity { Some(index) } else { None }
}

/// Merges the app partitions found in the table into `config`.
///
/// Every partition that maps to a slot is reported to `console`. A slot is only overwritten if
/// its offset differs and when two partitions map to the same slot the later one wins. The slot
/// count becomes the highest slot seen plus one, so an empty table resets it to 0.
///
/// Returns true if `config` changed and has to be persisted again.
pub fn reconcile<const MAX_ROMS: usize, I, W>(
    config: &mut BootConfig<MAX_ROMS>,
    partitions: I,
    console: &mut W,
) -> bool
where
    I: IntoIterator<Item = PartitionInfo>,
    W: fmt::Write,
{
    let mut changed = false;
    let mut rom_count = 0usize;

    for info in partitions {
        if !info.is_app() {
            continue;
        }

        let Some(index) = slot_index(info.subtype, MAX_ROMS) else {
            #[cfg(feature = "defmt")]
            debug!(
                "reconcile: no slot for '{}' subtype {:#04x}",
                info.name, info.subtype
            );
            continue;
        };

        let _ = write!(
            console,
            "Found '{}' @ 0x{:08x}, size 0x{:08x}, subtype 0x{:02X}\r\n",
            info.name, info.offset, info.size, info.subtype
        );

        if config.roms[index] != info.offset {
            #[cfg(feature = "defmt")]
            trace!(
                "reconcile: slot {} {:#08x} -> {:#08x}",
                index, config.roms[index], info.offset
            );

            config.roms[index] = info.offset;
            changed = true;
        }

        rom_count = rom_count.max(index + 1);
    }

    let rom_count = rom_count as u8;
    if config.count != rom_count {
        #[cfg(feature = "defmt")]
        trace!("reconcile: count {} -> {}", config.count, rom_count);

        config.count = rom_count;
        changed = true;
    }

    changed
}
