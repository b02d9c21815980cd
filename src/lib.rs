#![doc = include_str ! ("../README.md")]
#![cfg_attr(not(target_arch = "x86_64"), no_std)]

pub mod error;
pub mod platform;
mod raw;
pub mod slots;
#[cfg(feature = "sysparam-erase")]
pub mod sysparam;
mod table;
pub mod types;

pub use raw::{
    APP_SUBTYPE_FACTORY, APP_SUBTYPE_OTA_0, APP_SUBTYPE_TEST, DATA_SUBTYPE_SYSPARAM,
    DEFAULT_PARTITION_TABLE_OFFSET, FLASH_SECTOR_SIZE, PARTITION_MAGIC, PARTITION_RECORD_SIZE,
    PARTITION_TABLE_MAX_LEN, PARTITION_TYPE_APP, PARTITION_TYPE_DATA, PartitionInfo,
};
pub use slots::{BootConfig, DEFAULT_MAX_ROMS, reconcile, slot_index};
pub use table::Entries;

use crate::error::Error;
use crate::platform::{AlignedOps, Platform};
#[cfg(feature = "sysparam-erase")]
use crate::table::TableCursor;
use core::fmt;
#[cfg(feature = "defmt")]
use defmt::info;

/// The partition table of a flash chip, read lazily on every call.
pub struct PartitionTable<T: Platform> {
    pub(crate) hal: T,
    pub(crate) base_address: u32,
}

impl<T: Platform> PartitionTable<T> {
    /// `base_address` is the absolute flash offset of the first record, usually
    /// [`DEFAULT_PARTITION_TABLE_OFFSET`]. It has to be aligned to the read size of the flash.
    pub fn new(base_address: u32, hal: T) -> Result<PartitionTable<T>, Error> {
        if !T::is_read_aligned(base_address) {
            return Err(Error::InvalidTableOffset);
        }

        if base_address.checked_add(PARTITION_TABLE_MAX_LEN).is_none() {
            return Err(Error::InvalidTableOffset);
        }

        Ok(Self { hal, base_address })
    }

    pub fn base_address(&self) -> u32 {
        self.base_address
    }

    /// Gives the flash back, e.g. to continue loading the selected image.
    pub fn release(self) -> T {
        self.hal
    }

    /// All valid records in table order.
    pub fn entries(&mut self) -> Entries<'_, T> {
        Entries::new(&mut self.hal, self.base_address)
    }

    /// App partitions in table order.
    pub fn applications(&mut self) -> impl Iterator<Item = PartitionInfo> + '_ {
        self.entries().filter(PartitionInfo::is_app)
    }

    /// Data partitions holding the SDK system parameters.
    pub fn sysparam_partitions(&mut self) -> impl Iterator<Item = PartitionInfo> + '_ {
        self.entries().filter(PartitionInfo::is_sysparam)
    }

    /// The first record with the given raw type and subtype.
    pub fn find(&mut self, type_: u8, subtype: u8) -> Option<PartitionInfo> {
        self.entries()
            .find(|info| info.type_ == type_ && info.subtype == subtype)
    }

    /// Refreshes the ROM slots of `config` from the app partitions in the table and prints a
    /// line per partition to `console`.
    ///
    /// Returns true if `config` changed. Persisting it is up to the caller.
    pub fn scan_roms<const MAX_ROMS: usize, W: fmt::Write>(
        &mut self,
        config: &mut BootConfig<MAX_ROMS>,
        console: &mut W,
    ) -> bool {
        let changed = reconcile(config, self.applications(), console);

        #[cfg(feature = "defmt")]
        info!("scan_roms: {} roms, changed: {}", config.count, changed);

        changed
    }

    /// Erases every sysparam partition sector by sector.
    ///
    /// A read error ends the scan early and is not reported. An erase error aborts with
    /// [`Error::FlashError`], sectors erased before that stay erased.
    ///
    /// Returns the number of erased sectors.
    #[cfg(feature = "sysparam-erase")]
    pub fn erase_sysparam<W: fmt::Write>(&mut self, console: &mut W) -> Result<u32, Error> {
        #[cfg(feature = "defmt")]
        info!("erase_sysparam: erasing SDK config partition");

        let _ = console.write_str("Erasing SDK config partition.\r\n");

        let mut erased = 0;
        let mut cursor = TableCursor::new(self.base_address);
        while let Some(info) = cursor.next_record(&mut self.hal) {
            if !info.is_sysparam() {
                continue;
            }
            erased += sysparam::erase_sectors(&mut self.hal, sysparam::sector_range(&info))?;
        }
        Ok(erased)
    }
}
