use crate::error::Error;
use crate::platform::Platform;
use crate::raw::{FLASH_SECTOR_SIZE, PartitionInfo};
use core::ops::Range;
#[cfg(feature = "defmt")]
use defmt::{trace, warn};

/// Sectors covered by a partition. A partial trailing sector is not part of the range, so a
/// partition smaller than one sector covers no sector at all.
pub fn sector_range(info: &PartitionInfo) -> Range<u32> {
    let first = info.offset / FLASH_SECTOR_SIZE;
    first..first.saturating_add(info.size / FLASH_SECTOR_SIZE)
}

/// Erases `sectors` one by one in ascending order. Returns the number of erased sectors.
pub(crate) fn erase_sectors<T: Platform>(hal: &mut T, sectors: Range<u32>) -> Result<u32, Error> {
    let mut erased = 0;
    for sector in sectors {
        let from = sector
            .checked_mul(FLASH_SECTOR_SIZE)
            .filter(|from| from.checked_add(FLASH_SECTOR_SIZE).is_some())
            .ok_or(Error::AddressOverflow)?;

        #[cfg(feature = "defmt")]
        trace!("erase_sectors: sector {} @{:#08x}", sector, from);

        hal.erase(from, from + FLASH_SECTOR_SIZE).map_err(|_| {
            #[cfg(feature = "defmt")]
            warn!("erase_sectors: failed @{:#08x}", from);

            Error::FlashError
        })?;
        erased += 1;
    }
    Ok(erased)
}
