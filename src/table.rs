use crate::platform::Platform;
use crate::raw::{PARTITION_RECORD_SIZE, PARTITION_TABLE_MAX_LEN, PartitionInfo};
#[cfg(feature = "defmt")]
use defmt::{debug, trace};

/// Read position within the partition table. Borrows the flash only for a single step, so the
/// caller can use the flash in between, e.g. to erase a partition it just found.
///
/// The walk ends at the first record without the magic value, once
/// [`PARTITION_TABLE_MAX_LEN`] bytes have been read, or when the flash reports a read
/// error. None of these are errors: the boot loader continues with whatever was found so far.
#[derive(Debug, Clone)]
pub(crate) struct TableCursor {
    base_address: u32,
    position: u32,
    done: bool,
}

impl TableCursor {
    pub(crate) fn new(base_address: u32) -> Self {
        Self {
            base_address,
            position: 0,
            done: false,
        }
    }

    pub(crate) fn next_record<T: Platform>(&mut self, hal: &mut T) -> Option<PartitionInfo> {
        if self.done || self.position >= PARTITION_TABLE_MAX_LEN {
            return None;
        }

        match self.read_record(hal) {
            Some(info) => {
                self.position += PARTITION_RECORD_SIZE as u32;
                Some(info)
            }
            None => {
                self.done = true;
                None
            }
        }
    }

    fn read_record<T: Platform>(&self, hal: &mut T) -> Option<PartitionInfo> {
        let address = self.base_address + self.position;

        #[cfg(feature = "defmt")]
        trace!("read_record: @{:#08x}", address);

        let mut buf = [0u8; PARTITION_RECORD_SIZE];
        if hal.read(address, &mut buf).is_err() {
            #[cfg(feature = "defmt")]
            debug!("read_record: flash read failed @{:#08x}", address);

            #[cfg(feature = "debug-logs")]
            println!("  TableCursor: read failed @{address:#08x}");

            return None;
        }

        let info = PartitionInfo::decode(&buf).ok()?;
        if !info.is_valid() {
            #[cfg(feature = "debug-logs")]
            println!(
                "  TableCursor: end of table @{address:#08x} (magic {:#06x})",
                info.magic
            );

            return None;
        }

        #[cfg(feature = "debug-logs")]
        println!("  TableCursor: {info:?}");

        Some(info)
    }
}

/// Iterator over all valid records of a partition table in flash order.
pub struct Entries<'a, T: Platform> {
    hal: &'a mut T,
    cursor: TableCursor,
}

impl<'a, T: Platform> Entries<'a, T> {
    pub(crate) fn new(hal: &'a mut T, base_address: u32) -> Self {
        Self {
            hal,
            cursor: TableCursor::new(base_address),
        }
    }
}

impl<T: Platform> Iterator for Entries<'_, T> {
    type Item = PartitionInfo;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next_record(&mut *self.hal)
    }
}

impl<T: Platform> core::iter::FusedIterator for Entries<'_, T> {}
