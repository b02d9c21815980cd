use crate::error::Error;
use crate::types::{AppSubtype, DataSubtype, PartitionName, PartitionType};

/// Marks a valid record. Erased flash reads as 0xFFFF and ends the table.
pub const PARTITION_MAGIC: u16 = 0x50AA;
pub const PARTITION_RECORD_SIZE: usize = 32;
/// The table never extends beyond this many bytes, even if it is not terminated.
pub const PARTITION_TABLE_MAX_LEN: u32 = 0x0C00;
pub const DEFAULT_PARTITION_TABLE_OFFSET: u32 = 0x8000;
pub const FLASH_SECTOR_SIZE: u32 = 4096;
pub(crate) const PARTITION_NAME_SIZE: usize = 16;

pub const PARTITION_TYPE_APP: u8 = PartitionType::App as u8;
pub const PARTITION_TYPE_DATA: u8 = PartitionType::Data as u8;
/// Always maps to ROM slot 0
pub const APP_SUBTYPE_FACTORY: u8 = 0x00;
/// Also maps to ROM slot 0, later OTA subtypes count up from here
pub const APP_SUBTYPE_OTA_0: u8 = 0x10;
pub const APP_SUBTYPE_TEST: u8 = 0x20;
pub const DATA_SUBTYPE_SYSPARAM: u8 = DataSubtype::Sysparam as u8;

// Compile-time assertion to ensure the table holds a whole number of records
const _: () = assert!(
    (PARTITION_TABLE_MAX_LEN as usize).is_multiple_of(PARTITION_RECORD_SIZE),
    "Partition table length must be a multiple of the record size"
);

/// One record of the partition table.
///
/// Layout on flash, little endian and without padding:
/// `magic: u16, type: u8, subtype: u8, offset: u32, size: u32, name: [u8; 16], flags: u32`
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PartitionInfo {
    pub magic: u16,
    pub type_: u8,
    pub subtype: u8,
    pub offset: u32,
    pub size: u32,
    pub name: PartitionName,
    pub flags: u32,
}

impl PartitionInfo {
    /// Decodes a record read from flash. The slice must be exactly one record long, the magic
    /// is not checked here, see [`PartitionInfo::is_valid`].
    pub fn decode(raw: &[u8]) -> Result<Self, Error> {
        let raw: &[u8; PARTITION_RECORD_SIZE] = raw
            .try_into()
            .map_err(|_| Error::InvalidRecordLength(raw.len()))?;

        let mut name = [0u8; PARTITION_NAME_SIZE];
        name.copy_from_slice(&raw[12..28]);

        Ok(Self {
            magic: u16::from_le_bytes([raw[0], raw[1]]),
            type_: raw[2],
            subtype: raw[3],
            offset: read_u32(raw, 4),
            size: read_u32(raw, 8),
            name: PartitionName(name),
            flags: read_u32(raw, 28),
        })
    }

    pub fn is_valid(&self) -> bool {
        self.magic == PARTITION_MAGIC
    }

    pub fn kind(&self) -> Option<PartitionType> {
        PartitionType::from_repr(self.type_)
    }

    pub fn is_app(&self) -> bool {
        self.type_ == PARTITION_TYPE_APP
    }

    pub fn is_sysparam(&self) -> bool {
        self.type_ == PARTITION_TYPE_DATA && self.subtype == DATA_SUBTYPE_SYSPARAM
    }

    /// `None` for anything but app partitions
    pub fn app_subtype(&self) -> Option<AppSubtype> {
        self.is_app().then(|| AppSubtype::from_raw(self.subtype))
    }

    /// `None` for anything but data partitions with a known subtype
    pub fn data_subtype(&self) -> Option<DataSubtype> {
        if self.type_ != PARTITION_TYPE_DATA {
            return None;
        }
        DataSubtype::from_repr(self.subtype)
    }
}

#[inline(always)]
fn read_u32(raw: &[u8; PARTITION_RECORD_SIZE], at: usize) -> u32 {
    u32::from_le_bytes([raw[at], raw[at + 1], raw[at + 2], raw[at + 3]])
}
