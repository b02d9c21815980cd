use crate::raw::{
    APP_SUBTYPE_FACTORY, APP_SUBTYPE_OTA_0, APP_SUBTYPE_TEST, PARTITION_NAME_SIZE,
};
use core::fmt;

/// Main partition type. Values outside of app and data are legal in a table (custom
/// types), `PartitionInfo` keeps the raw byte for those.
#[derive(strum::FromRepr, strum::Display, Debug, Eq, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PartitionType {
    App = 0x00,
    Data = 0x01,
}

/// Subtype of an app partition.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppSubtype {
    Factory,
    /// OTA image number, `ota_0` is `Ota(0)`
    Ota(u8),
    Test,
    Other(u8),
}

const APP_SUBTYPE_OTA_LAST: u8 = APP_SUBTYPE_OTA_0 + 15;

impl AppSubtype {
    pub const fn from_raw(subtype: u8) -> Self {
        match subtype {
            APP_SUBTYPE_FACTORY => AppSubtype::Factory,
            APP_SUBTYPE_OTA_0..=APP_SUBTYPE_OTA_LAST => AppSubtype::Ota(subtype - APP_SUBTYPE_OTA_0),
            APP_SUBTYPE_TEST => AppSubtype::Test,
            other => AppSubtype::Other(other),
        }
    }
}

/// Subtype of a data partition. `Sysparam` is the SDK system parameter area which a boot
/// mode may erase.
#[derive(strum::FromRepr, strum::Display, Debug, Eq, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DataSubtype {
    Ota = 0x00,
    Phy = 0x01,
    Nvs = 0x02,
    CoreDump = 0x03,
    NvsKeys = 0x04,
    EFuse = 0x05,
    Sysparam = 0x40,
    Fat = 0x81,
    Spiffs = 0x82,
    LittleFs = 0x83,
}

/// The NUL padded name of a partition. Only used for diagnostics.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub struct PartitionName(pub(crate) [u8; PARTITION_NAME_SIZE]);

impl PartitionName {
    pub const fn from_array(raw: [u8; PARTITION_NAME_SIZE]) -> Self {
        Self(raw)
    }

    pub const fn as_bytes(&self) -> &[u8; PARTITION_NAME_SIZE] {
        &self.0
    }

    /// The name up to the first NUL byte. A name filling all 16 bytes has no terminator.
    pub fn trimmed(&self) -> &[u8] {
        match self.0.iter().position(|&e| e == 0x00) {
            None => &self.0,
            Some(idx) => &self.0[..idx],
        }
    }
}

impl fmt::Display for PartitionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // names come straight from flash, so escape anything that is not printable ascii
        for &byte in self.trimmed() {
            write!(f, "{}", core::ascii::escape_default(byte))?;
        }
        Ok(())
    }
}

impl fmt::Debug for PartitionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PartitionName(\"{self}\")")
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PartitionName {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=[u8]:a}", self.trimmed())
    }
}
