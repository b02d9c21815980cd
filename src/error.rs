use thiserror::Error;

/// Errors that can occur while scanning the partition table. Reaching the end of the table,
/// an erased record or a record that does not map to a ROM slot are not errors.
#[derive(Error, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// The partition table offset has to be aligned to the flash read size
    #[error("invalid partition table offset")]
    InvalidTableOffset,

    /// A partition record is exactly 32 bytes, the wrong length is reported
    #[error("invalid partition record length: {0}")]
    InvalidRecordLength(usize),

    /// A partition reaches beyond the 32 bit flash address space
    #[error("partition exceeds the flash address space")]
    AddressOverflow,

    /// The internal error value is returned from the provided `&mut impl NorFlash`. Only erase
    /// failures surface this way, read failures just end the scan.
    #[error("internal flash error")]
    FlashError,
}
