use core::fmt;
use embedded_storage::nor_flash::NorFlash;

/// Any NOR flash works, reads are issued per partition record and erases per sector.
/// `&mut T` is accepted as well thanks to the blanket impls of `embedded-storage`.
pub trait Platform: NorFlash {}

impl<T: NorFlash> Platform for T {}

pub trait AlignedOps: Platform {
    fn is_read_aligned(offset: u32) -> bool {
        (offset as usize).is_multiple_of(Self::READ_SIZE)
    }
}

impl<T: Platform> AlignedOps for T {}

/// Console sink that drops every diagnostic line. Use it when the boot loader has no UART
/// output configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullConsole;

impl fmt::Write for NullConsole {
    fn write_str(&mut self, _s: &str) -> fmt::Result {
        Ok(())
    }
}

#[cfg(any(
    feature = "esp32",
    feature = "esp32s2",
    feature = "esp32s3",
    feature = "esp32c2",
    feature = "esp32c3",
    feature = "esp32c6",
    feature = "esp32h2",
))]
mod chip {
    /// The on-chip SPI flash driver already implements `NorFlash` and can be passed as is.
    pub use esp_storage::FlashStorage as EspFlash;
}

#[cfg(any(
    feature = "esp32",
    feature = "esp32s2",
    feature = "esp32s3",
    feature = "esp32c2",
    feature = "esp32c3",
    feature = "esp32c6",
    feature = "esp32h2",
))]
pub use chip::*;
