#![allow(dead_code)]

// filename according to https://doc.rust-lang.org/book/ch11-03-test-organization.html
use embedded_storage::nor_flash::{
    ErrorType, NorFlash, NorFlashError, NorFlashErrorKind, ReadNorFlash,
};

pub const FLASH_SECTOR_SIZE: usize = 4096;
// Taken from https://github.com/esp-rs/esp-hal/blob/main/esp-storage/src/stub.rs
pub const WORD_SIZE: usize = 4;
pub const TABLE_OFFSET: u32 = 0x8000;
pub const RECORD_SIZE: usize = 32;
pub const MAGIC: u16 = 0x50AA;

#[derive(Default)]
pub struct Flash {
    pub buf: Vec<u8>,
    pub fail_after_operation: usize,
    pub fail_erase_at: Option<u32>,
    pub operations: Vec<Operation>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Operation {
    Read { offset: u32, len: usize },
    Erase { offset: u32, len: usize },
}

/// A single partition table record, encoded the same way esp-idf's gen_esp32part.py does.
#[derive(Debug, Clone)]
pub struct Record {
    pub type_: u8,
    pub subtype: u8,
    pub offset: u32,
    pub size: u32,
    pub name: &'static str,
}

impl Record {
    pub fn app(name: &'static str, subtype: u8, offset: u32, size: u32) -> Self {
        Self {
            type_: 0x00,
            subtype,
            offset,
            size,
            name,
        }
    }

    pub fn data(name: &'static str, subtype: u8, offset: u32, size: u32) -> Self {
        Self {
            type_: 0x01,
            subtype,
            offset,
            size,
            name,
        }
    }

    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut raw = [0u8; RECORD_SIZE];
        raw[0..2].copy_from_slice(&MAGIC.to_le_bytes());
        raw[2] = self.type_;
        raw[3] = self.subtype;
        raw[4..8].copy_from_slice(&self.offset.to_le_bytes());
        raw[8..12].copy_from_slice(&self.size.to_le_bytes());
        let name = self.name.as_bytes();
        assert!(name.len() <= 16);
        raw[12..12 + name.len()].copy_from_slice(name);
        raw
    }
}

impl Flash {
    pub fn new(pages: usize) -> Self {
        Self {
            buf: vec![0xffu8; FLASH_SECTOR_SIZE * pages],
            fail_after_operation: usize::MAX,
            ..Default::default()
        }
    }

    pub fn new_with_fault(pages: usize, fail_after_operation: usize) -> Self {
        Self {
            buf: vec![0xffu8; FLASH_SECTOR_SIZE * pages],
            fail_after_operation,
            ..Default::default()
        }
    }

    /// Creates a flash of `pages` sectors with the given records written to the partition table
    /// at `TABLE_OFFSET`. Everything else stays erased.
    pub fn with_table(pages: usize, records: &[Record]) -> Self {
        let mut flash = Self::new(pages);
        flash.write_table(records);
        flash
    }

    pub fn write_table(&mut self, records: &[Record]) {
        for (i, record) in records.iter().enumerate() {
            self.write_raw_record(i, &record.encode());
        }
    }

    pub fn write_raw_record(&mut self, index: usize, raw: &[u8; RECORD_SIZE]) {
        let offset = TABLE_OFFSET as usize + index * RECORD_SIZE;
        self.buf[offset..offset + RECORD_SIZE].copy_from_slice(raw);
    }

    /// Fills `[offset, offset + len)` with a pattern so that erases are visible
    pub fn fill(&mut self, offset: usize, len: usize, value: u8) {
        self.buf[offset..offset + len].fill(value);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn disable_faults(&mut self) {
        self.fail_after_operation = usize::MAX;
        self.fail_erase_at = None;
    }

    pub fn clear_operations(&mut self) {
        self.operations.clear();
    }

    pub fn reads(&self) -> Vec<u32> {
        self.operations
            .iter()
            .filter_map(|op| match op {
                Operation::Read { offset, .. } => Some(*offset),
                _ => None,
            })
            .collect()
    }

    pub fn erased_sectors(&self) -> Vec<u32> {
        self.operations
            .iter()
            .filter_map(|op| match op {
                Operation::Erase { offset, len } => {
                    assert_eq!(*len, FLASH_SECTOR_SIZE);
                    Some(*offset / FLASH_SECTOR_SIZE as u32)
                }
                _ => None,
            })
            .collect()
    }

    pub fn dump_operations(&self) {
        println!("Operations:");
        for op in &self.operations {
            println!("  {:?}", op);
        }
    }
}

#[derive(Debug)]
pub struct FlashError;

impl NorFlashError for FlashError {
    fn kind(&self) -> NorFlashErrorKind {
        NorFlashErrorKind::Other
    }
}

impl ErrorType for Flash {
    type Error = FlashError;
}

impl ReadNorFlash for Flash {
    const READ_SIZE: usize = WORD_SIZE;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        assert!(offset.is_multiple_of(Self::READ_SIZE as _));

        println!(
            "    flash: read:  0x{offset:06X}[0x{:04X}] #{:>2}",
            bytes.len(),
            self.operations.len()
        );
        if self.operations.len() >= self.fail_after_operation {
            println!("    flash: FAULT");
            return Err(FlashError);
        }
        self.operations.push(Operation::Read {
            offset,
            len: bytes.len(),
        });

        let offset = offset as usize;
        bytes.copy_from_slice(&self.buf[offset..offset + bytes.len()]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.buf.len()
    }
}

impl NorFlash for Flash {
    const WRITE_SIZE: usize = WORD_SIZE;

    const ERASE_SIZE: usize = FLASH_SECTOR_SIZE;

    fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
        assert!(from.is_multiple_of(Self::ERASE_SIZE as _));
        assert!(to.is_multiple_of(Self::ERASE_SIZE as _));

        println!(
            "    flash: erase: {from:06X} - {to:06X} #{:>2}",
            self.operations.len()
        );

        if self.operations.len() >= self.fail_after_operation || self.fail_erase_at == Some(from)
        {
            println!("    flash: FAULT");
            return Err(FlashError);
        }

        self.operations.push(Operation::Erase {
            offset: from,
            len: (to - from) as usize,
        });

        for addr in from..to {
            self.buf[addr as usize] = 0xff;
        }
        Ok(())
    }

    fn write(&mut self, _offset: u32, _bytes: &[u8]) -> Result<(), Self::Error> {
        panic!("the partition scanner must never write to flash");
    }
}
