//! On-disk layout written by `mkdx` and read back by the kernel at boot.
//!
//! Block 0 holds a fixed directory of [`ko6_params::DIR_ENTRIES`] entries;
//! every other block is raw file data. A file's bytes start at the first
//! block of its [`DirEntry::lba`] and run for `size` bytes, padded out to
//! a whole number of blocks. An entry with `name[0] == 0` is unused.
//!
//! | block no. | content                                      |
//! |-----------|-----------------------------------------------|
//! | 0         | [`Directory`] ([`ko6_params::DIR_ENTRIES`] × [`DirEntry`]) |
//! | 1..       | file data, one file's blocks laid out sequentially |

#![no_std]

use dataview::Pod;
use ko6_params::{BLOCK_SIZE, DIR_ENTRIES, DIR_NAME_LEN};
use ko6_types::OsStr;

/// The directory's own block number.
pub const DIRECTORY_LBA: u32 = 0;

/// First block number available for file data.
pub const FIRST_DATA_LBA: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod)]
#[repr(C)]
pub struct DirEntry {
    name: [u8; DIR_NAME_LEN],
    lba: u32,
    size: u32,
}
const _: () = assert!(size_of::<DirEntry>() == DIR_NAME_LEN + 8);

impl DirEntry {
    pub const EMPTY: Self = Self {
        name: [0; DIR_NAME_LEN],
        lba: 0,
        size: 0,
    };

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name[0] == 0
    }

    #[must_use]
    pub fn name(&self) -> &OsStr {
        let len = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.name.len());
        OsStr::from_bytes(&self.name[..len])
    }

    /// Sets the entry's name, truncating to [`ko6_params::DIR_NAME_LEN`] - 1
    /// bytes to leave room for the NUL terminator.
    pub fn set_name(&mut self, name: &OsStr) {
        let len = usize::min(name.len(), self.name.len() - 1);
        self.name[..len].copy_from_slice(&name.as_bytes()[..len]);
        self.name[len..].fill(0);
    }

    #[must_use]
    pub fn lba(&self) -> u32 {
        self.lba
    }

    pub fn set_lba(&mut self, lba: u32) {
        self.lba = lba;
    }

    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn set_size(&mut self, size: u32) {
        self.size = size;
    }

    /// Number of `BLOCK_SIZE` blocks this file's data occupies.
    #[must_use]
    pub fn block_count(&self) -> u32 {
        self.size.div_ceil(u32::try_from(BLOCK_SIZE).unwrap())
    }
}

#[derive(Pod)]
#[repr(C)]
pub struct Directory {
    entries: [DirEntry; DIR_ENTRIES],
}
const _: () = assert!(size_of::<Directory>() <= BLOCK_SIZE);

impl Directory {
    #[must_use]
    pub fn entries(&self) -> &[DirEntry] {
        &self.entries
    }

    #[must_use]
    pub fn entries_mut(&mut self) -> &mut [DirEntry] {
        &mut self.entries
    }

    /// Looks up a file by name.
    #[must_use]
    pub fn find(&self, name: &OsStr) -> Option<&DirEntry> {
        self.entries.iter().find(|e| !e.is_empty() && e.name() == name)
    }

    /// Finds the first unused slot, if any.
    #[must_use]
    pub fn find_free(&mut self) -> Option<&mut DirEntry> {
        self.entries.iter_mut().find(|e| e.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_entry_has_no_name_byte() {
        assert!(DirEntry::EMPTY.is_empty());
    }

    #[test]
    fn set_name_truncates_and_nul_pads() {
        let mut e = DirEntry::EMPTY;
        e.set_name(OsStr::new("hello"));
        assert_eq!(e.name(), OsStr::new("hello"));
        assert!(!e.is_empty());
    }

    #[test]
    fn block_count_rounds_up() {
        let mut e = DirEntry::EMPTY;
        e.set_size(1);
        assert_eq!(e.block_count(), 1);
        e.set_size(u32::try_from(BLOCK_SIZE).unwrap());
        assert_eq!(e.block_count(), 1);
        e.set_size(u32::try_from(BLOCK_SIZE).unwrap() + 1);
        assert_eq!(e.block_count(), 2);
    }
}
