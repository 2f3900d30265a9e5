//! File-backed disk manager.
//!
//! The [`FileDiskManager`] handles all direct file operations:
//! - Reading and writing pages
//! - Allocating and freeing runs of pages through an on-disk space map
//! - Managing the database file

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::debug;

use crate::common::config::{MAX_PAGES, PAGE_SIZE};
use crate::common::{Error, PageId, Result};
use crate::storage::disk_manager::DiskManager;
use crate::storage::page::Page;

/// Marks a file as carrying a space map: "CPSM".
const SPACE_MAP_MAGIC: u32 = 0x4D53_5043;
const OFFSET_MAGIC: usize = 0;
const OFFSET_CHECKSUM: usize = 4;
const OFFSET_BITMAP: usize = 8;

/// Manages disk I/O for a single database file.
///
/// # File Layout
/// The first file page holds the space map; data pages follow it:
/// ```text
/// ┌───────────┬─────────┬─────────┬─────────┬─────────┐
/// │ SpaceMap  │ Page 0  │ Page 1  │  ...    │ Page N  │
/// │ (4KB)     │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └───────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096      8192     ...   (N+1)×4096
/// ```
///
/// The space map is a magic number, a CRC32 of the bitmap, then one bit per
/// page identifier (set = allocated). A map whose checksum does not match is
/// rejected on open.
///
/// # Thread Safety
/// `FileDiskManager` is **single-threaded**. The `BufferPoolManager` is
/// responsible for serializing access to it.
///
/// # Durability
/// Every page write and every space-map change is followed by `fsync()`.
pub struct FileDiskManager {
    file: File,
    space_map: SpaceMap,
}

impl FileDiskManager {
    /// Create a new database file.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;

        let mut dm = Self {
            file,
            space_map: SpaceMap::new(),
        };
        dm.persist_space_map()?;
        Ok(dm)
    }

    /// Open an existing database file.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be opened, and
    /// `CorruptSpaceMap` if its space map fails validation.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = OpenOptions::new().read(true).write(true).open(&path)?;

        if file.metadata()?.len() < PAGE_SIZE as u64 {
            return Err(Error::CorruptSpaceMap("file shorter than one page".into()));
        }

        let mut map_page = Page::new();
        file.seek(SeekFrom::Start(0))?;
        file.read_exact(map_page.as_mut_slice())?;
        let space_map = SpaceMap::decode(&map_page)?;

        debug!(
            "opened database file with {} allocated pages",
            space_map.allocated_count()
        );
        Ok(Self { file, space_map })
    }

    /// Open an existing database file, or create if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// Whether `page_id` is currently allocated.
    #[inline]
    pub fn is_allocated(&self, page_id: PageId) -> bool {
        self.space_map.is_allocated(page_id.0)
    }

    /// Number of allocated pages.
    #[inline]
    pub fn allocated_count(&self) -> u32 {
        self.space_map.allocated_count()
    }

    /// Get the total size of the database file in bytes.
    pub fn file_size(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    fn offset_of(page_id: PageId) -> u64 {
        (page_id.0 as u64 + 1) * PAGE_SIZE as u64
    }

    fn check_allocated(&self, page_id: PageId) -> Result<()> {
        if self.is_allocated(page_id) {
            Ok(())
        } else {
            Err(Error::PageNotAllocated(page_id))
        }
    }

    /// Grow the file to `end` bytes so every page below it reads as zeros.
    fn extend_to(&mut self, end: u64) -> Result<()> {
        if self.file.metadata()?.len() < end {
            self.file.set_len(end)?;
        }
        Ok(())
    }

    fn persist_space_map(&mut self) -> Result<()> {
        let page = self.space_map.encode();
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(page.as_slice())?;
        self.file.sync_all()?;
        Ok(())
    }
}

impl DiskManager for FileDiskManager {
    fn allocate_page(&mut self, run_length: usize) -> Result<PageId> {
        if run_length == 0 {
            return Err(Error::InvalidRunLength(run_length));
        }
        let full = || Error::DiskFull {
            requested: run_length,
        };
        let run = u32::try_from(run_length).map_err(|_| full())?;
        let first = self.space_map.find_run(run).ok_or_else(full)?;

        for n in 0..run {
            self.space_map.set(first + n, true);
        }

        let end = Self::offset_of(PageId::new(first + run - 1)) + PAGE_SIZE as u64;
        if let Err(e) = self.extend_to(end).and_then(|()| self.persist_space_map()) {
            for n in 0..run {
                self.space_map.set(first + n, false);
            }
            return Err(e);
        }

        debug!("allocated run of {} pages at {}", run, PageId::new(first));
        Ok(PageId::new(first))
    }

    fn deallocate_page(&mut self, page_id: PageId) -> Result<()> {
        self.check_allocated(page_id)?;

        self.space_map.set(page_id.0, false);
        if let Err(e) = self.persist_space_map() {
            self.space_map.set(page_id.0, true);
            return Err(e);
        }
        Ok(())
    }

    fn read_page(&mut self, page_id: PageId, page: &mut Page) -> Result<()> {
        self.check_allocated(page_id)?;

        self.file.seek(SeekFrom::Start(Self::offset_of(page_id)))?;
        self.file.read_exact(page.as_mut_slice())?;
        Ok(())
    }

    fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        self.check_allocated(page_id)?;

        self.file.seek(SeekFrom::Start(Self::offset_of(page_id)))?;
        self.file.write_all(page.as_slice())?;
        self.file.sync_all()?; // fsync for durability
        Ok(())
    }
}

/// In-memory image of the allocation bitmap.
struct SpaceMap {
    bits: Vec<u8>,
}

impl SpaceMap {
    fn new() -> Self {
        Self {
            bits: vec![0u8; PAGE_SIZE - OFFSET_BITMAP],
        }
    }

    fn is_allocated(&self, index: u32) -> bool {
        index < MAX_PAGES && self.bits[index as usize / 8] & (1 << (index % 8)) != 0
    }

    fn set(&mut self, index: u32, allocated: bool) {
        let byte = &mut self.bits[index as usize / 8];
        if allocated {
            *byte |= 1 << (index % 8);
        } else {
            *byte &= !(1 << (index % 8));
        }
    }

    fn allocated_count(&self) -> u32 {
        self.bits.iter().map(|b| b.count_ones()).sum()
    }

    /// First-fit search for `run` consecutive free identifiers.
    fn find_run(&self, run: u32) -> Option<u32> {
        let mut free = 0;
        for index in 0..MAX_PAGES {
            if self.is_allocated(index) {
                free = 0;
                continue;
            }
            free += 1;
            if free == run {
                return Some(index + 1 - run);
            }
        }
        None
    }

    fn encode(&self) -> Page {
        let mut page = Page::new();
        let data = page.as_mut_slice();
        data[OFFSET_MAGIC..OFFSET_MAGIC + 4].copy_from_slice(&SPACE_MAP_MAGIC.to_le_bytes());
        data[OFFSET_CHECKSUM..OFFSET_CHECKSUM + 4]
            .copy_from_slice(&crc32fast::hash(&self.bits).to_le_bytes());
        data[OFFSET_BITMAP..].copy_from_slice(&self.bits);
        page
    }

    fn decode(page: &Page) -> Result<Self> {
        let data = page.as_slice();
        let word = |at: usize| {
            let mut bytes = [0u8; 4];
            bytes.copy_from_slice(&data[at..at + 4]);
            u32::from_le_bytes(bytes)
        };

        if word(OFFSET_MAGIC) != SPACE_MAP_MAGIC {
            return Err(Error::CorruptSpaceMap("bad magic".into()));
        }
        let bits = data[OFFSET_BITMAP..].to_vec();
        let expected = word(OFFSET_CHECKSUM);
        let actual = crc32fast::hash(&bits);
        if expected != actual {
            return Err(Error::CorruptSpaceMap(format!(
                "checksum mismatch: stored {expected:#010x}, computed {actual:#010x}"
            )));
        }
        Ok(Self { bits })
    }
}
