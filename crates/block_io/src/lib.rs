//! Cache for block I/O, keyed by `(block device id, logical block address)`.
//!
//! A fixed number of page-sized buffers are shared by every block device.
//! A buffer holding dirty data survives eviction attempts until it has been
//! written back; a locked buffer is never evicted regardless of reference
//! count. Lookup by key is backed by a fixed-capacity hash index sized by
//! `CAPACITY`, kept alongside the most-recently-used linked list that
//! eviction and `flush` still walk in order.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

use alloc::{boxed::Box, collections::linked_list::LinkedList, sync::Arc};
use dataview::{Pod, PodMethods as _};
use heapless::FnvIndexMap;
use mutex_api::Mutex;

/// A key identifying a cached block: `(block device id, logical block address)`.
pub type BlockKey = (u32, u32);

pub trait BlockDevice<const BLOCK_SIZE: usize> {
    type Error;

    fn read(&self, bdev: u32, lba: u32, data: &mut [u8; BLOCK_SIZE]) -> Result<(), Self::Error>;
    fn write(&self, bdev: u32, lba: u32, data: &[u8; BLOCK_SIZE]) -> Result<(), Self::Error>;
}

/// A buffer cache for block I/O.
pub struct BlockIoCache<Device, BufferListMutex> {
    device: Device,
    buffers: BufferListMutex,
}

/// All buffers, in two views over the same [`Arc`]s: an MRU-ordered list
/// (`order.front()` most recent, `order.back()` least) that eviction and
/// [`BlockIoCache::flush`] walk, and a `(bdev, lba) -> buffer` index that
/// lookup uses instead. `index` only ever holds buffers currently assigned
/// to a real key; a buffer still carrying [`UNUSED_KEY`] is absent from it,
/// since every unused slot shares that same key.
pub struct BufferList<BlockDataMutex, const CAPACITY: usize> {
    order: LinkedList<Arc<Block<BlockDataMutex>>>,
    index: FnvIndexMap<BlockKey, Arc<Block<BlockDataMutex>>, CAPACITY>,
}

/// A block buffer.
struct Block<BlockDataMutex> {
    /// Cache key. `(u32::MAX, u32::MAX)` while unused.
    key: BlockKey,

    /// Block data.
    data: BlockDataMutex,
}

pub struct BlockHandle<'a, Device, BufferListMutex, BlockDataMutex, const CAPACITY: usize>
where
    BufferListMutex: Mutex<Data = BufferList<BlockDataMutex, CAPACITY>>,
{
    key: BlockKey,
    cache: &'a BlockIoCache<Device, BufferListMutex>,
    block: Arc<Block<BlockDataMutex>>,
}

/// A reference to a block buffer.
pub struct BlockGuard<
    'a,
    'b,
    Device,
    BufferListMutex,
    BlockDataMutex,
    const BLOCK_SIZE: usize,
    const CAPACITY: usize,
    const VALID: bool,
> where
    BufferListMutex: Mutex<Data = BufferList<BlockDataMutex, CAPACITY>>,
    BlockDataMutex: Mutex<Data = BlockData<BLOCK_SIZE>> + 'b,
{
    key: BlockKey,

    /// Reference to the block I/O cache
    cache: &'a BlockIoCache<Device, BufferListMutex>,

    /// Reference to the block itself.
    block: Arc<Block<BlockDataMutex>>,

    /// Block data.
    data: BlockDataMutex::Guard<'b>,
}

/// A block cache data.
pub struct BlockData<const BLOCK_SIZE: usize> {
    key: BlockKey,
    valid: bool,
    dirty: bool,
    locked: bool,
    data: Box<[u8; BLOCK_SIZE]>,
}

const UNUSED_KEY: BlockKey = (u32::MAX, u32::MAX);

impl<Device, BufferListMutex, BlockDataMutex, const BLOCK_SIZE: usize, const CAPACITY: usize>
    BlockIoCache<Device, BufferListMutex>
where
    BufferListMutex: Mutex<Data = BufferList<BlockDataMutex, CAPACITY>>,
    BlockDataMutex: Mutex<Data = BlockData<BLOCK_SIZE>>,
{
    pub fn new(device: Device) -> Self {
        Self {
            device,
            buffers: BufferListMutex::new(BufferList {
                order: LinkedList::new(),
                index: FnvIndexMap::new(),
            }),
        }
    }

    /// Initializes the block I/O cache with `num_block` buffers.
    ///
    /// `CAPACITY` (the cache's hash index size) must be a power of two at
    /// least as large as `num_block`.
    ///
    /// # Panics
    ///
    /// Panics if:
    ///
    /// * `num_block` is 0.
    /// * `num_block` exceeds `CAPACITY`.
    /// * The cache is already initialized.
    pub fn init(&self, num_block: usize) {
        assert!(num_block > 0);
        assert!(num_block <= CAPACITY, "block cache index too small for buffer count");
        let mut buffers = self.buffers.lock();
        assert!(buffers.order.is_empty());

        for _ in 0..num_block {
            buffers.order.push_back(Arc::new(Block {
                key: UNUSED_KEY,
                data: BlockDataMutex::new(BlockData {
                    key: UNUSED_KEY,
                    valid: false,
                    dirty: false,
                    locked: false,
                    data: Box::new([0; BLOCK_SIZE]),
                }),
            }));
        }
    }
}

impl<Device, BufferListMutex, BlockDataMutex, const BLOCK_SIZE: usize, const CAPACITY: usize>
    BlockIoCache<Device, BufferListMutex>
where
    Device: BlockDevice<BLOCK_SIZE>,
    BufferListMutex: Mutex<Data = BufferList<BlockDataMutex, CAPACITY>>,
    BlockDataMutex: Mutex<Data = BlockData<BLOCK_SIZE>>,
{
    /// Returns a handle to the buffer caching `key`.
    ///
    /// If the key is already cached, returns a handle to it (incrementing its
    /// reference count) in O(1) via the hash index. Otherwise recycles the
    /// least recently used unreferenced, unlocked buffer, writing its
    /// contents back first if they are dirty. If all buffers are referenced
    /// or locked, returns `None`.
    ///
    /// # Panics
    ///
    /// Panics if the cache is not initialized.
    pub fn try_get(
        &self,
        key: BlockKey,
    ) -> Result<Option<BlockHandle<'_, Device, BufferListMutex, BlockDataMutex, CAPACITY>>, Device::Error>
    {
        let mut buffers = self.buffers.lock();
        assert!(!buffers.order.is_empty());

        if let Some(buf) = buffers.index.get(&key) {
            return Ok(Some(BlockHandle {
                key,
                cache: self,
                block: Arc::clone(buf),
            }));
        }

        // Not cached. Recycle the least recently used unreferenced, unlocked
        // buffer, keeping `order` and `index` consistent.
        let BufferList { order, index } = &mut *buffers;
        for buf in order.iter_mut().rev() {
            let Some(buf_mut) = Arc::get_mut(buf) else {
                continue;
            };
            let mut data = buf_mut.data.lock();
            if data.locked {
                continue;
            }
            if data.valid && data.dirty {
                self.device.write(data.key.0, data.key.1, &data.data)?;
                data.dirty = false;
            }
            let old_key = buf_mut.key;
            data.key = key;
            data.valid = false;
            buf_mut.key = key;
            drop(data);

            if old_key != UNUSED_KEY {
                index.remove(&old_key);
            }
            let _ = index.insert(key, Arc::clone(buf));

            return Ok(Some(BlockHandle {
                key,
                cache: self,
                block: Arc::clone(buf),
            }));
        }

        Ok(None)
    }

    /// Returns a handle to the buffer caching `key`.
    ///
    /// # Panics
    ///
    /// Panics if the cache is not initialized, or every buffer is referenced
    /// or locked.
    pub fn get(
        &self,
        key: BlockKey,
    ) -> Result<BlockHandle<'_, Device, BufferListMutex, BlockDataMutex, CAPACITY>, Device::Error>
    {
        match self.try_get(key)? {
            Some(buf) => Ok(buf),
            None => panic!("block buffer exhausted"),
        }
    }

    /// Writes back every dirty, valid buffer.
    pub fn flush(&self) -> Result<(), Device::Error> {
        let candidates = {
            let buffers = self.buffers.lock();
            buffers.order.iter().map(Arc::clone).collect::<alloc::vec::Vec<_>>()
        };
        for buf in candidates {
            let mut data = buf.data.lock();
            if data.valid && data.dirty {
                self.device.write(data.key.0, data.key.1, &data.data)?;
                data.dirty = false;
            }
        }
        Ok(())
    }
}

impl<Device, BufferListMutex, BlockDataMutex, const CAPACITY: usize> Drop
    for BlockHandle<'_, Device, BufferListMutex, BlockDataMutex, CAPACITY>
where
    BufferListMutex: Mutex<Data = BufferList<BlockDataMutex, CAPACITY>>,
{
    fn drop(&mut self) {
        let mut buffers = self.cache.buffers.lock();
        // Move this buffer to the front of the recency list. `LinkedList`
        // has no stable "remove matching element" primitive, so split at
        // its position, peel it off the front of the tail, and stitch the
        // rest back together. The hash index is untouched: the key didn't
        // change, only its place in the MRU order.
        if let Some(pos) = buffers.order.iter().position(|buf| buf.key == self.key) {
            let mut tail = buffers.order.split_off(pos);
            let buf = tail.pop_front().expect("split_off(pos) starts with the matched element");
            buffers.order.append(&mut tail);
            buffers.order.push_front(buf);
        }
    }
}

impl<'a, Device, BufferListMutex, BlockDataMutex, const BLOCK_SIZE: usize, const CAPACITY: usize>
    BlockHandle<'a, Device, BufferListMutex, BlockDataMutex, CAPACITY>
where
    Device: BlockDevice<BLOCK_SIZE>,
    BufferListMutex: Mutex<Data = BufferList<BlockDataMutex, CAPACITY>>,
    BlockDataMutex: Mutex<Data = BlockData<BLOCK_SIZE>> + 'a,
{
    pub fn key(&self) -> BlockKey {
        self.key
    }

    pub unsafe fn pin(&self) {
        unsafe {
            Arc::increment_strong_count(&self.block);
        }
    }

    pub unsafe fn unpin(&self) {
        unsafe {
            Arc::decrement_strong_count(&self.block);
        }
    }

    pub fn lock<'b>(
        &'b mut self,
    ) -> BlockGuard<'a, 'b, Device, BufferListMutex, BlockDataMutex, BLOCK_SIZE, CAPACITY, false>
    {
        let mut data = self.block.data.lock();

        if data.key != self.key {
            // data recycle occurred
            data.key = self.key;
            data.valid = false;
            data.dirty = false;
        }

        BlockGuard {
            key: self.key,
            cache: self.cache,
            block: Arc::clone(&self.block),
            data,
        }
    }

    /// Releases this handle.
    ///
    /// If this is the last outstanding reference besides the cache's own
    /// slot, and the cached data is dirty, writes it back before the
    /// reference count would drop to zero.
    pub fn release(self) -> Result<(), Device::Error> {
        {
            let mut data = self.block.data.lock();
            if Arc::strong_count(&self.block) == 3 && data.valid && data.dirty {
                self.cache.device.write(data.key.0, data.key.1, &data.data)?;
                data.dirty = false;
            }
        }
        drop(self);
        Ok(())
    }
}

impl<
    'a,
    'b,
    Device,
    BufferListMutex,
    BlockDataMutex,
    const BLOCK_SIZE: usize,
    const CAPACITY: usize,
    const VALID: bool,
> BlockGuard<'a, 'b, Device, BufferListMutex, BlockDataMutex, BLOCK_SIZE, CAPACITY, VALID>
where
    Device: BlockDevice<BLOCK_SIZE>,
    BufferListMutex: Mutex<Data = BufferList<BlockDataMutex, CAPACITY>>,
    BlockDataMutex: Mutex<Data = BlockData<BLOCK_SIZE>> + 'a,
{
    /// Returns the cache key.
    pub fn key(&self) -> BlockKey {
        self.key
    }

    /// Reads the block from disk if cached data is not valid.
    pub fn read(
        mut self,
    ) -> Result<
        BlockGuard<'a, 'b, Device, BufferListMutex, BlockDataMutex, BLOCK_SIZE, CAPACITY, true>,
        (Self, Device::Error),
    > {
        if !self.data.valid {
            if let Err(e) = self
                .cache
                .device
                .read(self.key.0, self.key.1, &mut self.data.data)
            {
                return Err((self, e));
            }
            self.data.valid = true;
        }

        Ok(BlockGuard {
            key: self.key,
            cache: self.cache,
            block: Arc::clone(&self.block),
            data: self.data,
        })
    }

    /// Sets the whole block data.
    pub fn set_data(
        mut self,
        data: &[u8],
    ) -> BlockGuard<'a, 'b, Device, BufferListMutex, BlockDataMutex, BLOCK_SIZE, CAPACITY, true>
    {
        self.data.valid = true;
        self.data.data.copy_from_slice(data);
        BlockGuard {
            key: self.key,
            cache: self.cache,
            block: Arc::clone(&self.block),
            data: self.data,
        }
    }

    /// Fills the whole block data with zero.
    pub fn zeroed(
        mut self,
    ) -> BlockGuard<'a, 'b, Device, BufferListMutex, BlockDataMutex, BLOCK_SIZE, CAPACITY, true>
    {
        self.data.valid = true;
        self.data.data.fill(0);
        BlockGuard {
            key: self.key,
            cache: self.cache,
            block: Arc::clone(&self.block),
            data: self.data,
        }
    }

    pub unsafe fn pin(&self) {
        unsafe {
            Arc::increment_strong_count(&self.block);
        }
    }

    pub unsafe fn unpin(&self) {
        unsafe {
            Arc::decrement_strong_count(&self.block);
        }
    }

    pub fn is_locked(&self) -> bool {
        self.data.locked
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.data.locked = locked;
    }
}

impl<Device, BufferListMutex, BlockDataMutex, const BLOCK_SIZE: usize, const CAPACITY: usize>
    BlockGuard<'_, '_, Device, BufferListMutex, BlockDataMutex, BLOCK_SIZE, CAPACITY, true>
where
    Device: BlockDevice<BLOCK_SIZE>,
    BufferListMutex: Mutex<Data = BufferList<BlockDataMutex, CAPACITY>>,
    BlockDataMutex: Mutex<Data = BlockData<BLOCK_SIZE>>,
{
    /// Returns a reference to the block data bytes.
    pub fn bytes(&self) -> &[u8; BLOCK_SIZE] {
        &self.data.data
    }

    /// Returns a mutable reference to the block data bytes. Marks the block
    /// dirty.
    pub fn bytes_mut(&mut self) -> &mut [u8; BLOCK_SIZE] {
        self.data.dirty = true;
        &mut self.data.data
    }

    /// Returns a reference to the block data as POD.
    pub fn data<T>(&self) -> &T
    where
        T: Pod,
    {
        self.bytes().as_data_view().get(0)
    }

    /// Returns a mutable reference to the block data as POD. Marks the block
    /// dirty.
    pub fn data_mut<T>(&mut self) -> &mut T
    where
        T: Pod,
    {
        self.bytes_mut().as_data_view_mut().get_mut(0)
    }

    pub fn is_dirty(&self) -> bool {
        self.data.dirty
    }

    /// Marks this block dirty without touching its bytes.
    pub fn mark_dirty(&mut self) {
        self.data.dirty = true;
    }

    /// Writes the block back to disk and clears the dirty flag, if dirty.
    ///
    /// A no-op on a clean block.
    pub fn sync(&mut self) -> Result<(), Device::Error> {
        if !self.data.dirty {
            return Ok(());
        }
        self.cache
            .device
            .write(self.key.0, self.key.1, &self.data.data)?;
        self.data.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use core::{
        convert::Infallible,
        ops::{Deref, DerefMut},
    };
    use std::sync::Arc;

    const BLOCK_SIZE: usize = 512;
    const CAPACITY: usize = 8;

    struct StdMutex<T>(std::sync::Mutex<T>);
    struct StdMutexGuard<'a, T>(std::sync::MutexGuard<'a, T>);

    impl<T> mutex_api::Mutex for StdMutex<T> {
        type Data = T;

        type Guard<'a>
            = StdMutexGuard<'a, T>
        where
            Self: 'a;

        fn new(data: Self::Data) -> Self {
            Self(std::sync::Mutex::new(data))
        }

        fn lock(&self) -> Self::Guard<'_> {
            StdMutexGuard(self.0.lock().unwrap())
        }
    }

    impl<T> Deref for StdMutexGuard<'_, T> {
        type Target = T;

        fn deref(&self) -> &Self::Target {
            &self.0
        }
    }

    impl<T> DerefMut for StdMutexGuard<'_, T> {
        fn deref_mut(&mut self) -> &mut Self::Target {
            &mut self.0
        }
    }

    #[derive(Clone)]
    struct MockDevice {
        data: Vec<Arc<StdMutex<MockData>>>,
    }

    struct MockData {
        data: [u8; BLOCK_SIZE],
        read: usize,
        write: usize,
    }

    type BlockIoCache = super::BlockIoCache<MockDevice, StdMutex<BufferList>>;
    type BufferList = super::BufferList<StdMutex<BlockData>, CAPACITY>;
    type BlockData = super::BlockData<BLOCK_SIZE>;

    impl MockDevice {
        fn new(size: usize) -> Self {
            Self {
                data: (0..size)
                    .map(|_| {
                        Arc::new(Mutex::new(MockData {
                            data: [0; BLOCK_SIZE],
                            read: 0,
                            write: 0,
                        }))
                    })
                    .collect(),
            }
        }
    }

    impl BlockDevice<BLOCK_SIZE> for MockDevice {
        type Error = Infallible;

        fn read(&self, _bdev: u32, lba: u32, data: &mut [u8; 512]) -> Result<(), Self::Error> {
            let mut mock = self.data[lba as usize].lock();
            mock.0.read += 1;
            data.copy_from_slice(&mock.0.data);
            Ok(())
        }

        fn write(&self, _bdev: u32, lba: u32, data: &[u8; 512]) -> Result<(), Self::Error> {
            let mut mock = self.data[lba as usize].lock();
            mock.0.write += 1;
            mock.0.data.copy_from_slice(data);
            Ok(())
        }
    }

    #[test]
    fn test_block_io_cache_init() {
        let device = MockDevice::new(10);
        let cache = BlockIoCache::new(device);
        cache.init(5);
        let buffers = cache.buffers.lock();
        assert_eq!(buffers.order.len(), 5);
    }

    #[test]
    #[should_panic]
    fn test_block_io_cache_init_zero() {
        let device = MockDevice::new(10);
        let cache = BlockIoCache::new(device);
        cache.init(0);
    }

    #[test]
    #[should_panic]
    fn test_block_io_cache_init_overflows_index() {
        let device = MockDevice::new(10);
        let cache = BlockIoCache::new(device);
        cache.init(CAPACITY + 1);
    }

    #[test]
    fn test_block_io_cache_get() {
        let device = MockDevice::new(10);
        let cache = BlockIoCache::new(device.clone());
        cache.init(5);

        let block = cache.get((0, 0)).unwrap();
        assert_eq!(block.key(), (0, 0));

        // `cache::get()` does not read the block from the device.
        assert_eq!(device.data[0].lock().0.read, 0);
        assert_eq!(device.data[0].lock().0.write, 0);
    }

    #[test]
    fn test_block_io_cache_get_hits_index_not_scan() {
        let device = MockDevice::new(10);
        let cache = BlockIoCache::new(device.clone());
        cache.init(5);

        let first = cache.get((0, 2)).unwrap();
        let second = cache.get((0, 2)).unwrap();
        assert_eq!(first.key(), second.key());
        {
            let buffers = cache.buffers.lock();
            assert_eq!(buffers.index.len(), 1);
            assert!(buffers.index.contains_key(&(0, 2)));
        }
    }

    #[test]
    fn test_block_io_cache_read_write() {
        let device = MockDevice::new(10);
        let cache = BlockIoCache::new(device.clone());
        cache.init(5);

        {
            let mut block = cache.get((0, 0)).unwrap();
            let Ok(mut block) = block.lock().read();
            block.bytes_mut().copy_from_slice(&[1; 512]);
            block.sync().unwrap();
        }

        {
            let mut block = cache.get((0, 0)).unwrap();
            let Ok(block) = block.lock().read();
            assert_eq!(block.bytes(), &[1; 512]);
        }

        // data is read from the device only once.
        assert_eq!(device.data[0].lock().0.read, 1);
        assert_eq!(device.data[0].lock().0.write, 1);
    }

    #[test]
    fn test_block_io_cache_dirty_synced_on_release() {
        let device = MockDevice::new(10);
        let cache = BlockIoCache::new(device.clone());
        cache.init(5);

        let mut handle = cache.get((0, 5)).unwrap();
        let Ok(mut block) = handle.lock().read();
        block.bytes_mut().copy_from_slice(&[7; 512]);
        block.mark_dirty();
        drop(block);
        assert_eq!(device.data[5].lock().0.write, 0);
        handle.release().unwrap();

        // `handle` was the only outstanding reference besides the cache's
        // own bookkeeping (the `order` list and the `index` entry), so
        // release had to write the dirty data back before it could drop.
        assert_eq!(device.data[5].lock().0.write, 1);
    }

    #[test]
    fn test_block_io_cache_exhaustion() {
        let device = MockDevice::new(10);
        let cache = BlockIoCache::new(device);
        cache.init(1);

        {
            let _block1 = cache.get((0, 0)).unwrap();
            assert!(cache.try_get((0, 1)).unwrap().is_none());
        }

        let _block2 = cache.get((0, 1)).unwrap();
    }

    #[test]
    fn test_block_io_cache_locked_not_evicted() {
        let device = MockDevice::new(10);
        let cache = BlockIoCache::new(device);
        cache.init(1);

        {
            let mut block = cache.get((0, 0)).unwrap();
            let Ok(mut guard) = block.lock().read();
            guard.set_locked(true);
        }
        // only slot is unreferenced but locked; no other key can be cached.
        assert!(cache.try_get((0, 1)).unwrap().is_none());
    }

    #[test]
    fn test_block_io_cache_drop_from_old() {
        let device = MockDevice::new(10);
        let cache = BlockIoCache::new(device.clone());
        cache.init(5);

        for i in 0..10 {
            let mut block = cache.get((0, i)).unwrap();
            let Ok(_block) = block.lock().read();
        }
        // cache: 9 -> 8 -> 7 -> 6 -> 5

        for i in 0..10 {
            assert_eq!(device.data[i as usize].lock().0.read, 1);
            assert_eq!(device.data[i as usize].lock().0.write, 0);
        }

        let mut block = cache.get((0, 0)).unwrap();
        let Ok(block) = block.lock().read(); // 0 is not cached, drops 5
        assert_eq!(device.data[0].lock().0.read, 2);
        drop(block);

        let mut block = cache.get((0, 8)).unwrap();
        let Ok(block) = block.lock().read(); // 8 is cached
        assert_eq!(device.data[8].lock().0.read, 1);
        drop(block);

        let mut block = cache.get((0, 3)).unwrap();
        let Ok(block) = block.lock().read(); // 3 is not cached, drops 6
        assert_eq!(device.data[3].lock().0.read, 2);
        drop(block);

        for (i, n) in [(3, 2), (8, 1), (0, 2), (9, 1), (7, 1)] {
            let mut block = cache.get((0, i)).unwrap();
            let Ok(_block) = block.lock().read();
            assert_eq!(device.data[i as usize].lock().0.read, n);
        }
    }

    #[test]
    fn test_block_io_cache_pin_unpin() {
        let device = MockDevice::new(10);
        let cache = BlockIoCache::new(device.clone());
        cache.init(5);

        for i in 0..10 {
            let mut block = cache.get((0, i)).unwrap();
            let Ok(_block) = block.lock().read();
        }
        let mut block = cache.get((0, 5)).unwrap();
        unsafe {
            block.pin();
        }
        let Ok(block) = block.lock().read();
        drop(block);

        for i in 0..10 {
            let mut block = cache.get((0, i)).unwrap();
            let Ok(_block) = block.lock().read();
        }

        for i in 0..10 {
            let n = if i == 5 { 1 } else { 2 };
            assert_eq!(device.data[i as usize].lock().0.read, n);
        }
    }

    #[test]
    fn test_block_io_cache_flush() {
        let device = MockDevice::new(10);
        let cache = BlockIoCache::new(device.clone());
        cache.init(2);

        {
            let mut block = cache.get((0, 1)).unwrap();
            let Ok(mut guard) = block.lock().read();
            guard.bytes_mut().copy_from_slice(&[9; 512]);
        }
        assert_eq!(device.data[1].lock().0.write, 0);
        cache.flush().unwrap();
        assert_eq!(device.data[1].lock().0.write, 1);
        cache.flush().unwrap();
        // idempotent: already clean, no further write.
        assert_eq!(device.data[1].lock().0.write, 1);
    }
}
