use bitvec::prelude::*;

/// Per-physical-block state. NAND blocks program in page order and must be
/// erased before rewrite; this tracks which pages currently hold valid
/// logical pages, which are still erased, and which LPN each page stores.
/// 物理块状态。NAND 块按页顺序编程且重写前必须擦除；这里跟踪哪些页
/// 持有有效逻辑页、哪些页仍处于擦除态，以及每页存储的 LPN。
///
/// A page that is neither valid nor erased is dirty: it was programmed and
/// later invalidated, and stays unusable until the whole block is erased.
#[derive(Debug, Clone)]
pub struct Block {
  idx: u32,
  page_count: u32,
  valid_bits: BitVec,
  erased_bits: BitVec,
  lpns: Option<Box<[u64]>>,
  next_write_page_index: u32,
  last_accessed: u64,
  erase_count: u32,
}

impl Block {
  /// A fresh block: every page erased, no valid pages, erase counter zero.
  /// 新块：所有页均已擦除、无有效页、擦除计数为零。
  pub fn new(idx: u32, page_count: u32, create_lpns: bool) -> Self {
    let mut block = Self {
      idx,
      page_count,
      valid_bits: BitVec::repeat(false, page_count as usize),
      erased_bits: BitVec::repeat(false, page_count as usize),
      lpns: create_lpns.then(|| vec![0u64; page_count as usize].into_boxed_slice()),
      next_write_page_index: 0,
      last_accessed: 0,
      erase_count: 0,
    };

    block.erase();
    block.erase_count = 0;
    block
  }

  #[inline]
  #[must_use]
  pub fn block_index(&self) -> u32 {
    self.idx
  }

  #[inline]
  #[must_use]
  pub fn page_count(&self) -> u32 {
    self.page_count
  }

  #[inline]
  #[must_use]
  pub fn last_accessed_time(&self) -> u64 {
    self.last_accessed
  }

  #[inline]
  #[must_use]
  pub fn erase_count(&self) -> u32 {
    self.erase_count
  }

  /// Pages currently holding a valid logical page.
  /// 当前持有有效逻辑页的页数。
  #[must_use]
  pub fn valid_page_count(&self) -> u32 {
    self.valid_bits.count_ones() as u32
  }

  /// Pages that were programmed and later invalidated.
  /// 先被编程后又被作废的页数。
  #[must_use]
  pub fn dirty_page_count(&self) -> u32 {
    let mut dirty = 0;
    for i in 0..self.page_count as usize {
      if !self.valid_bits[i] && !self.erased_bits[i] {
        dirty += 1;
      }
    }
    dirty
  }

  #[must_use]
  pub fn erased_page_count(&self) -> u32 {
    self.erased_bits.count_ones() as u32
  }

  /// Lowest page index not yet programmed since the last erase.
  /// 自上次擦除以来尚未编程的最低页号。
  #[inline]
  #[must_use]
  pub fn next_write_page_index(&self) -> u32 {
    self.next_write_page_index
  }

  /// True when every page is still erased.
  /// 所有页均处于擦除态时为真。
  #[must_use]
  pub fn is_clean_block(&self) -> bool {
    self.erased_page_count() == self.page_count
  }

  #[inline]
  #[must_use]
  pub fn is_valid(&self, page_index: u32) -> bool {
    self.valid_bits[page_index as usize]
  }

  #[inline]
  #[must_use]
  pub fn is_erased(&self, page_index: u32) -> bool {
    self.erased_bits[page_index as usize]
  }

  /// LPN stored at a page. Meaningful only while the page is valid.
  /// 页上存储的 LPN。仅当该页有效时才有意义。
  #[must_use]
  pub fn lpn(&self, page_index: u32) -> u64 {
    self.lpns.as_ref().expect("block does not track LPNs")[page_index as usize]
  }

  /// Stored LPN plus both status bits for one page.
  /// 单页的存储 LPN 及两个状态位。
  #[must_use]
  pub fn page_info(&self, page_index: u32) -> (u64, bool, bool) {
    let lpn = match &self.lpns {
      Some(lpns) => lpns[page_index as usize],
      None => 0,
    };
    (
      lpn,
      self.valid_bits[page_index as usize],
      self.erased_bits[page_index as usize],
    )
  }

  /// Probe a page for reading. Returns whether the page is valid and, if
  /// so, refreshes the access time. No other state changes.
  /// 探测读取页。返回该页是否有效，有效时刷新访问时间。不改动其他状态。
  pub fn read(&mut self, page_index: u32, tick: u64) -> bool {
    let valid = self.valid_bits[page_index as usize];

    if valid {
      self.last_accessed = tick;
    }

    valid
  }

  /// Program a page. Only an erased page may be programmed; anything else
  /// is a mapping-policy bug and aborts the simulation.
  /// 编程一页。只有擦除态的页可以编程；其余情况属于映射策略缺陷，
  /// 终止模拟。
  pub fn write(&mut self, page_index: u32, lpn: u64, tick: u64) {
    if !self.erased_bits[page_index as usize] {
      panic!(
        "write to non-erased page (block {}, page {})",
        self.idx, page_index
      );
    }

    self.last_accessed = tick;
    self.erased_bits.set(page_index as usize, false);
    self.valid_bits.set(page_index as usize, true);

    if let Some(lpns) = &mut self.lpns {
      lpns[page_index as usize] = lpn;
    }

    // The SW log block may fill out of order; the cursor only ever moves
    // forward and is reset by erase.
    self.next_write_page_index = self.next_write_page_index.max(page_index + 1);
  }

  /// Erase the whole block: every page becomes erased, the cursor rewinds
  /// and the erase counter advances.
  /// 整块擦除：所有页回到擦除态，游标归零，擦除计数递增。
  pub fn erase(&mut self) {
    self.valid_bits.fill(false);
    self.erased_bits.fill(true);
    self.next_write_page_index = 0;
    self.erase_count += 1;
  }

  /// Drop a page's valid bit. The page stays dirty until the next erase.
  /// 清除某页的有效位。该页在下次擦除前保持脏态。
  pub fn invalidate(&mut self, page_index: u32) {
    self.valid_bits.set(page_index as usize, false);
  }
}
