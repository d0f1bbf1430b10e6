#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use fast_ftl::{FastFtl, FtlConfig, NandTiming, Pal, PalRequest, Parameter, Request};

/// PAL double that counts sub-operations and applies the fixed timing
/// table, so tests can assert both behaviour and latency composition.
pub struct CountingPal {
  pub reads: u64,
  pub writes: u64,
  pub erases: u64,
  pub timing: NandTiming,
}

impl CountingPal {
  pub fn new() -> Self {
    Self {
      reads: 0,
      writes: 0,
      erases: 0,
      timing: NandTiming::default(),
    }
  }
}

impl Pal for CountingPal {
  fn read(&mut self, _req: &PalRequest, tick: &mut u64) {
    self.reads += 1;
    *tick += self.timing.read;
  }

  fn write(&mut self, _req: &PalRequest, tick: &mut u64) {
    self.writes += 1;
    *tick += self.timing.program;
  }

  fn erase(&mut self, _req: &PalRequest, tick: &mut u64) {
    self.erases += 1;
    *tick += self.timing.erase;
  }
}

/// Boundary-scenario geometry: 4 pages per block, 4 logical blocks, 16
/// physical blocks.
pub fn small_device() -> FastFtl<CountingPal> {
  device(4, 4, 16)
}

pub fn device(
  pages_in_block: u32,
  total_logical_blocks: u32,
  total_physical_blocks: u32,
) -> FastFtl<CountingPal> {
  device_with_config(
    FtlConfig::default(),
    pages_in_block,
    total_logical_blocks,
    total_physical_blocks,
  )
}

pub fn device_with_config(
  conf: FtlConfig,
  pages_in_block: u32,
  total_logical_blocks: u32,
  total_physical_blocks: u32,
) -> FastFtl<CountingPal> {
  let param = Parameter {
    total_logical_blocks,
    total_physical_blocks,
    pages_in_block,
    io_unit_in_page: 1,
  };
  FastFtl::new(conf, param, CountingPal::new()).expect("device construction must succeed")
}

pub fn page_request(lpn: u64) -> Request {
  let mut req = Request::new(1);
  req.io_flag.set_all();
  req.lpn = lpn;
  req
}

/// Full-device invariant sweep: the testable properties that must hold in
/// every reachable state.
pub fn assert_consistent<P: Pal>(ftl: &FastFtl<P>) {
  let param = *ftl.parameter();
  let pages = param.pages_in_block;

  // Per-block bit discipline and cursor bound.
  for pbn in 0..param.total_physical_blocks {
    let block = ftl.block(pbn);
    for i in 0..pages {
      assert!(
        !(block.is_valid(i) && block.is_erased(i)),
        "block {pbn} page {i} is both valid and erased"
      );
      if !block.is_erased(i) {
        assert!(
          i < block.next_write_page_index(),
          "block {pbn} cursor {} does not cover programmed page {i}",
          block.next_write_page_index()
        );
      }
    }
  }

  // Free, RW, SW and owned data blocks partition the device.
  let mut seen: HashSet<u32> = HashSet::new();
  let mut claim = |pbn: u32, role: &str| {
    assert!(seen.insert(pbn), "block {pbn} claimed twice (as {role})");
  };

  for &pbn in ftl.free_blocks() {
    claim(pbn, "free");
  }
  for &pbn in ftl.rw_blocks() {
    claim(pbn, "RW log");
  }
  if let Some(sw) = ftl.sw_block() {
    claim(sw, "SW log");
  }
  for lbn in 0..param.total_logical_blocks {
    if let Some(pbn) = ftl.l2p(lbn) {
      claim(pbn, "data");
    }
  }
  assert_eq!(
    seen.len(),
    param.total_physical_blocks as usize,
    "free/RW/SW/data sets do not cover every physical block"
  );

  // RW log map entries point at live pages inside the RW pool.
  for (&lpn, &(pbn, page_index)) in ftl.rw_log_map() {
    assert!(
      ftl.rw_blocks().contains(&pbn),
      "RW map entry for lpn {lpn} points outside the RW pool"
    );
    let block = ftl.block(pbn);
    let (stored, valid, _) = block.page_info(page_index);
    assert!(valid, "RW map entry for lpn {lpn} points at an invalid page");
    assert_eq!(stored, lpn, "RW map entry for lpn {lpn} stores {stored}");
  }

  // P2L coherence: an owner link is either the data mapping or the SW
  // block mid-fill.
  for pbn in 0..param.total_physical_blocks {
    if let Some(lbn) = ftl.p2l(pbn) {
      assert!(
        ftl.l2p(lbn) == Some(pbn) || ftl.sw_block() == Some(pbn),
        "P2L[{pbn}] = {lbn} matches neither L2P nor the SW block"
      );
    }
  }

  // ONE-COPY: every valid page is the unique home of its LPN and the
  // lookup agrees.
  let mut homes: HashMap<u64, (u32, u32)> = HashMap::new();
  for pbn in 0..param.total_physical_blocks {
    let block = ftl.block(pbn);
    for i in 0..pages {
      if block.is_valid(i) {
        let lpn = block.lpn(i);
        if let Some(previous) = homes.insert(lpn, (pbn, i)) {
          panic!("lpn {lpn} is valid at both {previous:?} and ({pbn}, {i})");
        }
      }
    }
  }
  for (&lpn, &(pbn, page_index)) in &homes {
    let found = ftl
      .find_valid_page(lpn)
      .unwrap_or_else(|| panic!("lpn {lpn} is valid at ({pbn}, {page_index}) but not findable"));
    assert_eq!((found.pbn, found.page_index), (pbn, page_index));
  }
}
