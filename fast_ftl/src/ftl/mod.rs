pub mod block;
pub mod conf;
pub mod map;
pub mod merge;
pub mod stats;
pub mod warmup;

use std::collections::VecDeque;

use rapidhash::RapidHashMap;

use crate::{
  error::{Error, Result},
  ftl_trait::{DeviceStatus, Request},
  pal::{Pal, PalRequest},
};
use block::Block;
use conf::{FtlConfig, Parameter};
use map::{MappingTables, RW_LOG_BLOCK_COUNT};
use merge::{AdditionalPage, MergeKind};
use stats::FtlStats;

/// Fixed CPU costs of the mapping code itself, in nanoseconds. These model
/// the host-side work of the FTL, separate from NAND latencies.
/// 映射代码自身的固定 CPU 开销，单位纳秒。它们建模 FTL 的主机侧工作，
/// 与 NAND 延迟无关。
pub mod cpu {
  pub const READ: u64 = 241;
  pub const WRITE: u64 = 241;
  pub const READ_INTERNAL: u64 = 427;
  pub const WRITE_INTERNAL: u64 = 731;
  pub const ERASE_INTERNAL: u64 = 594;
}

/// Which kind of block a lookup landed in.
/// 查找命中的块类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
  Data,
  Sw,
  Rw,
}

/// Location of the unique valid physical page backing an LPN.
/// 支撑某 LPN 的唯一有效物理页的位置。
#[derive(Debug, Clone, Copy)]
pub struct ValidPage {
  pub pbn: u32,
  pub page_index: u32,
  pub kind: BlockKind,
}

/// The FAST (fully associative sector translation) mapping engine.
/// FAST（全相联扇区转换）映射引擎。
///
/// Block-level L2P map plus one sequential-write log block and a small
/// round-robin pool of random-write log blocks. Overwrites go out of place
/// into a log block; the merge engine folds log blocks back into data
/// blocks while keeping exactly one valid copy of every logical page.
/// 块级 L2P 映射，外加一个顺序写日志块与一小组轮换的随机写日志块。
/// 覆盖写异地写入日志块；合并引擎把日志块折回数据块，并保证每个逻辑页
/// 恰有一份有效副本。
pub struct FastFtl<P: Pal> {
  pub(crate) param: Parameter,
  pub(crate) conf: FtlConfig,
  pub(crate) blocks: Vec<Block>,
  pub(crate) tables: MappingTables,
  pub(crate) pal: P,
  pub(crate) stats: FtlStats,
  pub(crate) status: DeviceStatus,
}

impl<P: Pal> FastFtl<P> {
  /// Build the device with every physical block erased. Block 0 starts as
  /// the SW log block, blocks 1..=6 as the RW pool, the rest free.
  /// 构建设备，所有物理块均处于擦除态。块 0 作为 SW 日志块，1..=6 为
  /// RW 池，其余空闲。
  pub fn new(conf: FtlConfig, param: Parameter, pal: P) -> Result<Self> {
    conf.validate()?;

    if param.io_unit_in_page != 1 {
      return Err(Error::Unsupported(
        "the FAST mapping supports exactly one I/O unit per page",
      ));
    }
    if param.total_physical_blocks <= 1 + RW_LOG_BLOCK_COUNT {
      return Err(Error::Config(
        "not enough physical blocks for the SW/RW log pool",
      ));
    }

    let blocks = (0..param.total_physical_blocks)
      .map(|i| Block::new(i, param.pages_in_block, true))
      .collect();

    Ok(Self {
      blocks,
      tables: MappingTables::new(&param),
      pal,
      stats: FtlStats::default(),
      status: DeviceStatus {
        total_logical_pages: param.total_logical_pages(),
        mapped_logical_pages: 0,
      },
      param,
      conf,
    })
  }

  #[inline]
  pub(crate) fn lbn_of(&self, lpn: u64) -> u32 {
    (lpn / self.param.pages_in_block as u64) as u32
  }

  #[inline]
  pub(crate) fn offset_of(&self, lpn: u64) -> u32 {
    (lpn % self.param.pages_in_block as u64) as u32
  }

  /// Locate the unique valid physical page backing `lpn`, checking the
  /// data block first, then the SW log block, then the RW log map.
  /// 定位支撑 `lpn` 的唯一有效物理页：先查数据块，再查 SW 日志块，
  /// 最后查 RW 日志映射。
  #[must_use]
  pub fn find_valid_page(&self, lpn: u64) -> Option<ValidPage> {
    let lbn = self.lbn_of(lpn);
    let offset = self.offset_of(lpn);

    let pbn = self.tables.l2p[lbn as usize]?;

    if self.blocks[pbn as usize].is_valid(offset) {
      return Some(ValidPage {
        pbn,
        page_index: offset,
        kind: BlockKind::Data,
      });
    }

    if let Some(sw) = self.tables.sw_block {
      let (stored, valid, _) = self.blocks[sw as usize].page_info(offset);
      if valid && stored == lpn {
        return Some(ValidPage {
          pbn: sw,
          page_index: offset,
          kind: BlockKind::Sw,
        });
      }
    }

    if let Some(&(rw_pbn, page_index)) = self.tables.rw_log_map.get(&lpn) {
      let (stored, valid, _) = self.blocks[rw_pbn as usize].page_info(page_index);
      assert!(
        valid && stored == lpn,
        "RW log map points at a stale page (lpn {lpn}, block {rw_pbn}, page {page_index})"
      );
      return Some(ValidPage {
        pbn: rw_pbn,
        page_index,
        kind: BlockKind::Rw,
      });
    }

    None
  }

  /// Resolve and read one logical page. A miss is a silent no-op: the
  /// device returns unspecified data for never-written pages.
  /// 解析并读取一个逻辑页。未命中则静默跳过：设备对从未写入的页返回
  /// 未定义数据。
  pub(crate) fn read_internal(&mut self, req: &Request, tick: &mut u64) {
    if let Some(found) = self.find_valid_page(req.lpn) {
      self.blocks[found.pbn as usize].read(found.page_index, *tick);

      let pal_req = PalRequest::for_page(found.pbn, found.page_index, self.param.io_unit_in_page);
      self.pal.read(&pal_req, tick);
    }

    *tick += cpu::READ_INTERNAL;
  }

  /// Route one host write: direct program, SW log, RW log, or merge.
  /// 路由一次主机写：直接编程、SW 日志、RW 日志或触发合并。
  ///
  /// `send_to_pal = false` updates mapping state without accumulating NAND
  /// latency; the warmup driver uses it to pre-populate the device.
  /// `send_to_pal = false` 时仅更新映射状态、不累计 NAND 延迟；预热
  /// 驱动用它来预填充设备。
  pub(crate) fn write_internal(&mut self, req: &Request, tick: &mut u64, send_to_pal: bool) {
    let mut finished_at = *tick;
    let lbn = self.lbn_of(req.lpn);
    let offset = self.offset_of(req.lpn);
    let io_unit = self.param.io_unit_in_page;

    if self.tables.l2p[lbn as usize].is_none() {
      // First write to this logical block claims a fresh data block.
      let pbn = self.tables.get_free_block();
      self.tables.l2p[lbn as usize] = Some(pbn);
      self.tables.p2l[pbn as usize] = Some(lbn);
      // Block mapping covers the whole logical block; merges only move
      // existing entries and never change this count.
      self.status.mapped_logical_pages += self.param.pages_in_block as u64;
    }

    match self.find_valid_page(req.lpn) {
      None => {
        // Fresh page: program the data block in place.
        let pbn = self.tables.l2p[lbn as usize].expect("L2P entry was just established");
        self.blocks[pbn as usize].write(offset, req.lpn, *tick);

        if send_to_pal {
          let pal_req = PalRequest::for_page(pbn, offset, io_unit);
          self.pal.write(&pal_req, &mut finished_at);
        }
      }
      Some(found) => {
        // The old copy dies first, wherever it lives.
        self.blocks[found.pbn as usize].invalidate(found.page_index);
        if found.kind == BlockKind::Rw {
          self.tables.rw_log_map.remove(&req.lpn);
        }

        if offset == 0 {
          // First page of a logical block: the SW log restarts cleanly
          // for this owner. A non-clean SW block is retired first, in
          // parallel with the new write.
          let sw = self.tables.sw_block.expect("SW log block must exist");

          if !self.blocks[sw as usize].is_clean_block() {
            let mut merge_tick = *tick;
            self.merge_log_block(sw, MergeKind::Sw { additional: None }, &mut merge_tick, send_to_pal);
            finished_at = finished_at.max(merge_tick);
          }

          let sw = self.tables.sw_block.expect("SW log block must exist");
          self.blocks[sw as usize].write(0, req.lpn, *tick);
          // The first page claims ownership of the SW block.
          self.tables.p2l[sw as usize] = Some(lbn);

          if send_to_pal {
            let pal_req = PalRequest::for_page(sw, 0, io_unit);
            let mut write_tick = *tick;
            self.pal.write(&pal_req, &mut write_tick);
            finished_at = finished_at.max(write_tick);
          }
        } else {
          let sw = self.tables.sw_block.expect("SW log block must exist");

          if self.tables.p2l[sw as usize] == Some(lbn) {
            // The SW block already belongs to this logical block.
            // Appending is the hope; out-of-order filling is allowed.
            if self.blocks[sw as usize].is_erased(offset) {
              self.blocks[sw as usize].write(offset, req.lpn, *tick);

              if send_to_pal {
                let pal_req = PalRequest::for_page(sw, offset, io_unit);
                let mut write_tick = *tick;
                self.pal.write(&pal_req, &mut write_tick);
                finished_at = finished_at.max(write_tick);
              }
            } else {
              // Conflict: merge the SW block with the original data
              // block; the incoming page rides along in the merge's
              // write phase.
              let mut merge_tick = *tick;
              self.merge_log_block(
                sw,
                MergeKind::Sw {
                  additional: Some(AdditionalPage {
                    page_index: offset,
                    lpn: req.lpn,
                  }),
                },
                &mut merge_tick,
                send_to_pal,
              );
              finished_at = finished_at.max(merge_tick);
            }
          } else {
            // SW block has no owner or another owner: route to the RW
            // log pool.
            let mut target = self
              .tables
              .rw_blocks
              .iter()
              .copied()
              .find(|&pbn| self.blocks[pbn as usize].erased_page_count() != 0);

            if target.is_none() {
              // Pool exhausted: recycle the oldest RW block. The merge
              // runs in parallel with the new write.
              let victim = self
                .tables
                .rw_blocks
                .pop_front()
                .expect("RW log pool must not be empty");

              let mut merge_tick = *tick;
              let replacement =
                self.merge_log_block(victim, MergeKind::Rw, &mut merge_tick, send_to_pal);
              finished_at = finished_at.max(merge_tick);

              target = replacement;
            }

            let target = target.expect("RW recycle must yield a writable block");
            let page_index = self.blocks[target as usize].next_write_page_index();

            self.blocks[target as usize].write(page_index, req.lpn, *tick);
            self.tables.rw_log_map.insert(req.lpn, (target, page_index));

            if send_to_pal {
              let pal_req = PalRequest::for_page(target, page_index, io_unit);
              let mut write_tick = *tick;
              self.pal.write(&pal_req, &mut write_tick);
              finished_at = finished_at.max(write_tick);
            }
          }
        }
      }
    }

    *tick = finished_at + cpu::WRITE_INTERNAL;
  }

  /// Erase a physical block, release its ownership and return it to the
  /// free queue.
  /// 擦除一个物理块，解除其归属并放回空闲队列。
  pub(crate) fn erase_internal(&mut self, pbn: u32, tick: &mut u64, send_to_pal: bool) {
    self.blocks[pbn as usize].erase();

    if send_to_pal {
      let pal_req = PalRequest::for_page(pbn, 0, self.param.io_unit_in_page);
      self.pal.erase(&pal_req, tick);
    }

    self.tables.p2l[pbn as usize] = None;
    // The upstream wear-threshold gate never reinserted merged blocks and
    // bled the free queue dry; erased blocks go straight back here.
    self.tables.free_blocks.push_back(pbn);

    *tick += cpu::ERASE_INTERNAL;
  }

  /// Total valid and dirty physical pages across the device.
  /// 全设备的有效物理页与脏物理页总数。
  #[must_use]
  pub fn total_page_counts(&self) -> (u64, u64) {
    let mut valid = 0u64;
    let mut dirty = 0u64;

    for block in &self.blocks {
      valid += block.valid_page_count() as u64;
      dirty += block.dirty_page_count() as u64;
    }

    (valid, dirty)
  }

  #[must_use]
  pub fn free_block_ratio(&self) -> f64 {
    self.tables.free_blocks.len() as f64 / self.param.total_physical_blocks as f64
  }
}

/// Instrumentation accessors. The simulator around this core inspects
/// mapping state for reporting and verification; tests use the same
/// surface.
/// 观测接口。外层模拟器通过它们检查映射状态用于报告与校验；测试使用
/// 同一套接口。
impl<P: Pal> FastFtl<P> {
  #[must_use]
  pub fn parameter(&self) -> &Parameter {
    &self.param
  }

  #[must_use]
  pub fn block(&self, pbn: u32) -> &Block {
    &self.blocks[pbn as usize]
  }

  #[must_use]
  pub fn l2p(&self, lbn: u32) -> Option<u32> {
    self.tables.l2p[lbn as usize]
  }

  #[must_use]
  pub fn p2l(&self, pbn: u32) -> Option<u32> {
    self.tables.p2l[pbn as usize]
  }

  #[must_use]
  pub fn sw_block(&self) -> Option<u32> {
    self.tables.sw_block
  }

  #[must_use]
  pub fn rw_blocks(&self) -> &VecDeque<u32> {
    &self.tables.rw_blocks
  }

  #[must_use]
  pub fn free_blocks(&self) -> &VecDeque<u32> {
    &self.tables.free_blocks
  }

  #[must_use]
  pub fn rw_log_map(&self) -> &RapidHashMap<u64, (u32, u32)> {
    &self.tables.rw_log_map
  }

  #[must_use]
  pub fn stats(&self) -> &FtlStats {
    &self.stats
  }

  #[must_use]
  pub fn pal(&self) -> &P {
    &self.pal
  }

  #[must_use]
  pub fn status(&self) -> &DeviceStatus {
    &self.status
  }
}
