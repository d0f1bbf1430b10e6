use bitvec::prelude::*;

/// Per-I/O-unit flag bitmap carried by host and PAL requests.
/// 主机请求与 PAL 请求携带的 I/O 单元标志位图。
///
/// The FAST path runs with one I/O unit per page, so the map is one bit
/// wide in practice; the width still follows the device parameter.
#[derive(Debug, Clone)]
pub struct IoFlag {
  bits: BitVec,
}

impl IoFlag {
  /// All bits clear.
  /// 所有位清零。
  pub fn new(io_unit_in_page: u32) -> Self {
    Self {
      bits: BitVec::repeat(false, io_unit_in_page as usize),
    }
  }

  /// All bits set.
  /// 所有位置位。
  pub fn full(io_unit_in_page: u32) -> Self {
    Self {
      bits: BitVec::repeat(true, io_unit_in_page as usize),
    }
  }

  pub fn set_all(&mut self) {
    self.bits.fill(true);
  }

  pub fn clear_all(&mut self) {
    self.bits.fill(false);
  }

  /// Number of set bits. An empty flag marks a degenerate request.
  /// 置位的数量。全零标志表示退化请求。
  #[inline]
  #[must_use]
  pub fn count(&self) -> usize {
    self.bits.count_ones()
  }
}

/// A NAND sub-operation target handed to the PAL.
/// 交给 PAL 的 NAND 子操作目标。
#[derive(Debug, Clone)]
pub struct PalRequest {
  pub block_index: u32,
  pub page_index: u32,
  pub io_flag: IoFlag,
}

impl PalRequest {
  /// Target one page with every I/O unit selected. The FTL generates all
  /// of its sub-operations this way.
  /// 定位单个页并选中全部 I/O 单元。FTL 生成的子操作都采用这种形式。
  pub fn for_page(block_index: u32, page_index: u32, io_unit_in_page: u32) -> Self {
    Self {
      block_index,
      page_index,
      io_flag: IoFlag::full(io_unit_in_page),
    }
  }
}

/// Physical abstraction layer: the NAND-access collaborator. Each call
/// advances the supplied tick by the latency of the operation; any
/// parallelism between operations is composed by the caller with `max`.
/// 物理抽象层：NAND 访问协作方。每次调用将给定的 tick 前移该操作的
/// 延迟；操作间的并行由调用方通过 `max` 组合。
pub trait Pal {
  fn read(&mut self, req: &PalRequest, tick: &mut u64);
  fn write(&mut self, req: &PalRequest, tick: &mut u64);
  fn erase(&mut self, req: &PalRequest, tick: &mut u64);
}

/// NAND timing table in nanoseconds.
/// NAND 时序表，单位纳秒。
#[derive(Debug, Clone, Copy)]
pub struct NandTiming {
  pub read: u64,
  pub program: u64,
  pub erase: u64,
}

impl Default for NandTiming {
  /// MLC-flavored defaults: tR 50us, tPROG 600us, tBERS 3.5ms.
  fn default() -> Self {
    Self {
      read: 50_000,
      program: 600_000,
      erase: 3_500_000,
    }
  }
}

/// Fixed-latency PAL model. Every operation costs its table entry,
/// independent of the target.
/// 固定延迟的 PAL 模型。每个操作消耗表中的固定项，与目标无关。
#[derive(Debug, Default, Clone)]
pub struct TimingPal {
  timing: NandTiming,
}

impl TimingPal {
  pub fn new(timing: NandTiming) -> Self {
    Self { timing }
  }
}

impl Pal for TimingPal {
  fn read(&mut self, _req: &PalRequest, tick: &mut u64) {
    *tick += self.timing.read;
  }

  fn write(&mut self, _req: &PalRequest, tick: &mut u64) {
    *tick += self.timing.program;
  }

  fn erase(&mut self, _req: &PalRequest, tick: &mut u64) {
    *tick += self.timing.erase;
  }
}
