use std::collections::VecDeque;

use rapidhash::RapidHashMap;

use crate::ftl::conf::Parameter;

/// Number of RW log blocks kept in rotation.
/// 轮换使用的 RW 日志块数量。
pub const RW_LOG_BLOCK_COUNT: u32 = 6;

/// The coarse mapping state of the device: pure containers, no policy.
/// 设备的粗粒度映射状态：纯容器，不含策略。
///
/// Initial layout: physical block 0 is the SW log block, blocks
/// 1..=RW_LOG_BLOCK_COUNT are the RW log pool, everything above is free.
/// 初始布局：物理块 0 为 SW 日志块，1..=RW_LOG_BLOCK_COUNT 为 RW 日志
/// 池，其余全部空闲。
#[derive(Debug)]
pub(crate) struct MappingTables {
  /// Logical block number -> physical block number.
  pub l2p: Vec<Option<u32>>,
  /// Physical block number -> owning logical block number.
  pub p2l: Vec<Option<u32>>,
  /// Erased, unassigned physical blocks in FIFO order.
  pub free_blocks: VecDeque<u32>,
  /// The single sequential-write log block.
  pub sw_block: Option<u32>,
  /// The random-write log pool, recycled round robin from the front.
  pub rw_blocks: VecDeque<u32>,
  /// LPN -> (physical block, page index) for pages living in RW log blocks.
  pub rw_log_map: RapidHashMap<u64, (u32, u32)>,
}

impl MappingTables {
  pub fn new(param: &Parameter) -> Self {
    let rw_blocks: VecDeque<u32> = (1..=RW_LOG_BLOCK_COUNT).collect();
    let free_blocks: VecDeque<u32> =
      (RW_LOG_BLOCK_COUNT + 1..param.total_physical_blocks).collect();

    Self {
      l2p: vec![None; param.total_logical_blocks as usize],
      p2l: vec![None; param.total_physical_blocks as usize],
      free_blocks,
      sw_block: Some(0),
      rw_blocks,
      rw_log_map: RapidHashMap::default(),
    }
  }

  /// Pop the oldest free block. The simulator never reclaims
  /// opportunistically, so an empty queue is fatal.
  /// 弹出最早的空闲块。模拟器不做机会性回收，队列为空属于致命错误。
  pub fn get_free_block(&mut self) -> u32 {
    match self.free_blocks.pop_front() {
      Some(pbn) => pbn,
      None => panic!("no free block"),
    }
  }
}
