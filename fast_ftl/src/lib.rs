//! FAST (fully associative sector translation) block-mapping FTL core for
//! an SSD simulator.
//! 面向 SSD 模拟器的 FAST（全相联扇区转换）块映射 FTL 核心。
//!
//! The engine maps logical blocks onto physical NAND blocks, absorbs
//! overwrites in one sequential-write log block plus a small pool of
//! random-write log blocks, and garbage-collects log blocks back into data
//! blocks with switching or full merges. Time is an integer tick advanced
//! by the PAL collaborator behind the [`pal::Pal`] seam.
//! 引擎把逻辑块映射到物理 NAND 块，用一个顺序写日志块和一小组随机写
//! 日志块吸收覆盖写，并通过切换合并或完全合并把日志块回收为数据块。
//! 时间是由 [`pal::Pal`] 接缝后的 PAL 协作方推进的整数 tick。

pub mod error;
pub mod ftl;
mod ftl_impl;
pub mod ftl_trait;
pub mod pal;

pub use error::{Error, Result};
pub use ftl::{
  BlockKind, FastFtl, ValidPage,
  block::Block,
  conf::{FillingMode, FtlConfig, Parameter},
  map::RW_LOG_BLOCK_COUNT,
  stats::FtlStats,
};
pub use ftl_trait::{DeviceStatus, FtlTrait, LpnRange, Request, StatInfo};
pub use pal::{IoFlag, NandTiming, Pal, PalRequest, TimingPal};
