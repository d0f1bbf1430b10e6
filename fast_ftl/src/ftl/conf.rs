use crate::error::{Error, Result};

/// Warmup pattern selector.
/// 预热模式选择器。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillingMode {
  /// Sequential fill, then sequential overwrite.
  /// 顺序填充，然后顺序覆盖写。
  #[default]
  SequentialSequential,
  /// Sequential fill, then random overwrite bounded to the filled range,
  /// so the invalid-page target is exactly reachable.
  /// 顺序填充，然后在已填充范围内随机覆盖写，使无效页目标可精确达到。
  SequentialRandom,
  /// Random fill, then uniform-random overwrite over the whole LPN space.
  /// 随机填充，然后在整个 LPN 空间上均匀随机覆盖写。
  RandomRandom,
}

impl FillingMode {
  /// Decode the raw configuration value; anything above 1 is fully random.
  /// 解码原始配置值；大于 1 的取值一律视为完全随机。
  #[must_use]
  pub fn from_raw(raw: u64) -> Self {
    match raw {
      0 => Self::SequentialSequential,
      1 => Self::SequentialRandom,
      _ => Self::RandomRandom,
    }
  }
}

/// Runtime configuration of the FTL core.
/// FTL 核心的运行期配置。
#[derive(Debug, Clone)]
pub struct FtlConfig {
  /// Fraction of logical pages to fill during warmup, in [0, 1].
  pub fill_ratio: f64,
  /// Fraction of logical pages to overwrite during warmup. The
  /// pre-invalidation feature is untested upstream and must stay zero.
  pub invalid_page_ratio: f64,
  /// Warmup pattern.
  pub filling_mode: FillingMode,
  /// Per-request randomization tweak of the parent simulator; the FAST
  /// path does not support it.
  pub use_random_io_tweak: bool,
}

impl Default for FtlConfig {
  fn default() -> Self {
    Self {
      fill_ratio: 0.0,
      invalid_page_ratio: 0.0,
      filling_mode: FillingMode::default(),
      use_random_io_tweak: false,
    }
  }
}

impl FtlConfig {
  pub fn validate(&self) -> Result<()> {
    if !(0.0..=1.0).contains(&self.fill_ratio) {
      return Err(Error::Config("fill_ratio must be within [0, 1]"));
    }
    if self.invalid_page_ratio != 0.0 {
      return Err(Error::Config(
        "pre-invalidating warmup pages is not supported; invalid_page_ratio must be 0",
      ));
    }
    if self.use_random_io_tweak {
      return Err(Error::Unsupported(
        "random I/O tweak is not supported by the FAST mapping",
      ));
    }
    Ok(())
  }
}

/// Device geometry handed down by the parent simulator.
/// 父模拟器下发的设备几何参数。
#[derive(Debug, Clone, Copy)]
pub struct Parameter {
  pub total_logical_blocks: u32,
  pub total_physical_blocks: u32,
  pub pages_in_block: u32,
  pub io_unit_in_page: u32,
}

impl Parameter {
  #[inline]
  #[must_use]
  pub fn total_logical_pages(&self) -> u64 {
    self.total_logical_blocks as u64 * self.pages_in_block as u64
  }
}
