/// Counters accumulated by the merge engine.
/// 合并引擎累计的计数器。
#[derive(Debug, Default, Clone, Copy)]
pub struct FtlStats {
  /// Log blocks garbage-collected back into data blocks.
  /// 被垃圾回收回数据块的日志块数量。
  pub reclaimed_blocks: u64,
  /// Valid pages copied while merging.
  /// 合并过程中拷贝的有效页数。
  pub valid_page_copies: u64,
}
