use thiserror::Error;

/// FTL specialized Result type.
/// FTL 专用的 Result 类型。
pub type Result<T> = std::result::Result<T, Error>;

/// FTL Error Enum.
/// FTL 错误枚举。
#[derive(Error, Debug)]
pub enum Error {
  /// Configuration value out of range or inconsistent.
  /// 配置值超出范围或不一致。
  #[error("Configuration error: {0}")]
  Config(&'static str),
  /// Geometry or feature the FAST mapping path does not support.
  /// FAST 映射路径不支持的几何参数或特性。
  #[error("Unsupported: {0}")]
  Unsupported(&'static str),
}
