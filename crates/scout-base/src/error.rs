//! 错误类型定义
//!
//! 传输层与解析层的失败在发生处吸收，不会上抛到公共 API；
//! 对调用方可见的失败只有连接建立。

use crate::connection::TransportKind;
use thiserror::Error;

/// ScoutBase 错误类型
#[derive(Error, Debug)]
pub enum ScoutError {
    /// 连接建立失败（串口打不开、CAN 接口不可用等）
    ///
    /// 不是致命错误：系统保持可用，只是没有活跃传输，
    /// 由调用方决定是否重试。
    #[error("Failed to connect {kind:?} transport '{device}': {reason}")]
    ConnectFailure {
        kind: TransportKind,
        device: String,
        reason: String,
    },

    /// 会话内传输互斥：已有活跃传输时必须先断开
    #[error("A transport is already connected; call disconnect() first")]
    AlreadyConnected,

    /// CAN 传输错误（发送路径）
    #[cfg(target_os = "linux")]
    #[error("CAN transport error: {0}")]
    Can(#[from] scout_can::CanError),

    /// 串口传输错误（发送路径）
    #[error("Serial transport error: {0}")]
    Serial(#[from] scout_serial::SerialError),
}
