//! 指令状态定义
//!
//! 公共 API 写入、控制循环读取的两份指令记录。各自由独立的锁
//! 保护（见 [`crate::base::ScoutBase`]），读写均为整体拷贝。

use scout_protocol::{FaultClearFlag, LightMode};

/// 运动指令（物理量）
///
/// 每次 API 调用整体覆盖；存入前速度已按配置范围钳位。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionCommand {
    /// 线速度（m/s）
    pub linear_velocity: f64,
    /// 角速度（rad/s）
    pub angular_velocity: f64,
    pub fault_clear_flag: FaultClearFlag,
}

/// 灯光指令
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LightCommand {
    pub front_mode: LightMode,
    pub front_custom_value: u8,
    pub rear_mode: LightMode,
    pub rear_custom_value: u8,
}

/// 灯光指令的会话状态
///
/// `enabled == false` 时无论存储的模式是什么，下发的都是"常灭"；
/// 存储值保留，重新使能即可恢复之前的灯效。`change_requested`
/// 是一次性标志，由下一次发送前的取出动作清除。
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LightCommandState {
    pub cmd: LightCommand,
    pub enabled: bool,
    pub change_requested: bool,
}
