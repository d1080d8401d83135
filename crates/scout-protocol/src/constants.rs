//! 协议常量定义
//!
//! 指令/状态帧中各字段的取值，与底盘固件约定一致。

use num_enum::{FromPrimitive, IntoPrimitive};

// ============================================================================
// control_mode 字段取值
// ============================================================================

/// 遥控器控制
pub const CTRL_MODE_REMOTE: u8 = 0x00;
/// CAN 总线指令控制
pub const CTRL_MODE_CMD_CAN: u8 = 0x01;
/// 串口指令控制
pub const CTRL_MODE_CMD_UART: u8 = 0x02;

// ============================================================================
// light_ctrl_enable 字段取值
// ============================================================================

pub const LIGHT_CTRL_DISABLE: u8 = 0x00;
pub const LIGHT_CTRL_ENABLE: u8 = 0x01;

// ============================================================================
// base_state 字段取值
// ============================================================================

pub const BASE_STATE_NORMAL: u8 = 0x00;
pub const BASE_STATE_ESTOP: u8 = 0x01;
pub const BASE_STATE_EXCEPTION: u8 = 0x02;

/// 故障清除标志（运动控制指令 byte[1]）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IntoPrimitive, FromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum FaultClearFlag {
    /// 无故障清除请求
    #[default]
    None = 0x00,
    /// 清除电机驱动器故障
    ClearMotorFault = 0x01,
    /// 清除全部故障
    ClearAllFaults = 0x02,
}

/// 灯光模式
///
/// 未知取值在解析时回落到 `ConstOff`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IntoPrimitive, FromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum LightMode {
    /// 常灭
    #[default]
    ConstOff = 0x00,
    /// 常亮
    ConstOn = 0x01,
    /// 呼吸灯
    Breath = 0x02,
    /// 自定义亮度（配合 custom_value 0-100）
    Custom = 0x03,
}
