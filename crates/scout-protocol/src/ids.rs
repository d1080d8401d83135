//! CAN ID 与串口帧 ID 常量定义

// ============================================================================
// CAN 消息 ID（标准帧，11-bit）
// ============================================================================

/// 运动控制指令
pub const CAN_MSG_MOTION_CONTROL_CMD_ID: u32 = 0x130;
/// 运动控制反馈
pub const CAN_MSG_MOTION_STATUS_ID: u32 = 0x131;
/// 灯光控制指令
pub const CAN_MSG_LIGHT_CONTROL_CMD_ID: u32 = 0x140;
/// 灯光控制反馈
pub const CAN_MSG_LIGHT_STATUS_ID: u32 = 0x141;
/// 系统状态反馈
pub const CAN_MSG_SYSTEM_STATUS_ID: u32 = 0x151;
/// 电机驱动器 1 反馈（2-4 号依次递增）
pub const CAN_MSG_MOTOR1_DRIVER_STATUS_ID: u32 = 0x200;
pub const CAN_MSG_MOTOR2_DRIVER_STATUS_ID: u32 = 0x201;
pub const CAN_MSG_MOTOR3_DRIVER_STATUS_ID: u32 = 0x202;
pub const CAN_MSG_MOTOR4_DRIVER_STATUS_ID: u32 = 0x203;

// ============================================================================
// 串口帧
// ============================================================================

/// 帧头同步字节
pub const FRAME_SOF1: u8 = 0x5A;
pub const FRAME_SOF2: u8 = 0xA5;

/// 帧类型：指令帧（上位机 → 底盘）
pub const FRAME_TYPE_CONTROL: u8 = 0x55;
/// 帧类型：状态帧（底盘 → 上位机）
pub const FRAME_TYPE_STATUS: u8 = 0xAA;

/// 串口帧总长度：SOF1 + SOF2 + type + id + payload[8] + checksum
pub const SERIAL_FRAME_LEN: usize = 13;

/// 状态帧 ID
pub const FRAME_SYSTEM_STATUS_ID: u8 = 0x01;
pub const FRAME_MOTION_STATUS_ID: u8 = 0x02;
pub const FRAME_MOTOR1_DRIVER_STATUS_ID: u8 = 0x03;
pub const FRAME_MOTOR2_DRIVER_STATUS_ID: u8 = 0x04;
pub const FRAME_MOTOR3_DRIVER_STATUS_ID: u8 = 0x05;
pub const FRAME_MOTOR4_DRIVER_STATUS_ID: u8 = 0x06;
pub const FRAME_LIGHT_STATUS_ID: u8 = 0x07;

/// 指令帧 ID
pub const FRAME_MOTION_CONTROL_CMD_ID: u8 = 0x01;
pub const FRAME_LIGHT_CONTROL_CMD_ID: u8 = 0x02;
