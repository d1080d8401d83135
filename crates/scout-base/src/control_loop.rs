//! 控制循环
//!
//! 单个长生命周期工作线程，以固定周期下发指令：
//!
//! 1. 每个节拍无条件发送运动指令——收端固件的看门狗把它当作
//!    心跳，"没有新指令"本身就是信息；
//! 2. 灯光指令只在 `change_requested` 置位时附带发送一次，
//!    避免无谓占用总线。
//!
//! 调度是固定节拍而非固定延时：记录节拍起点，只睡到下一个
//! 截止点的剩余时间，编码与发送的抖动不会累积成漂移。剩余
//! 时间的等待复用停止通道的 `recv_timeout`，停止信号（或发送端
//! 失效）能在周期内立即唤醒循环。
//!
//! 节拍开始时解析一次活跃传输；没有连接时节拍是空操作——
//! 指令被丢弃而不是排队，计数器与变更标志都不动。

use crate::command::{LightCommandState, MotionCommand};
use crate::connection::{ActiveLink, ConnectionManager};
use crate::error::ScoutError;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use parking_lot::Mutex;
use scout_protocol::{CTRL_MODE_CMD_CAN, CTRL_MODE_CMD_UART, LightControlFrame, MotionControlFrame};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// 控制循环上下文（整体移交给循环线程）
pub(crate) struct LoopContext {
    pub period: Duration,
    pub max_linear_velocity: f64,
    pub max_angular_velocity: f64,
    pub motion_cmd: Arc<Mutex<MotionCommand>>,
    pub light_cmd: Arc<Mutex<LightCommandState>>,
    pub conn: Arc<ConnectionManager>,
}

/// 循环主体
///
/// 退出条件：收到停止信号，或停止通道的发送端被丢弃。
pub(crate) fn control_loop(ctx: LoopContext, stop_rx: Receiver<()>) {
    let mut motion_count: u8 = 0;
    let mut light_count: u8 = 0;

    debug!("Control loop started (period {:?})", ctx.period);

    loop {
        let tick_start = Instant::now();

        if let Some(link) = ctx.conn.active().filter(|link| link.is_open()) {
            // 锁内拷贝，解锁后再做 IO
            let cmd = *ctx.motion_cmd.lock();
            if let Err(e) = send_motion_command(&link, &cmd, &ctx, motion_count) {
                warn!("Failed to send motion command: {}", e);
            }
            motion_count = motion_count.wrapping_add(1);

            // 一次性取出变更请求并清除标志
            let pending = {
                let mut light = ctx.light_cmd.lock();
                if light.change_requested {
                    light.change_requested = false;
                    Some((light.cmd, light.enabled))
                } else {
                    None
                }
            };
            if let Some((cmd, enabled)) = pending {
                if let Err(e) = send_light_command(&link, &cmd, enabled, light_count) {
                    warn!("Failed to send light command: {}", e);
                }
                light_count = light_count.wrapping_add(1);
            }
        }

        let remaining = ctx.period.saturating_sub(tick_start.elapsed());
        match stop_rx.recv_timeout(remaining) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {},
        }
    }

    debug!("Control loop stopped");
}

/// 速度物理量 → 有符号百分比
///
/// `as i8` 的饱和转换兜住超限输入，存入侧的钳位已保证范围。
fn to_percent(value: f64, limit: f64) -> i8 {
    (value / limit * 100.0) as i8
}

fn send_motion_command(
    link: &ActiveLink,
    cmd: &MotionCommand,
    ctx: &LoopContext,
    count: u8,
) -> Result<(), ScoutError> {
    let mut frame = MotionControlFrame {
        control_mode: CTRL_MODE_CMD_CAN,
        fault_clear_flag: cmd.fault_clear_flag,
        linear_percent: to_percent(cmd.linear_velocity, ctx.max_linear_velocity),
        angular_percent: to_percent(cmd.angular_velocity, ctx.max_angular_velocity),
        count,
    };

    match link {
        #[cfg(target_os = "linux")]
        ActiveLink::Can(t) => {
            t.send_frame(&frame.to_can_frame())?;
        },
        ActiveLink::Serial(t) => {
            frame.control_mode = CTRL_MODE_CMD_UART;
            t.send_bytes(&frame.to_serial_frame())?;
        },
        #[cfg(test)]
        ActiveLink::Mock(mock) => {
            use crate::connection::{SentCommand, TransportKind};
            match mock.kind {
                TransportKind::Can => mock.push(SentCommand::Can(frame.to_can_frame())),
                TransportKind::Serial => {
                    frame.control_mode = CTRL_MODE_CMD_UART;
                    mock.push(SentCommand::Serial(frame.to_serial_frame().to_vec()));
                },
            }
        },
    }
    Ok(())
}

fn send_light_command(
    link: &ActiveLink,
    cmd: &crate::command::LightCommand,
    enabled: bool,
    count: u8,
) -> Result<(), ScoutError> {
    // 会话未使能时下发"常灭"，存储的灯效保持不动
    let frame = if enabled {
        LightControlFrame {
            enable: true,
            front_mode: cmd.front_mode,
            front_custom: cmd.front_custom_value,
            rear_mode: cmd.rear_mode,
            rear_custom: cmd.rear_custom_value,
            count,
        }
    } else {
        LightControlFrame::disabled(count)
    };

    match link {
        #[cfg(target_os = "linux")]
        ActiveLink::Can(t) => {
            t.send_frame(&frame.to_can_frame())?;
        },
        ActiveLink::Serial(t) => {
            t.send_bytes(&frame.to_serial_frame())?;
        },
        #[cfg(test)]
        ActiveLink::Mock(mock) => {
            use crate::connection::{SentCommand, TransportKind};
            match mock.kind {
                TransportKind::Can => mock.push(SentCommand::Can(frame.to_can_frame())),
                TransportKind::Serial => {
                    mock.push(SentCommand::Serial(frame.to_serial_frame().to_vec()))
                },
            }
        },
    }
    Ok(())
}
