//! 公共 API 行为测试（无硬件）

use scout_base::{FaultClearFlag, ScoutBase, ScoutBaseConfig, ScoutState, TransportKind};
use std::time::Duration;

#[test]
fn test_initial_state_is_zeroed() {
    let base = ScoutBase::new();
    assert_eq!(base.state(), ScoutState::default());
}

#[test]
fn test_serial_connect_failure_is_reported_not_fatal() {
    let base = ScoutBase::new();
    let result = base.connect(TransportKind::Serial, "/dev/nonexistent_tty99", 115200);
    assert!(result.is_err());

    // 连接失败后系统保持可用：无活跃传输，指令被静默丢弃
    assert!(!base.is_connected());
    base.set_motion_command(0.5, 0.0, FaultClearFlag::None);
    assert_eq!(base.state(), ScoutState::default());
}

#[test]
fn test_disconnect_is_idempotent() {
    let base = ScoutBase::new();
    base.disconnect();
    base.disconnect();
    assert!(!base.is_connected());
}

#[test]
fn test_stop_without_start_is_noop() {
    let base = ScoutBase::new();
    base.stop();
    base.stop();
}

#[test]
fn test_commands_do_not_touch_observed_state() {
    // 指令通路与遥测通路独立：写指令不会改变观测状态
    let base = ScoutBase::new();
    base.set_motion_command(1.0, 0.2, FaultClearFlag::None);
    assert_eq!(base.state(), ScoutState::default());
    base.stop();
}

#[test]
fn test_drop_with_running_loop_joins_cleanly() {
    let base = ScoutBase::with_config(ScoutBaseConfig {
        control_period: Duration::from_millis(500),
        ..ScoutBaseConfig::default()
    });
    base.set_motion_command(0.1, 0.0, FaultClearFlag::None);
    // 未显式 stop，析构必须发停止信号、立即唤醒并 join
    let started = std::time::Instant::now();
    drop(base);
    assert!(started.elapsed() < Duration::from_millis(400));
}

#[test]
fn test_config_accessor_reflects_custom_limits() {
    let config = ScoutBaseConfig {
        max_linear_velocity: 2.0,
        min_linear_velocity: -2.0,
        ..ScoutBaseConfig::default()
    };
    let base = ScoutBase::with_config(config.clone());
    assert_eq!(base.config(), &config);
}
