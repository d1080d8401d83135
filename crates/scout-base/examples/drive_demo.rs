//! 缓速往返行驶演示
//!
//! 以正弦曲线下发线速度，同时把前灯设为呼吸模式。
//! Ctrl-C 时回零速并断开。
//!
//! 用法：
//! ```bash
//! cargo run --example drive_demo -- can can0
//! ```

use scout_base::{FaultClearFlag, LightCommand, LightMode, ScoutBase, TransportKind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <can|serial> <device> [baud_rate]", args[0]);
        std::process::exit(1);
    }
    let kind = match args[1].as_str() {
        "can" => TransportKind::Can,
        _ => TransportKind::Serial,
    };
    let baud_rate: u32 = args.get(3).map(|s| s.parse()).transpose()?.unwrap_or(115200);

    let base = ScoutBase::new();
    base.connect(kind, &args[2], baud_rate)?;

    base.set_light_command(LightCommand {
        front_mode: LightMode::Breath,
        front_custom_value: 0,
        rear_mode: LightMode::ConstOn,
        rear_custom_value: 0,
    });

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))?;
    }

    let max_linear = base.config().max_linear_velocity;
    let started = Instant::now();
    while running.load(Ordering::SeqCst) {
        // 0.1Hz 正弦，峰值取能力的三分之一
        let t = started.elapsed().as_secs_f64();
        let linear = max_linear / 3.0 * (t * 2.0 * std::f64::consts::PI * 0.1).sin();
        base.set_motion_command(linear, 0.0, FaultClearFlag::None);
        std::thread::sleep(Duration::from_millis(100));
    }

    base.set_motion_command(0.0, 0.0, FaultClearFlag::None);
    std::thread::sleep(Duration::from_millis(200));
    base.disable_light_control();
    std::thread::sleep(Duration::from_millis(200));
    base.disconnect();
    Ok(())
}
