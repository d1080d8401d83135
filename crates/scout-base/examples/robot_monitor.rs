//! 底盘状态监视器
//!
//! 连接底盘并周期性打印状态快照。
//!
//! 用法：
//! ```bash
//! cargo run --example robot_monitor -- can can0
//! cargo run --example robot_monitor -- serial /dev/ttyUSB0 115200
//! ```

use scout_base::{ScoutBase, TransportKind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <can|serial> <device> [baud_rate]", args[0]);
        std::process::exit(1);
    }

    let kind = match args[1].as_str() {
        "can" => TransportKind::Can,
        "serial" => TransportKind::Serial,
        other => {
            eprintln!("Unknown transport kind: {}", other);
            std::process::exit(1);
        },
    };
    let device = &args[2];
    let baud_rate: u32 = args.get(3).map(|s| s.parse()).transpose()?.unwrap_or(115200);

    let base = ScoutBase::new();
    base.connect(kind, device, baud_rate)?;

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))?;
    }

    println!("Connected to {:?} '{}', press Ctrl-C to exit", kind, device);
    while running.load(Ordering::SeqCst) {
        let state = base.state();
        println!(
            "v: {:+.3} m/s  w: {:+.3} rad/s | battery: {:.1} V | fault: 0x{:04X} | motors: {}",
            state.linear_velocity,
            state.angular_velocity,
            state.battery_voltage,
            state.fault_code,
            state
                .motor_states
                .iter()
                .map(|m| format!("{:.1}A/{}rpm/{}C", m.current, m.rpm, m.temperature))
                .collect::<Vec<_>>()
                .join("  "),
        );
        std::thread::sleep(Duration::from_millis(500));
    }

    base.disconnect();
    Ok(())
}
