//! 遥测解码
//!
//! 传输层回调的两个入口，各对应一种传输：
//!
//! - **帧入口（CAN）**：单条完整帧。先做校验和准入（直接相等），
//!   不匹配则记日志丢弃——遥测在源头是周期性的，丢一条很快会被
//!   后续样本覆盖，从不重试。
//! - **流入口（串口）**：任意切分的原始字节块，交给跨调用保留
//!   状态的字节流解析器，由它完成组帧 / 校验 / 重同步。
//!
//! 回调运行在传输的接收线程上，与调用方线程无同步关系；
//! 所有落点都是锁内拷贝。

use crate::state::StateStore;
use parking_lot::Mutex;
use scout_protocol::{ScoutFrame, SerialFrameParser, StatusMessage, can_frame_checksum};
use tracing::{trace, warn};

/// CAN 帧入口：校验和准入 → 解包 → 合并
pub(crate) fn handle_can_frame(frame: &ScoutFrame, store: &StateStore) {
    if frame.len != 8 {
        warn!(
            "Discarding frame with id 0x{:X}: unexpected length {}",
            frame.id, frame.len
        );
        return;
    }

    let expected = can_frame_checksum(frame.id, &frame.data, frame.len);
    if frame.data[7] != expected {
        warn!("Checksum mismatch, discarding frame with id 0x{:X}", frame.id);
        return;
    }

    match StatusMessage::from_can_frame(frame) {
        Ok(msg) => store.apply(&msg),
        Err(e) => trace!("Ignoring unrecognized frame: {}", e),
    }
}

/// 串口字节入口：喂入解析器，再把完整消息合并进状态
///
/// 消息先收集、解析器锁释放后再合并，保证任何时刻只持有一把锁。
pub(crate) fn handle_serial_chunk(
    parser: &Mutex<SerialFrameParser>,
    bytes: &[u8],
    store: &StateStore,
) {
    let mut messages = Vec::new();
    {
        let mut parser = parser.lock();
        parser.feed(bytes, |msg| messages.push(msg));
    }
    for msg in &messages {
        store.apply(msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_protocol::{
        CAN_MSG_MOTION_STATUS_ID, CAN_MSG_SYSTEM_STATUS_ID, FRAME_MOTION_STATUS_ID, FRAME_SOF1,
        FRAME_SOF2, FRAME_TYPE_STATUS, SERIAL_FRAME_LEN, serial_frame_checksum,
    };

    /// 组一条校验和正确的状态帧
    fn valid_status_frame(id: u32, mut payload: [u8; 8]) -> ScoutFrame {
        payload[7] = can_frame_checksum(id, &payload, 8);
        ScoutFrame {
            id,
            data: payload,
            len: 8,
        }
    }

    #[test]
    fn test_valid_frame_merges_into_state() {
        let store = StateStore::new();
        let frame = valid_status_frame(CAN_MSG_MOTION_STATUS_ID, [0xE8, 0x03, 0, 0, 0, 0, 0, 0]);
        handle_can_frame(&frame, &store);
        assert_eq!(store.snapshot().linear_velocity, 1.0);
    }

    #[test]
    fn test_any_single_byte_mutation_never_reaches_state() {
        // 任一负载字节被改而未重算校验和的帧，必须不改变状态
        for idx in 0..8 {
            let store = StateStore::new();
            let mut frame =
                valid_status_frame(CAN_MSG_MOTION_STATUS_ID, [0xE8, 0x03, 0x10, 0x00, 0, 0, 5, 0]);
            frame.data[idx] = frame.data[idx].wrapping_add(1);
            handle_can_frame(&frame, &store);
            assert_eq!(
                store.snapshot(),
                crate::state::ScoutState::default(),
                "mutated byte {} must not alter state",
                idx
            );
        }
    }

    #[test]
    fn test_short_frame_discarded() {
        let store = StateStore::new();
        let frame = ScoutFrame::new(CAN_MSG_MOTION_STATUS_ID, &[0xE8, 0x03]);
        handle_can_frame(&frame, &store);
        assert_eq!(store.snapshot(), crate::state::ScoutState::default());
    }

    #[test]
    fn test_unknown_id_with_valid_checksum_ignored() {
        let store = StateStore::new();
        let frame = valid_status_frame(0x300, [1, 2, 3, 4, 5, 6, 7, 0]);
        handle_can_frame(&frame, &store);
        assert_eq!(store.snapshot(), crate::state::ScoutState::default());
    }

    #[test]
    fn test_system_frame_updates_system_group() {
        let store = StateStore::new();
        let frame = valid_status_frame(
            CAN_MSG_SYSTEM_STATUS_ID,
            [0x00, 0x01, 0xFD, 0x00, 0x00, 0x00, 0, 0],
        );
        handle_can_frame(&frame, &store);
        let state = store.snapshot();
        assert_eq!(state.control_mode, 0x01);
        assert_eq!(state.battery_voltage, 25.3);
    }

    #[test]
    fn test_serial_chunks_reassemble_across_calls() {
        let store = StateStore::new();
        let parser = Mutex::new(SerialFrameParser::new());

        let payload = [0x18, 0xFC, 0, 0, 0, 0, 0, 0];
        let mut frame = [0u8; SERIAL_FRAME_LEN];
        frame[0] = FRAME_SOF1;
        frame[1] = FRAME_SOF2;
        frame[2] = FRAME_TYPE_STATUS;
        frame[3] = FRAME_MOTION_STATUS_ID;
        frame[4..12].copy_from_slice(&payload);
        frame[12] = serial_frame_checksum(FRAME_TYPE_STATUS, FRAME_MOTION_STATUS_ID, &payload);

        // 半帧跨两次回调到达
        handle_serial_chunk(&parser, &frame[..5], &store);
        assert_eq!(store.snapshot().linear_velocity, 0.0);
        handle_serial_chunk(&parser, &frame[5..], &store);
        assert_eq!(store.snapshot().linear_velocity, -1.0);
    }
}
