//! 串口帧打包与字节流解析
//!
//! 串口链路没有帧边界保证：接收方拿到的是任意切分的字节块。
//! [`SerialFrameParser`] 是跨调用保留状态的增量解析器，负责
//! 重新同步、校验和准入与负载分发；半帧在两次 `feed` 之间保留。
//!
//! 帧格式（13 字节）：
//! `[0x5A, 0xA5, frame_type, frame_id, payload[8], checksum]`，
//! 其中 `checksum = sum(frame_type, frame_id, payload) mod 256`。

use crate::ids::{
    FRAME_SOF1, FRAME_SOF2, FRAME_TYPE_CONTROL, FRAME_TYPE_STATUS, SERIAL_FRAME_LEN,
};
use crate::status::StatusMessage;

/// 串口帧校验和：对 SOF 之后、校验字节之前的所有字节求和取模
pub fn serial_frame_checksum(frame_type: u8, frame_id: u8, payload: &[u8]) -> u8 {
    payload
        .iter()
        .fold(frame_type.wrapping_add(frame_id), |acc, &b| {
            acc.wrapping_add(b)
        })
}

/// 打包一条完整的指令帧
pub fn pack_command_frame(frame_id: u8, payload: &[u8; 8]) -> [u8; SERIAL_FRAME_LEN] {
    let mut buf = [0u8; SERIAL_FRAME_LEN];
    buf[0] = FRAME_SOF1;
    buf[1] = FRAME_SOF2;
    buf[2] = FRAME_TYPE_CONTROL;
    buf[3] = frame_id;
    buf[4..12].copy_from_slice(payload);
    buf[12] = serial_frame_checksum(FRAME_TYPE_CONTROL, frame_id, payload);
    buf
}

/// 解析统计（诊断用）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerialParserStats {
    /// 成功解析并分发的状态帧数
    pub frames_parsed: u64,
    /// 校验和不匹配而丢弃的帧数
    pub checksum_failures: u64,
    /// 重新同步过程中丢弃的字节数
    pub bytes_dropped: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Sof1,
    Sof2,
    FrameType,
    FrameId,
    Payload,
    Checksum,
}

/// 串口字节流解析器
///
/// 每找到一条校验通过的状态帧就调用一次 sink。指令类型的回环帧
/// 与未知帧类型触发重新同步，不进入分发。
pub struct SerialFrameParser {
    state: ParseState,
    frame_id: u8,
    payload: [u8; 8],
    payload_len: usize,
    stats: SerialParserStats,
}

impl SerialFrameParser {
    pub fn new() -> Self {
        Self {
            state: ParseState::Sof1,
            frame_id: 0,
            payload: [0; 8],
            payload_len: 0,
            stats: SerialParserStats::default(),
        }
    }

    /// 喂入一段字节，分发其中所有完整、校验通过的状态帧
    pub fn feed<F: FnMut(StatusMessage)>(&mut self, bytes: &[u8], mut sink: F) {
        for &byte in bytes {
            self.consume(byte, &mut sink);
        }
    }

    pub fn stats(&self) -> SerialParserStats {
        self.stats
    }

    fn consume(&mut self, byte: u8, sink: &mut impl FnMut(StatusMessage)) {
        match self.state {
            ParseState::Sof1 => {
                if byte == FRAME_SOF1 {
                    self.state = ParseState::Sof2;
                } else {
                    self.stats.bytes_dropped += 1;
                }
            },
            ParseState::Sof2 => {
                if byte == FRAME_SOF2 {
                    self.state = ParseState::FrameType;
                } else if byte == FRAME_SOF1 {
                    // 前一个 0x5A 是噪声，当前字节可能是新帧头
                    self.stats.bytes_dropped += 1;
                } else {
                    self.stats.bytes_dropped += 2;
                    self.state = ParseState::Sof1;
                }
            },
            ParseState::FrameType => {
                if byte == FRAME_TYPE_STATUS {
                    self.state = ParseState::FrameId;
                } else if byte == FRAME_SOF1 {
                    // 残缺帧头后紧跟新帧头：当前字节按 SOF1 重新解释
                    self.stats.bytes_dropped += 2;
                    self.state = ParseState::Sof2;
                } else {
                    // 指令回环或未知类型：丢弃并重新同步
                    self.stats.bytes_dropped += 3;
                    self.state = ParseState::Sof1;
                }
            },
            ParseState::FrameId => {
                self.frame_id = byte;
                self.payload_len = 0;
                self.state = ParseState::Payload;
            },
            ParseState::Payload => {
                self.payload[self.payload_len] = byte;
                self.payload_len += 1;
                if self.payload_len == 8 {
                    self.state = ParseState::Checksum;
                }
            },
            ParseState::Checksum => {
                self.state = ParseState::Sof1;
                let expected =
                    serial_frame_checksum(FRAME_TYPE_STATUS, self.frame_id, &self.payload);
                if byte != expected {
                    self.stats.checksum_failures += 1;
                    return;
                }
                match StatusMessage::from_serial_payload(self.frame_id, &self.payload) {
                    Ok(msg) => {
                        self.stats.frames_parsed += 1;
                        sink(msg);
                    },
                    // 校验通过但帧 ID 未知：按丢弃整帧计入
                    Err(_) => {
                        self.stats.bytes_dropped += SERIAL_FRAME_LEN as u64;
                    },
                }
            },
        }
    }
}

impl Default for SerialFrameParser {
    fn default() -> Self {
        Self::new()
    }
}
