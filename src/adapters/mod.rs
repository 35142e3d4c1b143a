//! Adapters: concrete implementations of the hexagonal port traits, plus
//! the network-facing glue.
//!
//! | Adapter    | Implements / provides | Connects to                 |
//! |------------|-----------------------|-----------------------------|
//! | `hardware` | SensorPort            | MCP3008 (SPI), flow counter |
//! |            | ActuatorPort          | relay + LED GPIO            |
//! | `log_sink` | EventSink             | Serial log output           |
//! | `time`     | monotonic clock       | ESP32 system timer          |
//! | `wifi`     | station link          | ESP-IDF WiFi STA            |
//! | `http`     | operator surface      | ESP-IDF HTTP server         |
//! | `channels` | HTTP ↔ loop queues    | embassy-sync statics        |

pub mod channels;
pub mod hardware;
pub mod http;
pub mod log_sink;
pub mod time;
pub mod wifi;
