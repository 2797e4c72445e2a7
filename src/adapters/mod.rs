//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter           | Implements        | Connects to                 |
//! |-------------------|-------------------|-----------------------------|
//! | `config_file`     | ConfigPort        | JSON file (SPIFFS / cwd)    |
//! | `console_display` | DisplayPort       | Serial log output           |
//! | `http_cloud`      | CloudPort         | ESP-IDF HTTP client         |
//! | `http_body`       |                   | bounded response reads      |
//! | `log_sink`        | EventSink         | Serial log output           |
//! | `logging`         |                   | `log` backend selection     |
//! | `sim`             | sensor/relay/cloud ports | Host simulation      |
//! | `time`            | ClockPort         | RTC + SNTP                  |
//! |                   | Monotonic         | ESP timer / `Instant`       |
//! | `wifi`            | NetworkPort       | ESP-IDF WiFi STA            |

pub mod config_file;
pub mod console_display;
pub mod http_body;
#[cfg(target_os = "espidf")]
pub mod http_cloud;
pub mod log_sink;
pub mod logging;
#[cfg(not(target_os = "espidf"))]
pub mod sim;
pub mod time;
pub mod wifi;
