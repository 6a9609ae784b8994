//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter    | Implements                      | Connects to             |
//! |------------|---------------------------------|-------------------------|
//! | `hardware` | InputPin, OutputPin,            | ESP32 GPIO, ADC1,       |
//! |            | AnalogInput, ClimateSensor      | DHT22 single-wire bus   |
//! | `log_sink` | PropertySink                    | Serial log output       |
//! | `time`     | Timebase                        | esp_timer + io timers   |
//! | `sim`      | all of the above                | Host tests              |

#[cfg(target_os = "espidf")]
pub mod hardware;
pub mod log_sink;
#[cfg(not(target_os = "espidf"))]
pub mod sim;
pub mod time;
