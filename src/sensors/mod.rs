//! Sensor peripherals. Each one owns its driver handle, contributes one
//! node, and runs one readiness-gated task.
//!
//! | Peripheral | Node    | Properties              | Policy              |
//! |------------|---------|-------------------------|---------------------|
//! | DHT22      | `dht22` | temperature, humidity   | periodic sample     |
//! | KY-018     | `ky018` | light                   | periodic sample     |
//! | KY-026     | `ky026` | active                  | level-change only   |

pub mod climate;
pub mod flame;
pub mod light;

pub use climate::ClimatePeripheral;
pub use flame::FlamePeripheral;
pub use light::LightPeripheral;
