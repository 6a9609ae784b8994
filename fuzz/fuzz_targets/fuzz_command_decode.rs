//! Fuzz target: `Property::on_command`
//!
//! Feeds arbitrary payloads to one settable property of every datatype
//! and checks that a rejected command never changes the stored value and
//! an accepted one always leaves a value of the declared datatype.
//!
//! cargo fuzz run fuzz_command_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use sensorbridge::property::{Datatype, Property};

fn cells() -> [Property; 5] {
    let make = |id: &str, dt: Datatype| Property::new(id, id, dt).map(Property::settable);
    [
        make("power", Datatype::Boolean).unwrap(),
        make("count", Datatype::Integer).unwrap().with_format("-100:100").unwrap(),
        make("level", Datatype::Float).unwrap().with_format("0:1023").unwrap(),
        make("label", Datatype::String).unwrap(),
        make("mode", Datatype::Enum).unwrap().with_format("off,eco,boost").unwrap(),
    ]
}

fuzz_target!(|data: &[u8]| {
    let Ok(payload) = core::str::from_utf8(data) else {
        return;
    };

    for cell in cells() {
        let before = cell.get();
        match cell.on_command(payload) {
            Ok(()) => {
                let value = cell.get().expect("accepted command must store a value");
                assert_eq!(value.datatype(), cell.datatype());
                assert_eq!(cell.write_count(), 1);
            }
            Err(_) => {
                assert_eq!(cell.get(), before);
                assert_eq!(cell.write_count(), 0);
            }
        }
    }
});
