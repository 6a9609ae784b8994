fn main() {
    println!("cargo:rerun-if-env-changed=SENSORBRIDGE_CONFIG");

    // ESP-IDF link arguments; host builds have nothing to emit.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
