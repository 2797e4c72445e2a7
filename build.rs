fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // ESP-IDF link arguments are only needed for the board build.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
