use std::env;

fn main() {
    // Host builds only run the portable core and its tests
    let target = env::var("TARGET").unwrap();
    if target.contains("avr") {
        println!("cargo:rustc-link-arg=-mmcu=atmega4809");
        println!("cargo:warning=Building for ATmega4809 at 20MHz/6");
    }

    println!("cargo:rerun-if-changed=build.rs");
}
