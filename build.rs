fn main() {
    // WiFi credentials are baked in at compile time (see adapters::wifi).
    println!("cargo:rerun-if-env-changed=WIFI_SSID");
    println!("cargo:rerun-if-env-changed=WIFI_PASSWORD");

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
