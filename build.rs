use std::env;

fn main() {
    // Deployment-time network configuration, injected at compile time.
    // These become the defaults read by `NetworkConfig::from_build_env()`.

    // WiFi SSID (network name)
    if let Ok(ssid) = env::var("TILT_SSID") {
        println!("cargo:rustc-env=TILT_SSID={}", ssid);
        println!("cargo:warning=Using TILT_SSID from environment: {}", ssid);
    } else {
        println!("cargo:rustc-env=TILT_SSID=");
    }

    // WiFi password
    if let Ok(password) = env::var("TILT_PASS") {
        println!("cargo:rustc-env=TILT_PASS={}", password);
        println!("cargo:warning=Using TILT_PASS from environment (hidden)");
    } else {
        println!("cargo:rustc-env=TILT_PASS=");
    }

    // Telemetry destination host (IPv4 dotted quad)
    if let Ok(host) = env::var("TILT_HOST") {
        println!("cargo:rustc-env=TILT_HOST={}", host);
        println!("cargo:warning=Using TILT_HOST from environment: {}", host);
    } else {
        println!("cargo:rustc-env=TILT_HOST=192.168.4.2");
    }

    // Telemetry destination UDP port
    if let Ok(port) = env::var("TILT_PORT") {
        println!("cargo:rustc-env=TILT_PORT={}", port);
        println!("cargo:warning=Using TILT_PORT from environment: {}", port);
    } else {
        println!("cargo:rustc-env=TILT_PORT=10394");
    }

    println!("cargo:rerun-if-env-changed=TILT_SSID");
    println!("cargo:rerun-if-env-changed=TILT_PASS");
    println!("cargo:rerun-if-env-changed=TILT_HOST");
    println!("cargo:rerun-if-env-changed=TILT_PORT");
}
