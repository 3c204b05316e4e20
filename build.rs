fn main() {
    // ESP-IDF link/env propagation is only meaningful for target builds.
    if std::env::var("CARGO_FEATURE_ESPIDF").is_ok() {
        embuild::espidf::sysenv::output();
    }
}
