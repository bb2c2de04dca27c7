fn main() {
    // ESP-IDF link arguments are only needed for firmware images; host
    // test builds have no sysenv to forward.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
