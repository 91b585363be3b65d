fn main() {
    println!("cargo:rerun-if-changed=assets/index.html");
    println!("cargo:rerun-if-changed=assets/style.css");

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
