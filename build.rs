fn main(){
    let crate_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    
    let mut config = cbindgen::Config::default();
    config.language = cbindgen::Language::C;
    config.include_guard = Some("DRONE_CORE_H".to_string());

    cbindgen::Builder::new()
        .with_src(std::path::Path::new(&crate_dir).join("src/ffi/mod.rs"))
        .with_config(config)
        .generate()
        .expect("Unable to generate bindings")
        .write_to_file("include/drone_core.h");
}
