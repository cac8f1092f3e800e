fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/report.proto");
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile(&["proto/report.proto"], &["proto"])?;
    Ok(())
}
