//! Build script for the Locus API
//!
//! Compiles the Protocol Buffer contracts of the three internal services
//! into Rust code using tonic-prost-build. A vendored `protoc` is used unless
//! `PROTOC` already points at one.

const PROTOS: &[&str] = &["proto/auth.proto", "proto/geo.proto", "proto/user.proto"];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var_os("PROTOC").is_none() {
        let protoc = protoc_bin_vendored::protoc_bin_path()?;
        std::env::set_var("PROTOC", protoc);
    }

    tonic_prost_build::configure()
        // Servers for the three services, clients for the callers
        .build_server(true)
        .build_client(true)
        .compile_protos(PROTOS, &["proto"])?;

    for proto in PROTOS {
        println!("cargo:rerun-if-changed={}", proto);
    }

    Ok(())
}
