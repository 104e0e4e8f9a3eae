use std::env;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    let out = PathBuf::from(env::var("OUT_DIR")?).join("hyperdrive_registry.rs");
    contract_bindgen::Builder::new("abi/HyperdriveRegistry.json")
        .contract_name("IHyperdriveRegistry")
        .emit_rerun_if_changed(true)
        .write_to_file(out)?;
    Ok(())
}
