fn main() {
    println!("cargo:rerun-if-changed=catalog/threat_model.json");
    println!("cargo:rerun-if-changed=schema/threat_catalog.schema.json");
}
