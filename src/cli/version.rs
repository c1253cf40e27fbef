/// Display version information
pub fn execute() {
    println!("agora {}", env!("CARGO_PKG_VERSION"));
    println!("Operator CLI for the Agora governance engine");
}
