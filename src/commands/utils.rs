/// Display version information
pub fn display_version() {
    println!("freqdist v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Flattens nested frequency distribution results into CSV,");
    println!("with optional self-baseline composition percentages.");
}
