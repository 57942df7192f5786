fn main() {
    if let Err(err) = lumon::cli::main() {
        eprintln!("❌ Error: {err}");
        std::process::exit(1);
    }
}
