fn main() {
    if let Err(e) = pokehttp::app::run_cli() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
