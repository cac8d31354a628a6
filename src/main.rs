fn main() {
    if let Err(err) = cfgstore::cli::run() {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}
