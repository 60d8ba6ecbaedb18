fn main() {
    if let Err(err) = csv_extremes::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
