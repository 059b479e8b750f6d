fn main() {
    if let Err(err) = ride_insights::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
