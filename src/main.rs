fn main() {
    if let Err(err) = sankey_flows::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
