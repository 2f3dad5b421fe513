fn main() {
    if let Err(e) = tunnelcow_dashboard::run() {
        eprintln!("tunnelcow-dashboard: {:#}", e);
        std::process::exit(1);
    }
}
