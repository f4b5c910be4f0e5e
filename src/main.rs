#[tokio::main]
async fn main() {
    if let Err(e) = phi_drift_monitor::run().await {
        eprintln!("fatal: {e}");
        std::process::exit(1);
    }
}
