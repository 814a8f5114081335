fn main() -> Result<(), eframe::Error> {
    // RUST_LOG=info shows editor activity
    env_logger::init();

    funnel_canvas::run_app()
}
