fn main() {
    if let Err(e) = hope_lib::run() {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
