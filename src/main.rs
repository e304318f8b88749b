fn main() {
    if let Err(err) = stream_importer::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
