fn main() {
    if let Err(err) = study_lens_lib::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
