fn main() {
    pkgorder::cli::run();
}
