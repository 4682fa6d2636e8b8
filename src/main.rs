fn main() -> std::process::ExitCode {
    logical_git::cli::run()
}
