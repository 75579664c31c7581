use std::process::ExitCode;

fn main() -> ExitCode {
    maintflow_cli::run()
}
