use std::process::ExitCode;

fn main() -> ExitCode {
    gridplan_cli::run()
}
