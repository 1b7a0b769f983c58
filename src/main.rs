// ==========================================
// 委员会席位分配系统 - 命令行主入口
// ==========================================

use clap::Parser;
use committee_manager::cli::{self, Cli};
use committee_manager::logging;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Cli::parse();
    logging::init_with(args.verbose, args.log_json);

    tracing::debug!(version = committee_manager::VERSION, "{}", committee_manager::APP_NAME);

    match cli::run(&args.command) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("错误: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
