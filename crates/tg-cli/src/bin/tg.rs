use clap::Parser;
use tg_cli::args::CliArgs;
use tg_cli::run::run;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let code = run(args)?;
    std::process::exit(code);
}
