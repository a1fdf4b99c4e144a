use super::super::args::*;
use super::{open_service, report_error};
use crate::exit_codes::SUCCESS;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match &cli.cmd {
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            return Ok(SUCCESS);
        }
        Command::Reports(args) => return super::reports::run(args),
        _ => {}
    }

    let svc = match open_service(&cli) {
        Ok(svc) => svc,
        Err(e) => return Ok(report_error(&e)),
    };

    match cli.cmd {
        Command::Submit(args) => super::submit::run(&svc, args).await,
        Command::Summary(args) => super::summary::run(&svc, args).await,
        Command::Show(args) => super::show::run(&svc, args).await,
        Command::Status => super::status::run(&svc).await,
        Command::Reset(args) => super::reset::run(&svc, args).await,
        Command::Rate(args) => super::rate::run(&svc, args).await,
        Command::Reports(_) | Command::Version => Ok(SUCCESS),
    }
}
