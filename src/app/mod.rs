pub mod args;
mod setup;

pub use args::AppArgs;
pub use setup::build_logger;

use crate::web;
use anyhow::Result;
use tokio::net::TcpListener;

pub async fn launch() -> Result<()> {
    launch_with_args(AppArgs::from_cli()).await
}

pub async fn launch_with_args(args: AppArgs) -> Result<()> {
    let setup::PreparedApp {
        args,
        addr,
        state,
        static_dir,
    } = setup::prepare(args)?;

    let listener = TcpListener::bind(addr).await?;
    state.logger.debug(format!(
        "Report sink serving on {} (page {}, injection {})",
        addr,
        args.index_path().display(),
        if args.no_inject { "off" } else { "on" }
    ));

    web::start_server(state, static_dir, listener).await
}
