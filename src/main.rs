//! twofa - issue and check TOTP codes.
//!
//! Usage:
//!   twofa --generate
//!   twofa --qr JBSWY3DPEHPK3PXP:alice@example.com
//!   twofa --verify JBSWY3DPEHPK3PXP:123456

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use twofa::cli::{self, Cli};
use twofa::qr::PngQrRenderer;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let renderer = PngQrRenderer::default().with_size(cli.size);
    let stdout = std::io::stdout();
    cli::run(&cli, &mut stdout.lock(), &renderer)?;

    Ok(())
}
